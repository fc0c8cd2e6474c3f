//! Datastrukturer för inläst GEDCOM-data

use chrono::NaiveDate;

use crate::models::Gender;
use crate::utils::date::{format_date, parse_gedcom_date};

/// GEDCOM-ID utan omslutande @ (t.ex. "@I1@" → "I1")
pub fn strip_xref(xref: &str) -> String {
    xref.trim().trim_matches('@').to_string()
}

/// Datummodifierare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateModifier {
    About,
    Before,
    After,
    Estimated,
    Calculated,
    Between,
    From,
    To,
}

impl DateModifier {
    /// Prefix som känns igen, med och utan punkt
    const PREFIXES: [(&'static str, DateModifier); 11] = [
        ("ABOUT", Self::About),
        ("ABT", Self::About),
        ("BEFORE", Self::Before),
        ("BEF", Self::Before),
        ("AFTER", Self::After),
        ("AFT", Self::After),
        ("EST", Self::Estimated),
        ("CAL", Self::Calculated),
        ("BET", Self::Between),
        ("FROM", Self::From),
        ("TO", Self::To),
    ];

    /// Dela upp "ABT. 1850" i modifierare och resten
    fn split(s: &str) -> (Option<Self>, &str) {
        let Some((first, rest)) = s.split_once(char::is_whitespace) else {
            return (None, s);
        };
        let word = first.trim_end_matches('.').to_uppercase();
        match Self::PREFIXES.iter().find(|(prefix, _)| *prefix == word) {
            Some((_, modifier)) => (Some(*modifier), rest.trim()),
            None => (None, s),
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Self::About => "ca",
            Self::Before => "före",
            Self::After => "efter",
            Self::Estimated => "uppsk.",
            Self::Calculated => "ber.",
            Self::Between => "mellan",
            Self::From => "från",
            Self::To => "till",
        }
    }
}

/// Ett GEDCOM-datum, eventuellt med modifierare
#[derive(Debug, Clone, PartialEq)]
pub struct GedcomDate {
    pub modifier: Option<DateModifier>,
    pub original: String,
    pub date: Option<NaiveDate>,
}

impl GedcomDate {
    pub fn parse(s: &str) -> Self {
        let original = s.trim().to_string();
        let (modifier, rest) = DateModifier::split(&original);
        // "BET 1850 AND 1860": första datumet räknas
        let first = rest.split(" AND ").next().unwrap_or(rest);
        let date = parse_gedcom_date(first);

        Self {
            modifier,
            original,
            date,
        }
    }

    /// Värdet som sparas på personen: ISO-datum för exakta datum,
    /// annars originaltexten så att osäkerheten inte går förlorad
    pub fn to_person_value(&self) -> String {
        match (self.modifier, self.date) {
            (None, Some(date)) => format_date(date),
            _ => self.original.clone(),
        }
    }
}

/// En individ (INDI)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GedcomIndividual {
    pub id: String,
    pub given_name: Option<String>,
    pub surname: Option<String>,
    pub sex: Option<Gender>,
    pub birth_date: Option<GedcomDate>,
    /// Sant om en DEAT-post finns, även utan datum
    pub is_dead: bool,
    pub death_date: Option<GedcomDate>,
}

impl GedcomIndividual {
    pub fn full_name(&self) -> String {
        match (&self.given_name, &self.surname) {
            (Some(g), Some(s)) => format!("{} {}", g, s),
            (Some(g), None) => g.clone(),
            (None, Some(s)) => s.clone(),
            (None, None) => "Okänd".to_string(),
        }
    }

    /// Tolka "Förnamn /Efternamn/"
    pub fn set_name(&mut self, raw: &str) {
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };

        let mut pieces = raw.splitn(3, '/');
        let given = pieces.next().unwrap_or_default();
        let surname = pieces.next();

        self.given_name = non_empty(given);
        self.surname = surname.and_then(non_empty);
    }
}

/// En familj (FAM)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GedcomFamily {
    pub id: String,
    pub husband_id: Option<String>,
    pub wife_id: Option<String>,
    pub children_ids: Vec<String>,
}

/// Resultat av inläsningen
#[derive(Debug, Clone, Default)]
pub struct GedcomData {
    pub individuals: Vec<GedcomIndividual>,
    pub families: Vec<GedcomFamily>,
    pub source: Option<String>,
}

impl GedcomData {
    pub fn find_individual(&self, id: &str) -> Option<&GedcomIndividual> {
        self.individuals.iter().find(|i| i.id == id)
    }

    pub fn find_family(&self, id: &str) -> Option<&GedcomFamily> {
        self.families.iter().find(|f| f.id == id)
    }
}
