//! GEDCOM 5.5-läsare
//!
//! Raderna byggs först till ett träd av poster (nivå 0 med sina underposter),
//! sedan tolkas INDI- och FAM-posterna. Okända taggar ignoreras.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::Gender;

use super::models::{strip_xref, GedcomData, GedcomDate, GedcomFamily, GedcomIndividual};

/// En post med sina underposter
#[derive(Debug, Clone, PartialEq)]
pub struct GedcomRecord {
    pub level: u32,
    pub xref: Option<String>,
    pub tag: String,
    pub value: Option<String>,
    pub children: Vec<GedcomRecord>,
}

impl GedcomRecord {
    fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_start_matches('\u{feff}').trim();
        let mut parts = line.splitn(3, ' ');
        let level = parts.next()?.parse::<u32>().ok()?;
        let second = parts.next()?;

        let (xref, tag, value) = if second.starts_with('@') && second.ends_with('@') {
            (Some(second.to_string()), parts.next()?.trim().to_string(), None)
        } else {
            let value = parts.next().map(str::to_string).filter(|v| !v.is_empty());
            (None, second.to_string(), value)
        };

        Some(Self {
            level,
            xref,
            tag,
            value,
            children: Vec::new(),
        })
    }

    /// Första direkta underposten med taggen
    pub fn child(&self, tag: &str) -> Option<&GedcomRecord> {
        self.children.iter().find(|c| c.tag == tag)
    }

    pub fn children_with<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a GedcomRecord> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    pub fn child_value(&self, tag: &str) -> Option<&str> {
        self.child(tag).and_then(|c| c.value.as_deref())
    }
}

pub struct GedcomParser;

impl GedcomParser {
    pub fn parse_file(path: &Path) -> Result<GedcomData> {
        let file = File::open(path).with_context(|| format!("Kunde inte öppna GEDCOM-fil {:?}", path))?;
        Self::parse_reader(BufReader::new(file))
    }

    pub fn parse_string(content: &str) -> Result<GedcomData> {
        Self::parse_reader(content.as_bytes())
    }

    pub fn parse_reader<R: BufRead>(reader: R) -> Result<GedcomData> {
        let records = Self::read_records(reader)?;
        let mut data = GedcomData::default();

        for record in &records {
            match record.tag.as_str() {
                "HEAD" => data.source = record.child_value("SOUR").map(str::to_string),
                "INDI" => data.individuals.push(Self::individual(record)),
                "FAM" => data.families.push(Self::family(record)),
                _ => {}
            }
        }

        tracing::info!(
            "Läste GEDCOM: {} individer, {} familjer",
            data.individuals.len(),
            data.families.len()
        );
        Ok(data)
    }

    /// Bygg postträdet. En stack håller den öppna kedjan av föräldrar.
    pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<GedcomRecord>> {
        let mut roots: Vec<GedcomRecord> = Vec::new();
        let mut stack: Vec<GedcomRecord> = Vec::new();

        for (number, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Kunde inte läsa rad {}", number + 1))?;
            let Some(record) = GedcomRecord::parse_line(&line) else {
                if !line.trim().is_empty() {
                    tracing::debug!("Hoppar över ogiltig GEDCOM-rad {}: {}", number + 1, line);
                }
                continue;
            };

            while stack.last().is_some_and(|open| open.level >= record.level) {
                Self::close(&mut stack, &mut roots);
            }
            stack.push(record);
        }

        while !stack.is_empty() {
            Self::close(&mut stack, &mut roots);
        }

        Ok(roots)
    }

    fn close(stack: &mut Vec<GedcomRecord>, roots: &mut Vec<GedcomRecord>) {
        if let Some(done) = stack.pop() {
            match stack.last_mut() {
                Some(parent) => parent.children.push(done),
                None => roots.push(done),
            }
        }
    }

    fn individual(record: &GedcomRecord) -> GedcomIndividual {
        let mut indi = GedcomIndividual {
            id: record.xref.as_deref().map(strip_xref).unwrap_or_default(),
            ..Default::default()
        };

        // Första NAME med innehåll vinner; senare är ofta alias
        if let Some(name) = record
            .children_with("NAME")
            .filter_map(|n| n.value.as_deref())
            .find(|n| !n.replace('/', "").trim().is_empty())
        {
            indi.set_name(name);
        }

        indi.sex = record.child_value("SEX").and_then(Gender::from_gedcom);
        indi.birth_date = record.child("BIRT").and_then(Self::event_date);

        if let Some(death) = record.child("DEAT") {
            indi.is_dead = true;
            indi.death_date = Self::event_date(death);
        }

        indi
    }

    /// DATE direkt under händelsen; DATE längre ner (t.ex. SOUR/DATA) hör till källan
    fn event_date(event: &GedcomRecord) -> Option<GedcomDate> {
        event.child_value("DATE").map(GedcomDate::parse)
    }

    fn family(record: &GedcomRecord) -> GedcomFamily {
        GedcomFamily {
            id: record.xref.as_deref().map(strip_xref).unwrap_or_default(),
            husband_id: record.child_value("HUSB").map(strip_xref),
            wife_id: record.child_value("WIFE").map(strip_xref),
            children_ids: record
                .children_with("CHIL")
                .filter_map(|c| c.value.as_deref())
                .map(strip_xref)
                .collect(),
        }
    }
}
