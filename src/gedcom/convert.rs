//! Omvandling från GEDCOM-data till personer och äktenskap för layoutmotorn

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Result;

use crate::models::{FamilyData, Marriage, Person, Wife};

use super::models::{GedcomData, GedcomFamily, GedcomIndividual};
use super::parser::GedcomParser;

/// Värde för dödsdatum när DEAT finns men saknar datum
const DEATH_WITHOUT_DATE: &str = "Y";

impl From<&GedcomIndividual> for Person {
    fn from(indi: &GedcomIndividual) -> Self {
        let mut person = Person::new(indi.id.clone(), indi.full_name(), indi.sex);
        person.dob = indi.birth_date.as_ref().map(|d| d.to_person_value());
        if indi.is_dead {
            person.dod = Some(
                indi.death_date
                    .as_ref()
                    .map(|d| d.to_person_value())
                    .unwrap_or_else(|| DEATH_WITHOUT_DATE.to_string()),
            );
        }
        person
    }
}

impl GedcomData {
    /// Varje FAM blir ett monogamt äktenskap. En make med flera FAM och
    /// olika hustrur i alla slås ihop till ett månggifte med ID från den
    /// första familjen; varje hustru behåller sina egna barn.
    pub fn to_family_data(&self) -> FamilyData {
        let people: Vec<Person> = self.individuals.iter().map(Person::from).collect();

        let mut by_husband: HashMap<&str, Vec<&GedcomFamily>> = HashMap::new();
        for family in &self.families {
            if let Some(husband) = family.husband_id.as_deref() {
                by_husband.entry(husband).or_default().push(family);
            }
        }

        let mut marriages = Vec::new();
        let mut folded: HashSet<&str> = HashSet::new();

        for family in &self.families {
            if folded.contains(family.id.as_str()) {
                continue;
            }

            let group = family
                .husband_id
                .as_deref()
                .and_then(|h| by_husband.get(h))
                .filter(|group| is_polygamous(group));

            match group {
                Some(group) => {
                    let wives = group
                        .iter()
                        .map(|f| Wife {
                            wife_id: f.wife_id.clone(),
                            children_ids: f.children_ids.clone(),
                        })
                        .collect();
                    marriages.push(Marriage::polygamous(
                        family.id.clone(),
                        family.husband_id.as_deref(),
                        wives,
                    ));
                    folded.extend(group.iter().map(|f| f.id.as_str()));
                }
                None => {
                    let children: Vec<&str> = family.children_ids.iter().map(String::as_str).collect();
                    marriages.push(Marriage::monogamous(
                        family.id.clone(),
                        [family.husband_id.as_deref(), family.wife_id.as_deref()],
                        &children,
                    ));
                }
            }
        }

        tracing::debug!(
            "Omvandlade {} familjer till {} äktenskap",
            self.families.len(),
            marriages.len()
        );
        FamilyData::new(people, marriages)
    }
}

/// Flera familjer där alla hustrur är kända och olika
fn is_polygamous(group: &[&GedcomFamily]) -> bool {
    if group.len() < 2 {
        return false;
    }
    let mut seen = HashSet::new();
    group
        .iter()
        .all(|f| f.wife_id.as_deref().is_some_and(|w| seen.insert(w)))
}

/// Läs en GEDCOM-fil direkt till släktdata
pub fn load_family_data(path: &Path) -> Result<FamilyData> {
    Ok(GedcomParser::parse_file(path)?.to_family_data())
}
