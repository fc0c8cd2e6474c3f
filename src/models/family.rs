use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::{LayoutError, LayoutResult};

use super::marriage::Marriage;
use super::person::Person;

/// Personer och äktenskap som läses in tillsammans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyData {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub marriages: Vec<Marriage>,
}

impl FamilyData {
    pub fn new(people: Vec<Person>, marriages: Vec<Marriage>) -> Self {
        Self { people, marriages }
    }

    pub fn from_json_str(content: &str) -> LayoutResult<Self> {
        let data: Self = serde_json::from_str(content)?;
        data.validate()?;
        Ok(data)
    }

    /// Läs JSON från t.ex. stdin
    pub fn from_reader<R: Read>(mut reader: R) -> LayoutResult<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::from_json_str(&content)
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Kunde inte läsa {:?}", path))?;
        Self::from_json_str(&content).with_context(|| format!("Ogiltig släktdata i {:?}", path))
    }

    /// Person- och äktenskaps-ID:n måste vara ifyllda och unika
    pub fn validate(&self) -> LayoutResult<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        for person in &self.people {
            if person.id.trim().is_empty() {
                return Err(LayoutError::invalid_input(format!("person utan ID ({})", person.name)));
            }
            if !seen.insert(person.id.as_str()) {
                return Err(LayoutError::invalid_input(format!("dubblett av person-ID {}", person.id)));
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for marriage in &self.marriages {
            if marriage.id.trim().is_empty() {
                return Err(LayoutError::invalid_input("äktenskap utan ID"));
            }
            if !seen.insert(marriage.id.as_str()) {
                return Err(LayoutError::invalid_input(format!(
                    "dubblett av äktenskaps-ID {}",
                    marriage.id
                )));
            }
        }
        Ok(())
    }

    pub fn find_person(&self, id: &str) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "people": [
                {"id": "a", "name": "Johan", "gender": "male"},
                {"id": "b", "name": "Anna", "gender": "female"}
            ],
            "marriages": [
                {"id": "m1", "marriageType": "monogamous", "spouses": ["a", "b"], "childrenIds": []}
            ]
        }"#;
        let data = FamilyData::from_json_str(json).unwrap();
        assert_eq!(data.people.len(), 2);
        assert_eq!(data.marriages.len(), 1);
        assert_eq!(data.find_person("b").map(|p| p.name.as_str()), Some("Anna"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            FamilyData::from_json_str("{\"people\": 5}"),
            Err(LayoutError::Json(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{"people": [{"id": "a"}, {"id": "a"}]}"#;
        assert!(matches!(
            FamilyData::from_json_str(json),
            Err(LayoutError::InvalidInput(_))
        ));

        let json = r#"{"marriages": [
            {"id": "m1", "marriageType": "polygamous", "husbandId": "h"},
            {"id": "m1", "marriageType": "monogamous", "spouses": []}
        ]}"#;
        assert!(FamilyData::from_json_str(json).is_err());
    }

    #[test]
    fn test_from_reader() {
        let json = r#"{"people": [{"id": "x", "name": "X", "dateOfDeath": "1900"}]}"#;
        let data = FamilyData::from_reader(json.as_bytes()).unwrap();
        assert!(data.people[0].is_dead());
        assert!(data.marriages.is_empty());
    }
}
