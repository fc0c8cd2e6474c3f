use serde::{Deserialize, Deserializer, Serialize};

/// En hustru i ett månggifte, med sina egna barn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wife {
    #[serde(rename = "wifeId", default, deserialize_with = "deserialize_slot")]
    pub wife_id: Option<String>,
    #[serde(rename = "childrenIds", default)]
    pub children_ids: Vec<String>,
}

impl Wife {
    pub fn new(wife_id: Option<&str>, children_ids: &[&str]) -> Self {
        Self {
            wife_id: wife_id.map(str::to_string),
            children_ids: children_ids.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Äktenskapstyp med respektive fältuppsättning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "marriageType", rename_all = "lowercase")]
pub enum MarriageKind {
    Monogamous {
        /// Exakt två platser, båda kan vara tomma innan platshållare skapats
        #[serde(default, deserialize_with = "deserialize_spouses")]
        spouses: [Option<String>; 2],
        #[serde(rename = "childrenIds", default)]
        children_ids: Vec<String>,
    },
    Polygamous {
        #[serde(rename = "husbandId", default, deserialize_with = "deserialize_slot")]
        husband_id: Option<String>,
        #[serde(default)]
        wives: Vec<Wife>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marriage {
    pub id: String,
    #[serde(flatten)]
    pub kind: MarriageKind,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub pending_deletion: bool,
}

impl Marriage {
    pub fn monogamous(id: impl Into<String>, spouses: [Option<&str>; 2], children: &[&str]) -> Self {
        Self {
            id: id.into(),
            kind: MarriageKind::Monogamous {
                spouses: spouses.map(|s| s.map(str::to_string)),
                children_ids: children.iter().map(|s| s.to_string()).collect(),
            },
            is_deleted: false,
            pending_deletion: false,
        }
    }

    pub fn polygamous(id: impl Into<String>, husband_id: Option<&str>, wives: Vec<Wife>) -> Self {
        Self {
            id: id.into(),
            kind: MarriageKind::Polygamous {
                husband_id: husband_id.map(str::to_string),
                wives,
            },
            is_deleted: false,
            pending_deletion: false,
        }
    }

    pub fn is_monogamous(&self) -> bool {
        matches!(self.kind, MarriageKind::Monogamous { .. })
    }

    /// Varken borttaget eller väntande på borttagning
    pub fn is_active(&self) -> bool {
        !self.is_deleted && !self.pending_deletion
    }

    /// Alla ifyllda makar/makor (make först vid månggifte)
    pub fn partner_ids(&self) -> Vec<&str> {
        match &self.kind {
            MarriageKind::Monogamous { spouses, .. } => {
                spouses.iter().filter_map(|s| s.as_deref()).collect()
            }
            MarriageKind::Polygamous { husband_id, wives } => husband_id
                .as_deref()
                .into_iter()
                .chain(wives.iter().filter_map(|w| w.wife_id.as_deref()))
                .collect(),
        }
    }

    /// Alla barn i ordning, utan dubbletter
    pub fn children(&self) -> Vec<&str> {
        let mut result: Vec<&str> = Vec::new();
        match &self.kind {
            MarriageKind::Monogamous { children_ids, .. } => {
                for child in children_ids {
                    if !result.contains(&child.as_str()) {
                        result.push(child);
                    }
                }
            }
            MarriageKind::Polygamous { wives, .. } => {
                for child in wives.iter().flat_map(|w| w.children_ids.iter()) {
                    if !result.contains(&child.as_str()) {
                        result.push(child);
                    }
                }
            }
        }
        result
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// Personen leder hushållet: en av makarna vid monogami, maken vid månggifte.
    /// Det är dessa äktenskap som en bredden-först-sökning följer från personen.
    pub fn is_household_head(&self, person_id: &str) -> bool {
        match &self.kind {
            MarriageKind::Monogamous { spouses, .. } => {
                spouses.iter().any(|s| s.as_deref() == Some(person_id))
            }
            MarriageKind::Polygamous { husband_id, .. } => husband_id.as_deref() == Some(person_id),
        }
    }

    /// Personen är make/maka/hustru i äktenskapet
    pub fn involves(&self, person_id: &str) -> bool {
        self.partner_ids().contains(&person_id)
    }

    pub fn has_child(&self, person_id: &str) -> bool {
        self.children().contains(&person_id)
    }

    /// Föräldrar till ett barn i detta äktenskap (vid månggifte: make och barnets mor)
    pub fn parents_of(&self, child_id: &str) -> Vec<&str> {
        match &self.kind {
            MarriageKind::Monogamous { spouses, children_ids } => {
                if children_ids.iter().any(|c| c == child_id) {
                    spouses.iter().filter_map(|s| s.as_deref()).collect()
                } else {
                    Vec::new()
                }
            }
            MarriageKind::Polygamous { husband_id, wives } => {
                let Some(wife) = wives
                    .iter()
                    .find(|w| w.children_ids.iter().any(|c| c == child_id))
                else {
                    return Vec::new();
                };
                husband_id
                    .as_deref()
                    .into_iter()
                    .chain(wife.wife_id.as_deref())
                    .collect()
            }
        }
    }

    /// Sant när alla platser (makar, make, hustrur) är ifyllda
    pub fn is_complete(&self) -> bool {
        match &self.kind {
            MarriageKind::Monogamous { spouses, .. } => spouses.iter().all(|s| s.is_some()),
            MarriageKind::Polygamous { husband_id, wives } => {
                husband_id.is_some() && wives.iter().all(|w| w.wife_id.is_some())
            }
        }
    }
}

/// Tomma strängar räknas som tomma platser
fn deserialize_slot<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Tar emot 0–2 poster och fyller ut med tomma platser
fn deserialize_spouses<'de, D>(deserializer: D) -> Result<[Option<String>; 2], D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Option<String>> = Vec::deserialize(deserializer)?;
    if raw.len() > 2 {
        return Err(serde::de::Error::invalid_length(
            raw.len(),
            &"högst två makar i ett monogamt äktenskap",
        ));
    }

    let mut slots: [Option<String>; 2] = [None, None];
    for (slot, value) in slots.iter_mut().zip(raw) {
        *slot = value.filter(|s| !s.trim().is_empty());
    }
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_monogamous() {
        let json = r#"{
            "id": "m1",
            "marriageType": "monogamous",
            "spouses": ["a", ""],
            "childrenIds": ["c1", "c2"]
        }"#;
        let marriage: Marriage = serde_json::from_str(json).unwrap();
        assert!(marriage.is_monogamous());
        assert!(marriage.is_active());
        assert_eq!(marriage.partner_ids(), vec!["a"]);
        assert_eq!(marriage.children(), vec!["c1", "c2"]);
        assert!(!marriage.is_complete());
    }

    #[test]
    fn test_deserialize_short_spouse_list() {
        let json = r#"{"id": "m1", "marriageType": "monogamous", "spouses": ["a"]}"#;
        let marriage: Marriage = serde_json::from_str(json).unwrap();
        match marriage.kind {
            MarriageKind::Monogamous { spouses, .. } => {
                assert_eq!(spouses, [Some("a".to_string()), None]);
            }
            _ => panic!("Förväntade monogamt äktenskap"),
        }
    }

    #[test]
    fn test_deserialize_too_many_spouses() {
        let json = r#"{"id": "m1", "marriageType": "monogamous", "spouses": ["a", "b", "c"]}"#;
        assert!(serde_json::from_str::<Marriage>(json).is_err());
    }

    #[test]
    fn test_deserialize_polygamous() {
        let json = r#"{
            "id": "m2",
            "marriageType": "polygamous",
            "husbandId": "h",
            "wives": [
                {"wifeId": "w1", "childrenIds": ["c1"]},
                {"wifeId": null, "childrenIds": ["c2", "c1"]}
            ],
            "pendingDeletion": true
        }"#;
        let marriage: Marriage = serde_json::from_str(json).unwrap();
        assert!(!marriage.is_monogamous());
        assert!(!marriage.is_active());
        assert_eq!(marriage.partner_ids(), vec!["h", "w1"]);
        assert_eq!(marriage.children(), vec!["c1", "c2"]);
        assert!(marriage.is_household_head("h"));
        assert!(!marriage.is_household_head("w1"));
        assert!(marriage.involves("w1"));
    }

    #[test]
    fn test_parents_of() {
        let marriage = Marriage::polygamous(
            "m1",
            Some("h"),
            vec![Wife::new(Some("w1"), &["c1"]), Wife::new(Some("w2"), &["c2"])],
        );
        assert_eq!(marriage.parents_of("c2"), vec!["h", "w2"]);
        assert!(marriage.parents_of("x").is_empty());

        let mono = Marriage::monogamous("m2", [Some("a"), Some("b")], &["c"]);
        assert_eq!(mono.parents_of("c"), vec!["a", "b"]);
    }
}
