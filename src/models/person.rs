use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::date::is_present;

/// Kön
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Male => "Man",
            Self::Female => "Kvinna",
        }
    }

    /// Tolka GEDCOM SEX-värde (M/F)
    pub fn from_gedcom(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "M" => Some(Self::Male),
            "F" => Some(Self::Female),
            _ => None,
        }
    }
}

/// Hur en person är markerad för borttagning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionMode {
    #[default]
    None,
    Soft,
    Cascade,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub gender: Option<Gender>,
    #[serde(alias = "dateOfBirth", skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(alias = "dateOfDeath", skip_serializing_if = "Option::is_none")]
    pub dod: Option<String>,
    pub is_placeholder: bool,
    pub is_collapsed: bool,
    pub deletion_mode: DeletionMode,
    pub pending_deletion: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undo_expires_at: Option<DateTime<Utc>>,
}

impl Person {
    pub fn new(id: impl Into<String>, name: impl Into<String>, gender: Option<Gender>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            gender,
            ..Default::default()
        }
    }

    /// Skapa en syntetisk "okänd" person för en tom plats i ett äktenskap
    pub fn placeholder(id: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: id.into(),
            name: "Okänd".to_string(),
            gender: Some(gender),
            is_placeholder: true,
            ..Default::default()
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Okänd"
        } else {
            &self.name
        }
    }

    /// Ett angivet dödsdatum innebär att personen är avliden
    pub fn is_dead(&self) -> bool {
        is_present(&self.dod)
    }

    /// Mjukt borttagen men fortfarande synlig (kan ångras)
    pub fn is_soft_deleted(&self) -> bool {
        self.deletion_mode == DeletionMode::Soft
            || (self.pending_deletion && self.deletion_mode != DeletionMode::Cascade)
    }
}
