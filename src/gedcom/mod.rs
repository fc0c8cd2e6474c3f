//! GEDCOM-import för layoutmotorn
//!
//! Stöder GEDCOM 5.5: INDI (NAME, SEX, BIRT, DEAT) och FAM (HUSB, WIFE, CHIL).

pub mod convert;
pub mod models;
pub mod parser;

pub use convert::load_family_data;
pub use models::*;
pub use parser::{GedcomParser, GedcomRecord};
