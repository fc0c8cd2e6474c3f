//! Genlib Layout - layoutmotor för släktträd
//!
//! Beräknar positioner för personer, äktenskapsnoder och kanter i ett
//! släktträd, vertikalt eller horisontellt, utifrån en rotperson.

pub mod gedcom;
pub mod models;
pub mod services;
pub mod utils;

// Re-exports
pub use models::*;
pub use services::{calculate_layout, TreeLayoutService};
pub use utils::{LayoutError, LayoutResult};
