pub mod date;
pub mod error;

pub use error::{require_root_id, LayoutError, LayoutResult};
