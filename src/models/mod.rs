pub mod person;
pub mod marriage;
pub mod family;
pub mod layout;
pub mod config;

pub use person::*;
pub use marriage::*;
pub use family::*;
pub use layout::*;
pub use config::*;
