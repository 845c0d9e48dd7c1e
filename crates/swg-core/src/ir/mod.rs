pub mod operations;
pub mod schemas;
pub mod security;
pub mod types;

pub use operations::*;
pub use schemas::*;
pub use security::*;
pub use types::{Contact, ExternalDocs, Info, License, Specification, Tag};
