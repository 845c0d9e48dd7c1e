pub mod name_normalizer;
pub mod schema_resolver;
pub mod spec_to_ir;

pub use name_normalizer::NameNormalizer;
pub use spec_to_ir::transform;
