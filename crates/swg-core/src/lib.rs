pub mod config;
pub mod error;
pub mod ir;
pub mod parse;
pub mod registry;
pub mod transform;

use config::{EmitOptions, TargetLanguage};
use error::{Diagnostic, SpecFailure};
use registry::NameRegistry;

/// The single document an emitter renders for a batch of specifications.
#[derive(Debug, Default)]
pub struct Generation {
    /// `None` when no specification rendered; nothing should be written.
    pub content: Option<String>,
    /// Source ids of the specifications that made it into `content`.
    pub emitted: Vec<String>,
    pub failures: Vec<SpecFailure>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Trait for emitters that render a batch of IR specifications into one
/// target-language document.
pub trait CodeGenerator {
    fn language(&self) -> TargetLanguage;

    /// Render against an explicit registry, so callers can share one
    /// across several calls.
    fn generate_with_registry(
        &self,
        specs: &[ir::Specification],
        options: &EmitOptions,
        registry: &mut NameRegistry,
    ) -> Generation;

    fn generate(&self, specs: &[ir::Specification], options: &EmitOptions) -> Generation {
        let mut registry = NameRegistry::new();
        self.generate_with_registry(specs, options, &mut registry)
    }
}
