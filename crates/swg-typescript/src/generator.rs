use std::collections::HashMap;

use log::{info, warn};
use minijinja::context;
use swg_core::config::{EmitOptions, TargetLanguage};
use swg_core::error::{EmitError, SpecFailure};
use swg_core::ir::Specification;
use swg_core::registry::NameRegistry;
use swg_core::{CodeGenerator, Generation};

use crate::emitters::{self, module, render_error};
use crate::type_mapper::NORMALIZER;

/// Interface-based TypeScript generator: one namespace holding one module
/// per specification.
pub struct TypeScriptGenerator;

impl CodeGenerator for TypeScriptGenerator {
    fn language(&self) -> TargetLanguage {
        TargetLanguage::Typescript
    }

    fn generate_with_registry(
        &self,
        specs: &[Specification],
        options: &EmitOptions,
        registry: &mut NameRegistry,
    ) -> Generation {
        let mut generation = Generation::default();
        let env = match emitters::environment() {
            Ok(env) => env,
            Err(error) => {
                generation.failures = specs.iter().map(|s| failure(s, error.clone())).collect();
                return generation;
            }
        };

        let mut owners = HashMap::new();
        let mut modules = Vec::new();
        for spec in specs {
            let mut staged = registry.stage();
            let mut staged_owners = owners.clone();
            match module::emit_module(&env, spec, &mut staged, &mut staged_owners) {
                Ok(text) => {
                    registry.commit(staged);
                    owners = staged_owners;
                    modules.push(text);
                    generation.emitted.push(spec.source_id.clone());
                    generation.diagnostics.extend(spec.diagnostics());
                    info!("{}: emitted TypeScript module {}", spec.source_id, module::module_name(spec));
                }
                Err(error) => {
                    warn!("{}: TypeScript emission failed: {error}", spec.source_id);
                    generation.failures.push(failure(spec, error));
                }
            }
        }

        if modules.is_empty() {
            return generation;
        }

        let document = env.get_template("document.ts.j2").and_then(|tmpl| {
            tmpl.render(context! {
                header => format!("Generated by swg {}", env!("CARGO_PKG_VERSION")),
                namespace => NORMALIZER.normalize_path(&options.namespace),
                modules => modules,
            })
        });
        match document {
            Ok(mut content) => {
                content.push('\n');
                generation.content = Some(content);
            }
            Err(err) => {
                let error = render_error(err);
                let emitted = std::mem::take(&mut generation.emitted);
                generation.failures.extend(
                    specs
                        .iter()
                        .filter(|s| emitted.contains(&s.source_id))
                        .map(|s| failure(s, error.clone())),
                );
            }
        }
        generation
    }
}

fn failure(spec: &Specification, error: EmitError) -> SpecFailure {
    SpecFailure {
        source_id: spec.source_id.clone(),
        title: spec.info.title.clone(),
        error,
    }
}
