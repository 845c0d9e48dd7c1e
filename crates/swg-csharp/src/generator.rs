use log::{debug, info, warn};
use minijinja::{Environment, context};
use swg_core::config::{EmitOptions, TargetLanguage};
use swg_core::error::{EmitError, SpecFailure};
use swg_core::ir::Specification;
use swg_core::registry::NameRegistry;
use swg_core::{CodeGenerator, Generation};

use crate::emitters::{self, client, models, render_error};
use crate::type_mapper::{NORMALIZER, TypeMapper};

/// Types every document declares ahead of the specifications' own.
const SUPPORT_TYPES: &[&str] = &[
    "ResponseKind",
    "NoContent",
    "APIResponse",
    "QueryString",
];

const SUPPORT_SHAPE: &str = "<support>";

/// Class-based C# generator: models at namespace level, one partial client
/// class per specification.
pub struct CSharpGenerator;

/// One specification's share of the document.
struct Rendered {
    models: Vec<String>,
    client: String,
}

impl CodeGenerator for CSharpGenerator {
    fn language(&self) -> TargetLanguage {
        TargetLanguage::Csharp
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

        for name in SUPPORT_TYPES {
            registry.register(name, SUPPORT_SHAPE);
        }

        let mut models = Vec::new();
        let mut clients = Vec::new();
        for spec in specs {
            let mut staged = registry.stage();
            match emit_spec(&env, spec, options, &mut staged) {
                Ok(rendered) => {
                    registry.commit(staged);
                    models.extend(rendered.models);
                    clients.push(rendered.client);
                    generation.emitted.push(spec.source_id.clone());
                    for diagnostic in spec.diagnostics() {
                        warn!("{diagnostic}");
                        generation.diagnostics.push(diagnostic);
                    }
                    info!("{}: emitted C# client {}", spec.source_id, client::client_name(spec));
                }
                Err(error) => {
                    warn!("{}: C# emission failed: {error}", spec.source_id);
                    generation.failures.push(failure(spec, error));
                }
            }
        }

        if clients.is_empty() {
            return generation;
        }

        let document = env.get_template("document.cs.j2").and_then(|tmpl| {
            tmpl.render(context! {
                header => format!("Generated by swg {}", env!("CARGO_PKG_VERSION")),
                namespace => NORMALIZER.normalize_path(&options.namespace),
                models => models,
                clients => clients,
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

/// Plan, claim and render one specification against a staged registry.
fn emit_spec(
    env: &Environment<'_>,
    spec: &Specification,
    options: &EmitOptions,
    registry: &mut NameRegistry,
) -> Result<Rendered, EmitError> {
    let mut mapper = TypeMapper::new(spec);
    models::plan_definitions(&mut mapper)?;
    let client_ctx = client::client_ctx(&mut mapper, options)?;

    let client_name = client::client_name(spec);
    registry.claim(&client_name, &format!("<client {}>", spec.source_id))?;

    let model_tmpl = env.get_template("model.cs.j2").map_err(render_error)?;
    let mut rendered = Vec::new();
    for model in mapper.into_models() {
        if !registry.claim(model.name(), model.shape())? {
            debug!("{}: `{}` already declared, skipping", spec.source_id, model.name());
            continue;
        }
        let text = model_tmpl
            .render(context! { model => model.to_context() })
            .map_err(render_error)?;
        rendered.push(text.trim_end_matches('\n').to_string());
    }

    let client = env
        .get_template("client.cs.j2")
        .and_then(|tmpl| tmpl.render(client_ctx))
        .map_err(render_error)?;

    Ok(Rendered {
        models: rendered,
        client: client.trim_end_matches('\n').to_string(),
    })
}

fn failure(spec: &Specification, error: EmitError) -> SpecFailure {
    SpecFailure {
        source_id: spec.source_id.clone(),
        title: spec.info.title.clone(),
        error,
    }
}
