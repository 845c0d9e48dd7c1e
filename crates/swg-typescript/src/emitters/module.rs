use std::collections::HashMap;

use log::debug;
use minijinja::{Environment, context};
use swg_core::error::EmitError;
use swg_core::ir::Specification;
use swg_core::registry::NameRegistry;

use super::types::{self, Declaration};
use super::{api, render_error};
use crate::type_mapper::{NORMALIZER, TypeMapper};

/// The interface every module declares for its operations.
pub const API_INTERFACE: &str = "API";

/// Module name for a specification, from its title.
pub fn module_name(spec: &Specification) -> String {
    NORMALIZER.normalize(&spec.info.title)
}

/// Render `export module <Title> { .. }` for one specification.
///
/// A definition named like [`API_INTERFACE`] would merge with the module's
/// operations interface and fails the module. Names are claimed in
/// `registry` before anything renders; `owners`
/// records which module declared each claimed name. Both should be staged
/// copies the caller discards if this fails.
pub fn emit_module(
    env: &Environment<'_>,
    spec: &Specification,
    registry: &mut NameRegistry,
    owners: &mut HashMap<String, String>,
) -> Result<String, EmitError> {
    let name = module_name(spec);

    let mut planned: Vec<Declaration<'_>> = types::plan_definitions(spec);
    planned.extend(api::plan_requests(spec));

    let mut declared = Vec::with_capacity(planned.len());
    for decl in planned {
        if decl.name() == API_INTERFACE {
            return Err(EmitError::NameCollision {
                name: API_INTERFACE.to_string(),
            });
        }
        if registry.claim(decl.name(), &decl.shape())? {
            owners.insert(decl.name().to_string(), name.clone());
            declared.push(decl);
        } else {
            debug!("{}: `{}` already declared, skipping", spec.source_id, decl.name());
        }
    }

    let mapper = TypeMapper::new(spec, &name, owners);
    let declarations = declared
        .iter()
        .map(|decl| types::declaration_ctx(&mapper, decl))
        .collect::<Result<Vec<_>, _>>()?;
    let methods = api::method_contexts(spec, &mapper)?;

    let tmpl = env.get_template("module.ts.j2").map_err(render_error)?;
    tmpl.render(context! {
        name => name,
        api_name => API_INTERFACE,
        declarations => declarations,
        methods => methods,
    })
    .map_err(render_error)
}
