use minijinja::context;
use swg_core::error::EmitError;
use swg_core::ir::{Operation, Specification};
use swg_core::transform::name_normalizer::route_operation_name;

use super::one_line;
use super::types::Declaration;
use crate::type_mapper::{NORMALIZER, TypeMapper};

/// `operationId` when present, otherwise `<verb><Segments>` with `By<Name>`
/// for template segments.
pub fn method_name(op: &Operation) -> String {
    match &op.operation_id {
        Some(id) => NORMALIZER.normalize(id),
        None => route_operation_name(op.method.as_str(), &op.path),
    }
}

pub fn request_name(op: &Operation) -> String {
    format!("{}Request", method_name(op))
}

/// One request interface per operation that takes parameters.
pub fn plan_requests(spec: &Specification) -> Vec<Declaration<'_>> {
    spec.operations()
        .filter_map(|(item, op)| {
            let parameters = item.effective_parameters(op);
            if parameters.is_empty() {
                return None;
            }
            Some(Declaration::Request {
                name: request_name(op),
                operation: op,
                parameters,
            })
        })
        .collect()
}

/// Signatures for the module's `API` interface.
pub fn method_contexts(
    spec: &Specification,
    mapper: &TypeMapper<'_>,
) -> Result<Vec<minijinja::Value>, EmitError> {
    let mut methods = Vec::new();
    for (item, op) in spec.operations() {
        let parameters = item.effective_parameters(op);
        let params = if parameters.is_empty() {
            String::new()
        } else {
            let marker = if parameters.iter().any(|p| p.required()) { "" } else { "?" };
            format!("parameters{marker}: {}", mapper.type_name(&request_name(op)))
        };

        let context = format!("operation `{}`", op.label());
        let return_type = match op.canonical_success().and_then(|r| r.schema.as_ref()) {
            Some(schema) => mapper.map(schema, &context)?,
            None => "void".to_string(),
        };

        methods.push(context! {
            name => method_name(op),
            params => params,
            return_type => return_type,
            summary => one_line(op.summary.as_deref().or(op.description.as_deref())),
            deprecated => op.deprecated,
        });
    }
    Ok(methods)
}
