use std::collections::HashMap;

use swg_core::error::EmitError;
use swg_core::ir::{ObjectSchema, PrimitiveSchema, PrimitiveType, Schema, Specification};
use swg_core::transform::NameNormalizer;

/// Type-name normalizer for TypeScript output; `object` becomes `any`.
pub const NORMALIZER: NameNormalizer = NameNormalizer::new("any");

/// Map a primitive to its TypeScript type. Dates stay `string` on the wire.
pub fn primitive_to_ts(primitive: &PrimitiveSchema) -> &'static str {
    match primitive.primitive {
        PrimitiveType::String => "string",
        PrimitiveType::Integer | PrimitiveType::Number => "number",
        PrimitiveType::Boolean => "boolean",
        PrimitiveType::File => "Blob",
    }
}

/// Quote a value as a TypeScript string literal.
pub fn string_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// A property key: bare when it is an identifier, quoted otherwise.
pub fn field_name(name: &str) -> String {
    let mut chars = name.chars();
    let is_identifier = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_' || first == '$')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        None => false,
    };
    if is_identifier {
        name.to_string()
    } else {
        string_literal(name)
    }
}

/// Resolves schemas to TypeScript type expressions inside one module.
///
/// `owners` maps each declared type name to the module that declared it, so
/// a type deduplicated into an earlier module is referenced qualified.
pub struct TypeMapper<'a> {
    spec: &'a Specification,
    module: &'a str,
    owners: &'a HashMap<String, String>,
}

impl<'a> TypeMapper<'a> {
    pub fn new(
        spec: &'a Specification,
        module: &'a str,
        owners: &'a HashMap<String, String>,
    ) -> Self {
        Self {
            spec,
            module,
            owners,
        }
    }

    /// The expression naming a declared type from inside this module.
    pub fn type_name(&self, name: &str) -> String {
        match self.owners.get(name) {
            Some(owner) if owner != self.module => format!("{owner}.{name}"),
            _ => name.to_string(),
        }
    }

    /// Map a schema. `context` names the declaration being rendered and is
    /// carried into [`EmitError::UnresolvedRef`].
    pub fn map(&self, schema: &Schema, context: &str) -> Result<String, EmitError> {
        match schema {
            Schema::Reference(name) => {
                if self.spec.definition(name).is_none() {
                    return Err(EmitError::UnresolvedRef {
                        name: name.clone(),
                        context: context.to_string(),
                    });
                }
                let normalized = NORMALIZER.normalize(name);
                if normalized == NORMALIZER.any_type() {
                    return Ok(normalized);
                }
                Ok(self.type_name(&normalized))
            }
            Schema::Array(array) => Ok(format!("Array<{}>", self.map(&array.items, context)?)),
            Schema::Object(_) if schema.is_any() => Ok(NORMALIZER.any_type().to_string()),
            Schema::Object(object) => self.map_inline_object(object, context),
            Schema::Primitive(p) if p.is_string_enum() => Ok(p
                .enum_values
                .iter()
                .map(|v| string_literal(v))
                .collect::<Vec<_>>()
                .join(" | ")),
            Schema::Primitive(p) => Ok(primitive_to_ts(p).to_string()),
        }
    }

    fn map_inline_object(&self, object: &ObjectSchema, context: &str) -> Result<String, EmitError> {
        let mut members = Vec::with_capacity(object.properties.len() + 1);
        for prop in &object.properties {
            members.push(format!(
                "{}{}: {}",
                field_name(&prop.name),
                if prop.required { "" } else { "?" },
                self.map(&prop.schema, context)?
            ));
        }
        if let Some(extra) = &object.additional_properties {
            members.push(format!("[key: string]: {}", self.index_type(object, extra, context)?));
        }
        Ok(format!("{{ {} }}", members.join("; ")))
    }

    /// Index signature value type. Named properties must stay assignable to
    /// it, so it widens to `any` when the object also has properties.
    pub fn index_type(
        &self,
        object: &ObjectSchema,
        extra: &Schema,
        context: &str,
    ) -> Result<String, EmitError> {
        if object.properties.is_empty() {
            self.map(extra, context)
        } else {
            Ok("any".to_string())
        }
    }
}
