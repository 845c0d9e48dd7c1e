use log::warn;
use serde_json::Value;

use crate::error::ParseError;
use crate::ir::{
    ArraySchema, Constraints, Literal, ObjectSchema, PrimitiveSchema, PrimitiveType, Property,
    Schema,
};
use crate::parse::schema::{self as raw, AdditionalProperties};

use super::name_normalizer::definition_ref_name;

/// Convert a raw schema into an IR schema. `path` is the JSON path of the
/// node, used in error messages.
pub fn to_ir_schema(schema: &raw::Schema, path: &str) -> Result<Schema, ParseError> {
    if let Some(ref_path) = &schema.ref_path {
        return definition_ref_name(ref_path)
            .map(|name| Schema::Reference(name.to_string()))
            .ok_or_else(|| {
                ParseError::invalid(
                    format!("{path}.$ref"),
                    format!("`{ref_path}` is not a `#/definitions/` reference"),
                )
            });
    }

    match schema.schema_type.as_deref() {
        Some("array") => {
            let items = match &schema.items {
                Some(items) => to_ir_schema(items, &format!("{path}.items"))?,
                None => {
                    warn!("{path}: array without `items`, treating elements as object");
                    Schema::any()
                }
            };
            Ok(Schema::Array(ArraySchema {
                items: Box::new(items),
                description: schema.description.clone(),
                constraints: to_ir_constraints(&schema.constraints),
            }))
        }
        Some("object") => to_ir_object(schema, path),
        None => to_ir_object(schema, path),
        Some(other) => match PrimitiveType::from_type_name(other) {
            Some(primitive) => Ok(Schema::Primitive(to_ir_primitive(
                primitive,
                PrimitiveParts {
                    format: schema.format.as_deref(),
                    description: schema.description.as_deref(),
                    constraints: &schema.constraints,
                    enum_values: &schema.enum_values,
                    default: schema.default_value.as_ref(),
                },
                path,
            ))),
            None => Err(ParseError::invalid(
                format!("{path}.type"),
                format!("unknown type `{other}`"),
            )),
        },
    }
}

fn to_ir_object(schema: &raw::Schema, path: &str) -> Result<Schema, ParseError> {
    let mut properties = Vec::with_capacity(schema.properties.len());
    for (name, prop) in &schema.properties {
        properties.push(Property {
            name: name.clone(),
            schema: to_ir_schema(prop, &format!("{path}.properties.{name}"))?,
            required: schema.required.iter().any(|r| r == name),
        });
    }

    let additional_properties = match &schema.additional_properties {
        Some(AdditionalProperties::Schema(extra)) => Some(Box::new(to_ir_schema(
            extra,
            &format!("{path}.additionalProperties"),
        )?)),
        Some(AdditionalProperties::Bool(true)) if properties.is_empty() => {
            Some(Box::new(Schema::any()))
        }
        _ => None,
    };

    Ok(Schema::Object(ObjectSchema {
        title: schema.title.clone(),
        description: schema.description.clone(),
        properties,
        additional_properties,
    }))
}

/// The keywords a primitive is built from, borrowed from whichever raw node
/// (schema, parameter) carries them.
pub(crate) struct PrimitiveParts<'a> {
    pub format: Option<&'a str>,
    pub description: Option<&'a str>,
    pub constraints: &'a raw::Constraints,
    pub enum_values: &'a [Value],
    pub default: Option<&'a Value>,
}

pub(crate) fn to_ir_primitive(
    primitive: PrimitiveType,
    parts: PrimitiveParts<'_>,
    path: &str,
) -> PrimitiveSchema {
    let enum_values = if parts.enum_values.is_empty() {
        Vec::new()
    } else if primitive == PrimitiveType::String {
        parts
            .enum_values
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect()
    } else {
        warn!(
            "{path}: enum on a {} value is not supported, ignoring it",
            primitive.as_str()
        );
        Vec::new()
    };

    let default = parts.default.and_then(|value| {
        let literal = to_literal(primitive, value);
        if literal.is_none() {
            warn!(
                "{path}: default {value} does not match type {}, ignoring it",
                primitive.as_str()
            );
        }
        literal
    });

    PrimitiveSchema {
        primitive,
        format: parts.format.map(str::to_string),
        description: parts.description.map(str::to_string),
        constraints: to_ir_constraints(parts.constraints),
        enum_values,
        default,
    }
}

/// Type a JSON default against the declared primitive.
fn to_literal(primitive: PrimitiveType, value: &Value) -> Option<Literal> {
    match (primitive, value) {
        (PrimitiveType::String, Value::String(s)) => Some(Literal::String(s.clone())),
        (PrimitiveType::Integer, Value::Number(n)) => n.as_i64().map(Literal::Integer),
        (PrimitiveType::Number, Value::Number(n)) => n.as_f64().map(Literal::Number),
        (PrimitiveType::Boolean, Value::Bool(b)) => Some(Literal::Boolean(*b)),
        _ => None,
    }
}

pub(crate) fn to_ir_constraints(c: &raw::Constraints) -> Constraints {
    Constraints {
        maximum: c.maximum,
        exclusive_maximum: c.exclusive_maximum.unwrap_or(false),
        minimum: c.minimum,
        exclusive_minimum: c.exclusive_minimum.unwrap_or(false),
        max_length: c.max_length,
        min_length: c.min_length,
        pattern: c.pattern.clone(),
        max_items: c.max_items,
        min_items: c.min_items,
        unique_items: c.unique_items.unwrap_or(false),
        multiple_of: c.multiple_of,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Schema, ParseError> {
        let schema: raw::Schema = serde_json::from_str(json).unwrap();
        to_ir_schema(&schema, "definitions.Test")
    }

    #[test]
    fn test_ref_wins_over_type() {
        let s = parse(r##"{"$ref": "#/definitions/Pet", "type": "string"}"##).unwrap();
        assert_eq!(s, Schema::Reference("Pet".into()));
    }

    #[test]
    fn test_non_local_ref_is_rejected() {
        let err = parse(r#"{"$ref": "other.json#/Pet"}"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidField { ref field, .. } if field == "definitions.Test.$ref"));
    }

    #[test]
    fn test_object_keeps_property_order_and_required() {
        let s = parse(
            r#"{"type": "object", "required": ["name"],
                "properties": {"name": {"type": "string"}, "age": {"type": "integer"}}}"#,
        )
        .unwrap();
        let Schema::Object(o) = s else {
            panic!("expected object");
        };
        let names: Vec<_> = o.properties.iter().map(|p| (p.name.as_str(), p.required)).collect();
        assert_eq!(names, vec![("name", true), ("age", false)]);
    }

    #[test]
    fn test_untyped_with_properties_is_object() {
        let s = parse(r#"{"properties": {"a": {"type": "boolean"}}}"#).unwrap();
        assert!(matches!(s, Schema::Object(ref o) if o.properties.len() == 1));
        assert!(parse("{}").unwrap().is_any());
    }

    #[test]
    fn test_array_of_arrays() {
        let s = parse(r#"{"type": "array", "items": {"type": "array", "items": {"type": "number"}}}"#)
            .unwrap();
        assert_eq!(s.shape(), "[[number]]");
    }

    #[test]
    fn test_array_without_items_degrades() {
        let s = parse(r#"{"type": "array"}"#).unwrap();
        assert_eq!(s.shape(), "[{}]");
    }

    #[test]
    fn test_dictionary() {
        let s = parse(r#"{"type": "object", "additionalProperties": {"type": "integer"}}"#).unwrap();
        let Schema::Object(o) = s else {
            panic!("expected object");
        };
        assert_eq!(o.additional_properties.unwrap().shape(), "integer");
    }

    #[test]
    fn test_enum_only_on_strings() {
        let s = parse(r#"{"type": "string", "enum": ["a", "b"]}"#).unwrap();
        assert!(s.is_string_enum());
        let n = parse(r#"{"type": "integer", "enum": [1, 2]}"#).unwrap();
        assert!(matches!(n, Schema::Primitive(ref p) if p.enum_values.is_empty()));
    }

    #[test]
    fn test_typed_defaults() {
        let s = parse(r#"{"type": "integer", "default": 20}"#).unwrap();
        assert!(matches!(s, Schema::Primitive(ref p) if p.default == Some(Literal::Integer(20))));
        let mismatched = parse(r#"{"type": "integer", "default": "20"}"#).unwrap();
        assert!(matches!(mismatched, Schema::Primitive(ref p) if p.default.is_none()));
    }

    #[test]
    fn test_unknown_type() {
        let err = parse(r#"{"type": "date"}"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidField { ref field, .. } if field == "definitions.Test.type"));
    }
}
