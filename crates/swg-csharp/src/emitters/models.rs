use heck::ToPascalCase;
use minijinja::context;
use swg_core::error::EmitError;
use swg_core::ir::{ObjectSchema, Schema};
use swg_core::transform::name_normalizer::sanitize_identifier;

use super::{escape_xml, one_line, unique_name};
use crate::type_mapper::{NORMALIZER, TypeMapper, member_name, string_literal, type_name};

/// A namespace-level type declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    Class {
        name: String,
        description: Option<String>,
        /// `List<T>` or `Dictionary<string, T>` for collection definitions.
        base: Option<String>,
        properties: Vec<ModelProperty>,
        /// Member collecting `additionalProperties` beside declared ones.
        extension_data: Option<String>,
        shape: String,
    },
    Enum {
        name: String,
        description: Option<String>,
        members: Vec<EnumMember>,
        shape: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelProperty {
    pub name: String,
    pub wire_name: String,
    pub cs_type: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: String,
}

impl Model {
    pub fn name(&self) -> &str {
        match self {
            Model::Class { name, .. } | Model::Enum { name, .. } => name,
        }
    }

    /// Signature the registry compares across specifications.
    pub fn shape(&self) -> &str {
        match self {
            Model::Class { shape, .. } | Model::Enum { shape, .. } => shape,
        }
    }

    pub fn to_context(&self) -> minijinja::Value {
        match self {
            Model::Class {
                name,
                description,
                base,
                properties,
                extension_data,
                ..
            } => {
                let declaration = match base {
                    Some(base) => format!("{name} : {base}"),
                    None => name.clone(),
                };
                let properties: Vec<_> = properties
                    .iter()
                    .map(|p| {
                        context! {
                            name => p.name,
                            wire_name => string_literal(&p.wire_name),
                            cs_type => p.cs_type,
                            description => p.description.as_deref().map(escape_xml),
                        }
                    })
                    .collect();
                context! {
                    kind => "class",
                    declaration => declaration,
                    description => description.as_deref().map(escape_xml),
                    properties => properties,
                    extension_data => extension_data,
                }
            }
            Model::Enum {
                name,
                description,
                members,
                ..
            } => {
                let members: Vec<_> = members
                    .iter()
                    .map(|m| context! { name => m.name, value => string_literal(&m.value) })
                    .collect();
                context! {
                    kind => "enum",
                    name => name,
                    description => description.as_deref().map(escape_xml),
                    members => members,
                }
            }
        }
    }
}

/// Name of the companion enum (or inline class) for `owner.property`.
pub fn member_type_name(owner: &str, property: &str) -> String {
    type_name(&format!(
        "{owner}{}",
        sanitize_identifier(property).to_pascal_case()
    ))
}

/// A class for an object schema. Property types are mapped through
/// `mapper`, which may declare further models for inline members.
pub fn class_model(
    mapper: &mut TypeMapper<'_>,
    name: &str,
    object: &ObjectSchema,
    shape: String,
    context: &str,
) -> Result<Model, EmitError> {
    let mut properties: Vec<ModelProperty> = Vec::with_capacity(object.properties.len());
    for prop in &object.properties {
        let hint = member_type_name(name, &prop.name);
        let mapped = mapper.map(&prop.schema, &hint, &format!("{context}.{}", prop.name))?;
        let cs_type = if prop.required {
            mapped.name
        } else {
            mapped.nullable()
        };

        let member = unique_name(&member_name(&prop.name, name), |n| {
            properties.iter().any(|p| p.name == n)
        });
        properties.push(ModelProperty {
            name: member,
            wire_name: prop.name.clone(),
            cs_type,
            description: one_line(prop.schema.description()),
        });
    }

    let extension_data = object.additional_properties.as_ref().map(|_| {
        unique_name("AdditionalProperties", |n| {
            n == name || properties.iter().any(|p| p.name == n)
        })
    });

    Ok(Model::Class {
        name: name.to_string(),
        description: one_line(object.description.as_deref()),
        base: None,
        properties,
        extension_data,
        shape,
    })
}

/// An enum for a string-enum schema; members are PascalCase values.
pub fn enum_model(name: &str, schema: &Schema) -> Model {
    let values: &[String] = match schema {
        Schema::Primitive(p) => &p.enum_values,
        _ => &[],
    };
    let mut members: Vec<EnumMember> = Vec::with_capacity(values.len());
    for value in values {
        let member = unique_name(&member_name(value, ""), |n| members.iter().any(|m| m.name == n));
        members.push(EnumMember {
            name: member,
            value: value.clone(),
        });
    }

    Model::Enum {
        name: name.to_string(),
        description: one_line(schema.description()),
        members,
        shape: schema.shape(),
    }
}

fn collection_model(
    name: &str,
    description: Option<&str>,
    base: Option<String>,
    schema: &Schema,
) -> Model {
    Model::Class {
        name: name.to_string(),
        description: one_line(description),
        base,
        properties: Vec::new(),
        extension_data: None,
        shape: schema.shape(),
    }
}

/// Declare a model for every definition that needs one, in document order.
///
/// Primitive and alias definitions are not declared; references to them
/// map straight to their target type.
pub fn plan_definitions(mapper: &mut TypeMapper<'_>) -> Result<(), EmitError> {
    let spec = mapper.spec();
    for (raw_name, schema) in &spec.definitions {
        if NORMALIZER.is_any(raw_name) {
            continue;
        }
        let name = type_name(raw_name);
        let context = format!("definition `{name}`");

        match schema {
            Schema::Object(object) if object.properties.is_empty() => mapper.declare(|mapper| {
                let base = match &object.additional_properties {
                    Some(extra) => {
                        let value = mapper.map(extra, &format!("{name}Value"), &context)?;
                        Some(format!("Dictionary<string, {}>", value.name))
                    }
                    None => None,
                };
                Ok(collection_model(&name, object.description.as_deref(), base, schema))
            })?,
            Schema::Object(object) => {
                mapper.declare_class(&name, object, schema.shape(), &context)?;
            }
            Schema::Array(array) => mapper.declare(|mapper| {
                let item = mapper.map(&array.items, &format!("{name}Item"), &context)?;
                let base = Some(format!("List<{}>", item.name));
                Ok(collection_model(&name, array.description.as_deref(), base, schema))
            })?,
            Schema::Primitive(p) if p.is_string_enum() => {
                mapper.push(enum_model(&name, schema));
            }
            Schema::Primitive(_) | Schema::Reference(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use swg_core::parse;

    fn plan(json: &str) -> Vec<Model> {
        let spec = parse::parse_specification("test.json", json).unwrap();
        let mut mapper = TypeMapper::new(&spec);
        plan_definitions(&mut mapper).unwrap();
        mapper.into_models()
    }

    #[test]
    fn test_companion_enum_follows_owner() {
        let models = plan(
            r#"{"swagger": "2.0", "info": {"title": "T", "version": "1"}, "paths": {},
                "definitions": {"Pet": {"type": "object", "required": ["id"], "properties": {
                    "id": {"type": "integer", "format": "int64"},
                    "status": {"type": "string", "enum": ["available", "light blue"]}
                }}}}"#,
        );
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name(), "Pet");
        let Model::Class { properties, .. } = &models[0] else {
            panic!("expected a class");
        };
        assert_eq!(properties[0].cs_type, "long");
        assert_eq!(properties[1].name, "Status");
        assert_eq!(properties[1].cs_type, "PetStatus?");

        let Model::Enum { name, members, .. } = &models[1] else {
            panic!("expected an enum");
        };
        assert_eq!(name, "PetStatus");
        assert_eq!(members[1].name, "LightBlue");
        assert_eq!(members[1].value, "light blue");
    }

    #[test]
    fn test_collection_and_primitive_definitions() {
        let models = plan(
            r#"{"swagger": "2.0", "info": {"title": "T", "version": "1"}, "paths": {},
                "definitions": {
                    "Labels": {"type": "array", "items": {"type": "string"}},
                    "Stock": {"type": "object", "additionalProperties": {"type": "integer"}},
                    "Sku": {"type": "string"},
                    "object": {"type": "object"}
                }}"#,
        );
        let bases: Vec<_> = models
            .iter()
            .map(|m| match m {
                Model::Class { name, base, .. } => (name.as_str(), base.as_deref()),
                Model::Enum { name, .. } => (name.as_str(), None),
            })
            .collect();
        assert_eq!(
            bases,
            vec![
                ("Labels", Some("List<string>")),
                ("Stock", Some("Dictionary<string, int>"))
            ]
        );
    }

    #[test]
    fn test_additional_properties_beside_members() {
        let models = plan(
            r#"{"swagger": "2.0", "info": {"title": "T", "version": "1"}, "paths": {},
                "definitions": {"Bag": {"type": "object",
                    "properties": {"additionalProperties": {"type": "string"}},
                    "additionalProperties": {"type": "integer"}
                }}}"#,
        );
        let Model::Class {
            properties,
            extension_data,
            ..
        } = &models[0]
        else {
            panic!("expected a class");
        };
        assert_eq!(properties[0].name, "AdditionalProperties");
        assert_eq!(extension_data.as_deref(), Some("AdditionalProperties2"));
    }

    #[test]
    fn test_duplicate_member_names_get_suffix() {
        let models = plan(
            r#"{"swagger": "2.0", "info": {"title": "T", "version": "1"}, "paths": {},
                "definitions": {"Row": {"type": "object", "properties": {
                    "a-b": {"type": "string"},
                    "aB": {"type": "string"}
                }}}}"#,
        );
        let Model::Class { properties, .. } = &models[0] else {
            panic!("expected a class");
        };
        assert_eq!(properties[0].name, "AB");
        assert_eq!(properties[1].name, "AB2");
        assert_eq!(properties[1].wire_name, "aB");
    }
}
