use heck::ToPascalCase;
use minijinja::context;
use swg_core::error::EmitError;
use swg_core::ir::{Operation, Parameter, Schema, Specification};
use swg_core::transform::name_normalizer::sanitize_identifier;

use super::one_line;
use crate::type_mapper::{NORMALIZER, TypeMapper, field_name, primitive_to_ts, string_literal};

/// A type this module wants to declare, before the registry decides whether
/// it is new.
pub enum Declaration<'a> {
    Definition {
        name: String,
        schema: &'a Schema,
    },
    /// A string-enum property lifted out of its owning definition.
    Enum {
        name: String,
        schema: &'a Schema,
    },
    /// The parameter interface of one operation.
    Request {
        name: String,
        operation: &'a Operation,
        parameters: Vec<&'a Parameter>,
    },
}

impl Declaration<'_> {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Definition { name, .. }
            | Declaration::Enum { name, .. }
            | Declaration::Request { name, .. } => name,
        }
    }

    pub fn shape(&self) -> String {
        match self {
            Declaration::Definition { schema, .. } | Declaration::Enum { schema, .. } => {
                schema.shape()
            }
            Declaration::Request { parameters, .. } => {
                let fields: Vec<String> = parameters
                    .iter()
                    .map(|p| {
                        let schema = match p {
                            Parameter::Path(s) | Parameter::Query(s) | Parameter::Header(s) => {
                                s.value.to_schema()
                            }
                            Parameter::Body(b) | Parameter::FormData(b) => b.schema.clone(),
                        };
                        format!(
                            "{}{}:{}",
                            p.name(),
                            if p.required() { "" } else { "?" },
                            schema.shape()
                        )
                    })
                    .collect();
                format!("request({})", fields.join(","))
            }
        }
    }
}

/// Name of the enum lifted from `owner.property`.
pub fn companion_enum_name(owner: &str, property: &str) -> String {
    NORMALIZER.normalize(&format!(
        "{owner}{}",
        sanitize_identifier(property).to_pascal_case()
    ))
}

/// Every definition plus the companion enums of its string-enum properties,
/// in document order. Definitions named like the any type are not declared.
pub fn plan_definitions(spec: &Specification) -> Vec<Declaration<'_>> {
    let mut planned = Vec::new();
    for (raw_name, schema) in &spec.definitions {
        if NORMALIZER.is_any(raw_name) {
            continue;
        }
        let name = NORMALIZER.normalize(raw_name);
        planned.push(Declaration::Definition {
            name: name.clone(),
            schema,
        });
        if let Schema::Object(object) = schema {
            for prop in object.properties.iter().filter(|p| p.schema.is_string_enum()) {
                planned.push(Declaration::Enum {
                    name: companion_enum_name(&name, &prop.name),
                    schema: &prop.schema,
                });
            }
        }
    }
    planned
}

/// Render one declaration into its template context.
pub fn declaration_ctx(
    mapper: &TypeMapper<'_>,
    decl: &Declaration<'_>,
) -> Result<minijinja::Value, EmitError> {
    match decl {
        Declaration::Definition { name, schema } => definition_ctx(mapper, name, schema),
        Declaration::Enum { name, schema } => Ok(enum_ctx(name, schema)),
        Declaration::Request {
            name,
            operation,
            parameters,
        } => {
            let context = format!("operation `{}`", operation.label());
            let mut fields = Vec::with_capacity(parameters.len());
            for param in parameters {
                let ts_type = match param {
                    Parameter::Path(p) | Parameter::Query(p) | Parameter::Header(p) => {
                        mapper.map(&p.value.to_schema(), &context)?
                    }
                    Parameter::Body(b) | Parameter::FormData(b) => mapper.map(&b.schema, &context)?,
                };
                fields.push(context! {
                    name => field_name(param.name()),
                    optional => !param.required(),
                    ts_type => ts_type,
                    description => one_line(param.description()),
                });
            }
            Ok(context! {
                kind => "interface",
                name => name,
                fields => fields,
            })
        }
    }
}

fn definition_ctx(
    mapper: &TypeMapper<'_>,
    name: &str,
    schema: &Schema,
) -> Result<minijinja::Value, EmitError> {
    let context = format!("definition `{name}`");
    let description = one_line(schema.description());

    match schema {
        Schema::Object(object) => {
            let mut fields = Vec::with_capacity(object.properties.len());
            for prop in &object.properties {
                let ts_type = if prop.schema.is_string_enum() {
                    mapper.type_name(&companion_enum_name(name, &prop.name))
                } else {
                    mapper.map(&prop.schema, &format!("{context}.{}", prop.name))?
                };
                fields.push(context! {
                    name => field_name(&prop.name),
                    optional => !prop.required,
                    ts_type => ts_type,
                    description => one_line(prop.schema.description()),
                });
            }
            let index_type = match &object.additional_properties {
                Some(extra) => Some(mapper.index_type(object, extra, &context)?),
                None => None,
            };
            Ok(context! {
                kind => "interface",
                name => name,
                description => description,
                fields => fields,
                index_type => index_type,
            })
        }
        Schema::Array(array) => Ok(context! {
            kind => "array",
            name => name,
            description => description,
            target => mapper.map(&array.items, &context)?,
        }),
        Schema::Primitive(p) if p.is_string_enum() => Ok(enum_ctx(name, schema)),
        Schema::Primitive(p) => Ok(context! {
            kind => "alias",
            name => name,
            description => description,
            target => primitive_to_ts(p),
        }),
        Schema::Reference(_) => Ok(context! {
            kind => "alias",
            name => name,
            target => mapper.map(schema, &context)?,
        }),
    }
}

fn enum_ctx(name: &str, schema: &Schema) -> minijinja::Value {
    let values: &[String] = match schema {
        Schema::Primitive(p) => &p.enum_values,
        _ => &[],
    };
    context! {
        kind => "enum",
        name => name,
        description => one_line(schema.description()),
        members => enum_members(values),
    }
}

/// Member names are sanitized values; repeats get a numeric suffix.
pub fn enum_members(values: &[String]) -> Vec<minijinja::Value> {
    let mut seen: Vec<String> = Vec::with_capacity(values.len());
    values
        .iter()
        .map(|value| {
            let base = sanitize_identifier(value);
            let mut member = base.clone();
            let mut n = 2;
            while seen.contains(&member) {
                member = format!("{base}{n}");
                n += 1;
            }
            seen.push(member.clone());
            context! {
                name => member,
                value => string_literal(value),
            }
        })
        .collect()
}
