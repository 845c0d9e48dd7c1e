/// A schema node. `Reference` is the `$ref` case, held by name and resolved
/// lazily against [`crate::ir::Specification::definitions`]; the other three
/// are inline.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Reference(String),
    Object(ObjectSchema),
    Array(ArraySchema),
    Primitive(PrimitiveSchema),
}

impl Schema {
    /// The "any" shape: an object with no declared members.
    pub fn any() -> Self {
        Schema::Object(ObjectSchema::default())
    }

    pub fn string() -> Self {
        Schema::Primitive(PrimitiveSchema::new(PrimitiveType::String))
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Schema::Reference(_) => None,
            Schema::Object(o) => o.description.as_deref(),
            Schema::Array(a) => a.description.as_deref(),
            Schema::Primitive(p) => p.description.as_deref(),
        }
    }

    /// True for a string primitive carrying an enum constraint.
    pub fn is_string_enum(&self) -> bool {
        matches!(self, Schema::Primitive(p) if p.is_string_enum())
    }

    /// True for an object with neither properties nor `additionalProperties`.
    pub fn is_any(&self) -> bool {
        matches!(self, Schema::Object(o) if o.properties.is_empty() && o.additional_properties.is_none())
    }

    /// Structural signature, ignoring documentation. Two schemas with the same
    /// shape render to the same declaration.
    pub fn shape(&self) -> String {
        let mut out = String::new();
        self.write_shape(&mut out);
        out
    }

    fn write_shape(&self, out: &mut String) {
        match self {
            Schema::Reference(name) => {
                out.push('&');
                out.push_str(name);
            }
            Schema::Object(o) => {
                out.push('{');
                for (i, prop) in o.properties.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&prop.name);
                    if !prop.required {
                        out.push('?');
                    }
                    out.push(':');
                    prop.schema.write_shape(out);
                }
                if let Some(extra) = &o.additional_properties {
                    out.push_str(";*:");
                    extra.write_shape(out);
                }
                out.push('}');
            }
            Schema::Array(a) => {
                out.push('[');
                a.items.write_shape(out);
                out.push(']');
            }
            Schema::Primitive(p) => {
                out.push_str(p.primitive.as_str());
                if let Some(format) = &p.format {
                    out.push('/');
                    out.push_str(format);
                }
                if !p.enum_values.is_empty() {
                    out.push('(');
                    out.push_str(&p.enum_values.join("|"));
                    out.push(')');
                }
            }
        }
    }
}

/// An object with properties in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    pub title: Option<String>,
    pub description: Option<String>,
    pub properties: Vec<Property>,
    /// Dictionary value schema when `additionalProperties` is a schema.
    pub additional_properties: Option<Box<Schema>>,
}

impl ObjectSchema {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// A named member of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Name as written on the wire.
    pub name: String,
    pub schema: Schema,
    pub required: bool,
}

/// An array with exactly one element schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub items: Box<Schema>,
    pub description: Option<String>,
    pub constraints: Constraints,
}

impl ArraySchema {
    pub fn of(items: Schema) -> Self {
        Self {
            items: Box::new(items),
            description: None,
            constraints: Constraints::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    String,
    Integer,
    Number,
    Boolean,
    File,
}

impl PrimitiveType {
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "file" => Some(Self::File),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::File => "file",
        }
    }
}

/// A leaf schema: type, format, validation keywords, string enum and default.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSchema {
    pub primitive: PrimitiveType,
    pub format: Option<String>,
    pub description: Option<String>,
    pub constraints: Constraints,
    /// Only ever non-empty on string primitives.
    pub enum_values: Vec<String>,
    pub default: Option<Literal>,
}

impl PrimitiveSchema {
    pub fn new(primitive: PrimitiveType) -> Self {
        Self {
            primitive,
            format: None,
            description: None,
            constraints: Constraints::default(),
            enum_values: Vec::new(),
            default: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn is_string_enum(&self) -> bool {
        self.primitive == PrimitiveType::String && !self.enum_values.is_empty()
    }
}

/// A default value, typed at IR-build time.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Constraints {
    pub maximum: Option<f64>,
    pub exclusive_maximum: bool,
    pub minimum: Option<f64>,
    pub exclusive_minimum: bool,
    pub max_length: Option<u64>,
    pub min_length: Option<u64>,
    pub pattern: Option<String>,
    pub max_items: Option<u64>,
    pub min_items: Option<u64>,
    pub unique_items: bool,
    pub multiple_of: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pet(status_values: &[&str]) -> Schema {
        let mut status = PrimitiveSchema::new(PrimitiveType::String);
        status.enum_values = status_values.iter().map(|v| v.to_string()).collect();
        Schema::Object(ObjectSchema {
            properties: vec![
                Property {
                    name: "id".into(),
                    schema: Schema::Primitive(
                        PrimitiveSchema::new(PrimitiveType::Integer).with_format("int64"),
                    ),
                    required: true,
                },
                Property {
                    name: "status".into(),
                    schema: Schema::Primitive(status),
                    required: false,
                },
            ],
            ..Default::default()
        })
    }

    #[test]
    fn shape_ignores_documentation() {
        let a = pet(&["available"]);
        let mut b = pet(&["available"]);
        if let Schema::Object(o) = &mut b {
            o.description = Some("A pet".into());
        }
        assert_eq!(a.shape(), b.shape());
    }

    #[test]
    fn shape_tracks_enum_members() {
        assert_ne!(pet(&["available"]).shape(), pet(&["sold"]).shape());
    }

    #[test]
    fn shape_of_nested_array() {
        let s = Schema::Array(ArraySchema::of(Schema::Array(ArraySchema::of(
            Schema::Reference("Pet".into()),
        ))));
        assert_eq!(s.shape(), "[[&Pet]]");
    }

    #[test]
    fn empty_object_is_any() {
        assert!(Schema::any().is_any());
        assert!(!pet(&[]).is_any());
    }
}
