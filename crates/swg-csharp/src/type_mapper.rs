use heck::{ToLowerCamelCase, ToPascalCase};
use swg_core::error::EmitError;
use swg_core::ir::{ObjectSchema, PrimitiveSchema, PrimitiveType, Schema, Specification};
use swg_core::transform::NameNormalizer;
use swg_core::transform::name_normalizer::sanitize_identifier;

use crate::emitters::models::{self, Model};

/// Type-name normalizer for C# output; `object` stays `object`.
pub const NORMALIZER: NameNormalizer = NameNormalizer::new("object");

/// Alias chains (`A -> B -> C`) longer than this are left unresolved.
const MAX_ALIAS_DEPTH: usize = 16;

const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// A mapped C# type and whether it is a value type (and so needs `?` to
/// accept `null`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsType {
    pub name: String,
    pub value_type: bool,
}

impl CsType {
    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: false,
        }
    }

    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: true,
        }
    }

    /// The type spelled so that it accepts `null`.
    pub fn nullable(&self) -> String {
        if self.value_type {
            format!("{}?", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Map a primitive to its C# type.
pub fn primitive_type(primitive: &PrimitiveSchema) -> CsType {
    let format = primitive.format.as_deref();
    match primitive.primitive {
        PrimitiveType::Integer => match format {
            Some("int64") => CsType::value("long"),
            _ => CsType::value("int"),
        },
        PrimitiveType::Number => match format {
            Some("float") => CsType::value("float"),
            _ => CsType::value("double"),
        },
        PrimitiveType::Boolean => CsType::value("bool"),
        PrimitiveType::String => match format {
            Some("date" | "date-time") => CsType::value("DateTime"),
            _ => CsType::reference("string"),
        },
        PrimitiveType::File => CsType::reference("Stream"),
    }
}

/// Quote a value as a C# string literal.
pub fn string_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn escape_keyword(name: String) -> String {
    if KEYWORDS.contains(&name.as_str()) {
        format!("@{name}")
    } else {
        name
    }
}

fn fix_leading_digit(mut name: String) -> String {
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Normalized type name, `@`-escaped when it is a keyword. `object` stays
/// the any type. Hints built from an escaped name drop its `@`.
pub fn type_name(raw: &str) -> String {
    let name = NORMALIZER.normalize(raw.trim_start_matches('@'));
    if name == NORMALIZER.any_type() {
        name
    } else {
        escape_keyword(name)
    }
}

/// PascalCase member name for a wire name; never equal to `owner`.
pub fn member_name(raw: &str, owner: &str) -> String {
    let name = fix_leading_digit(sanitize_identifier(raw).to_pascal_case());
    if name == owner {
        format!("{name}Value")
    } else {
        name
    }
}

/// camelCase parameter name, `@`-escaped when it is a keyword.
pub fn parameter_name(raw: &str) -> String {
    escape_keyword(fix_leading_digit(sanitize_identifier(raw).to_lower_camel_case()))
}

/// Resolves schemas to C# types for one specification.
///
/// Inline objects and string enums have no name of their own in C#, so
/// mapping one declares a model named after `hint`. Declared models are
/// collected here and handed to the registry afterwards.
pub struct TypeMapper<'a> {
    spec: &'a Specification,
    models: Vec<Model>,
}

impl<'a> TypeMapper<'a> {
    pub fn new(spec: &'a Specification) -> Self {
        Self {
            spec,
            models: Vec::new(),
        }
    }

    pub fn spec(&self) -> &'a Specification {
        self.spec
    }

    pub fn push(&mut self, model: Model) {
        self.models.push(model);
    }

    pub fn into_models(self) -> Vec<Model> {
        self.models
    }

    /// Run `build` and declare its model ahead of any models declared while
    /// building it.
    pub fn declare(
        &mut self,
        build: impl FnOnce(&mut Self) -> Result<Model, EmitError>,
    ) -> Result<(), EmitError> {
        let slot = self.models.len();
        let model = build(self)?;
        self.models.insert(slot, model);
        Ok(())
    }

    pub fn declare_class(
        &mut self,
        name: &str,
        object: &ObjectSchema,
        shape: String,
        context: &str,
    ) -> Result<(), EmitError> {
        self.declare(|mapper| models::class_model(mapper, name, object, shape, context))
    }

    /// Map a schema. `hint` names any model the mapping has to declare;
    /// `context` is carried into [`EmitError::UnresolvedRef`].
    pub fn map(&mut self, schema: &Schema, hint: &str, context: &str) -> Result<CsType, EmitError> {
        match schema {
            Schema::Reference(name) => self.resolve_reference(name, context),
            Schema::Array(array) => {
                let item = self.map(&array.items, hint, context)?;
                Ok(CsType::reference(format!("{}[]", item.name)))
            }
            Schema::Object(object) if object.properties.is_empty() => {
                match &object.additional_properties {
                    Some(extra) => {
                        let value = self.map(extra, &format!("{hint}Value"), context)?;
                        Ok(CsType::reference(format!("Dictionary<string, {}>", value.name)))
                    }
                    None => Ok(CsType::reference("object")),
                }
            }
            Schema::Object(object) => {
                let name = type_name(hint);
                self.declare_class(&name, object, schema.shape(), context)?;
                Ok(CsType::reference(name))
            }
            Schema::Primitive(p) if p.is_string_enum() => {
                let name = type_name(hint);
                self.models.push(models::enum_model(&name, schema));
                Ok(CsType::value(name))
            }
            Schema::Primitive(p) => Ok(primitive_type(p)),
        }
    }

    /// References to primitive definitions map to the primitive; alias
    /// definitions are followed to their target.
    fn resolve_reference(&self, name: &str, context: &str) -> Result<CsType, EmitError> {
        let mut current = name;
        for _ in 0..MAX_ALIAS_DEPTH {
            let Some(target) = self.spec.definition(current) else {
                return Err(EmitError::UnresolvedRef {
                    name: current.to_string(),
                    context: context.to_string(),
                });
            };
            let normalized = type_name(current);
            if normalized == NORMALIZER.any_type() {
                return Ok(CsType::reference(normalized));
            }
            match target {
                Schema::Reference(next) => current = next,
                Schema::Primitive(p) if p.is_string_enum() => return Ok(CsType::value(normalized)),
                Schema::Primitive(p) => return Ok(primitive_type(p)),
                Schema::Object(_) | Schema::Array(_) => return Ok(CsType::reference(normalized)),
            }
        }
        Ok(CsType::reference(type_name(current)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swg_core::ir::{ArraySchema, Property};
    use swg_core::parse;

    fn spec() -> Specification {
        parse::parse_specification(
            "test.json",
            r##"{"swagger": "2.0", "info": {"title": "T", "version": "1"}, "paths": {},
                "definitions": {
                    "Pet": {"type": "object", "properties": {"id": {"type": "integer"}}},
                    "Sku": {"type": "string"},
                    "Code": {"$ref": "#/definitions/Sku"},
                    "Color": {"type": "string", "enum": ["red"]},
                    "object": {"type": "object"}
                }}"##,
        )
        .unwrap()
    }

    fn primitive(primitive: PrimitiveType, format: Option<&str>) -> PrimitiveSchema {
        let schema = PrimitiveSchema::new(primitive);
        match format {
            Some(f) => schema.with_format(f),
            None => schema,
        }
    }

    #[test]
    fn test_primitive_table() {
        let cases = [
            (PrimitiveType::Integer, None, "int"),
            (PrimitiveType::Integer, Some("int32"), "int"),
            (PrimitiveType::Integer, Some("int64"), "long"),
            (PrimitiveType::Number, None, "double"),
            (PrimitiveType::Number, Some("float"), "float"),
            (PrimitiveType::Boolean, None, "bool"),
            (PrimitiveType::String, None, "string"),
            (PrimitiveType::String, Some("date-time"), "DateTime"),
            (PrimitiveType::File, None, "Stream"),
        ];
        for (ty, format, expected) in cases {
            assert_eq!(primitive_type(&primitive(ty, format)).name, expected);
        }
        assert!(primitive_type(&primitive(PrimitiveType::Integer, None)).value_type);
        assert!(!primitive_type(&primitive(PrimitiveType::String, None)).value_type);
    }

    #[test]
    fn test_references() {
        let spec = spec();
        let mut mapper = TypeMapper::new(&spec);
        let pet = mapper.map(&Schema::Reference("Pet".into()), "X", "x").unwrap();
        assert_eq!(pet, CsType::reference("Pet"));
        let code = mapper.map(&Schema::Reference("Code".into()), "X", "x").unwrap();
        assert_eq!(code, CsType::reference("string"));
        let color = mapper.map(&Schema::Reference("Color".into()), "X", "x").unwrap();
        assert_eq!(color, CsType::value("Color"));
        let any = mapper.map(&Schema::Reference("object".into()), "X", "x").unwrap();
        assert_eq!(any.name, "object");
        assert!(mapper.into_models().is_empty());
    }

    #[test]
    fn test_unresolved_reference() {
        let spec = spec();
        let mut mapper = TypeMapper::new(&spec);
        let err = mapper
            .map(&Schema::Reference("Missing".into()), "X", "definition `Owner`")
            .unwrap_err();
        assert_eq!(
            err,
            EmitError::UnresolvedRef {
                name: "Missing".into(),
                context: "definition `Owner`".into()
            }
        );
    }

    #[test]
    fn test_inline_object_declares_class() {
        let spec = spec();
        let mut mapper = TypeMapper::new(&spec);
        let inline = Schema::Object(ObjectSchema {
            properties: vec![Property {
                name: "width".into(),
                schema: Schema::Primitive(PrimitiveSchema::new(PrimitiveType::Number)),
                required: false,
            }],
            ..ObjectSchema::default()
        });
        let array = Schema::Array(ArraySchema::of(inline));
        let mapped = mapper.map(&array, "ItemDimensions", "x").unwrap();
        assert_eq!(mapped.name, "ItemDimensions[]");
        let models = mapper.into_models();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name(), "ItemDimensions");
    }

    #[test]
    fn test_dictionary() {
        let spec = spec();
        let mut mapper = TypeMapper::new(&spec);
        let dict = Schema::Object(ObjectSchema {
            additional_properties: Some(Box::new(Schema::Primitive(primitive(
                PrimitiveType::Integer,
                Some("int32"),
            )))),
            ..ObjectSchema::default()
        });
        assert_eq!(
            mapper.map(&dict, "Stock", "x").unwrap().name,
            "Dictionary<string, int>"
        );
        assert_eq!(mapper.map(&Schema::any(), "Any", "x").unwrap().name, "object");
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(member_name("created-at", "Item"), "CreatedAt");
        assert_eq!(member_name("item", "Item"), "ItemValue");
        assert_eq!(member_name("2fa", "User"), "_2fa");
        assert_eq!(parameter_name("api_key"), "apiKey");
        assert_eq!(parameter_name("X-Request-Id"), "xRequestId");
        assert_eq!(parameter_name("string"), "@string");
        assert_eq!(parameter_name("class"), "@class");
        assert_eq!(type_name("event"), "@event");
        assert_eq!(type_name("@event"), "@event");
        assert_eq!(type_name("@eventItem"), "eventItem");
        assert_eq!(type_name("Foo[Bar]"), "FooOfBar");
        assert_eq!(type_name("object"), "object");
    }
}
