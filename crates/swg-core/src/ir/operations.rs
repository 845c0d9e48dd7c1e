use indexmap::IndexMap;

use super::schemas::{ArraySchema, PrimitiveSchema, Schema};
use super::security::SecurityRequirement;
use super::types::ExternalDocs;

/// HTTP methods a Swagger 2.0 path item can declare, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
        }
    }

    /// `Get`, `Post`, ...
    pub fn pascal(&self) -> &'static str {
        match self {
            Self::Get => "Get",
            Self::Put => "Put",
            Self::Post => "Post",
            Self::Delete => "Delete",
            Self::Options => "Options",
            Self::Head => "Head",
            Self::Patch => "Patch",
        }
    }

    /// True for methods that conventionally carry a request body.
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Put | Self::Post | Self::Patch)
    }
}

/// A URL template and the operations declared on it.
#[derive(Debug, Clone, PartialEq)]
pub struct PathItem {
    pub path: String,
    /// Shared by every operation on this path unless overridden.
    pub parameters: Vec<Parameter>,
    /// At most one per method, in [`HttpMethod::ALL`] order.
    pub operations: Vec<Operation>,
}

impl PathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations.iter().find(|op| op.method == method)
    }

    /// Path-level parameters the operation does not override (same name and
    /// location), then the operation's own parameters, in declaration order.
    pub fn effective_parameters<'a>(&'a self, operation: &'a Operation) -> Vec<&'a Parameter> {
        let overridden = |p: &Parameter| {
            operation
                .parameters
                .iter()
                .any(|own| own.name() == p.name() && own.location() == p.location())
        };

        self.parameters
            .iter()
            .filter(|p| !overridden(p))
            .chain(operation.parameters.iter())
            .collect()
    }
}

/// One HTTP method's behavior on a path.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub method: HttpMethod,
    pub path: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Effective MIME types: the operation's own, else the document's.
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub parameters: Vec<Parameter>,
    /// In declaration order.
    pub responses: Vec<Response>,
    /// Effective requirements: the operation's own, else the document's.
    pub security: Vec<SecurityRequirement>,
    pub oauth_secured: bool,
    pub deprecated: bool,
    pub external_docs: Option<ExternalDocs>,
}

impl Operation {
    /// `operationId`, or `METHOD /path` when absent. Used in messages.
    pub fn label(&self) -> String {
        match &self.operation_id {
            Some(id) => id.clone(),
            None => format!("{} {}", self.method.as_str(), self.path),
        }
    }

    /// The response with the lowest 2xx code.
    pub fn canonical_success(&self) -> Option<&Response> {
        self.responses
            .iter()
            .filter(|r| r.status.is_success())
            .min_by_key(|r| r.status.code())
    }

    /// 2xx codes whose schema shape differs from the canonical success
    /// response, sorted ascending. Empty when the success type is unambiguous.
    pub fn success_ambiguity(&self) -> Vec<u16> {
        let Some(canonical) = self.canonical_success() else {
            return Vec::new();
        };
        let canonical_shape = canonical.schema.as_ref().map(Schema::shape);

        let mut codes: Vec<u16> = self
            .responses
            .iter()
            .filter(|r| r.status.is_success() && r.status != canonical.status)
            .filter(|r| r.schema.as_ref().map(Schema::shape) != canonical_shape)
            .filter_map(|r| r.status.code())
            .collect();
        codes.sort_unstable();
        codes
    }
}

/// Where a parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
    FormData,
}

impl ParameterLocation {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "body" => Some(Self::Body),
            "formData" => Some(Self::FormData),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Body => "body",
            Self::FormData => "formData",
        }
    }
}

/// A parameter, tagged by location.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    Path(SimpleParameter),
    Query(SimpleParameter),
    Header(SimpleParameter),
    Body(BodyParameter),
    FormData(BodyParameter),
}

impl Parameter {
    pub fn location(&self) -> ParameterLocation {
        match self {
            Parameter::Path(_) => ParameterLocation::Path,
            Parameter::Query(_) => ParameterLocation::Query,
            Parameter::Header(_) => ParameterLocation::Header,
            Parameter::Body(_) => ParameterLocation::Body,
            Parameter::FormData(_) => ParameterLocation::FormData,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Parameter::Path(p) | Parameter::Query(p) | Parameter::Header(p) => &p.name,
            Parameter::Body(p) | Parameter::FormData(p) => &p.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Parameter::Path(p) | Parameter::Query(p) | Parameter::Header(p) => {
                p.description.as_deref()
            }
            Parameter::Body(p) | Parameter::FormData(p) => p.description.as_deref(),
        }
    }

    pub fn required(&self) -> bool {
        match self {
            Parameter::Path(p) | Parameter::Query(p) | Parameter::Header(p) => p.required,
            Parameter::Body(p) | Parameter::FormData(p) => p.required,
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleParameter> {
        match self {
            Parameter::Path(p) | Parameter::Query(p) | Parameter::Header(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_body(&self) -> Option<&BodyParameter> {
        match self {
            Parameter::Body(p) | Parameter::FormData(p) => Some(p),
            _ => None,
        }
    }
}

/// A path, query or header parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleParameter {
    pub name: String,
    pub description: Option<String>,
    pub required: bool,
    pub value: SimpleValue,
}

impl SimpleParameter {
    pub fn default_value(&self) -> Option<&super::schemas::Literal> {
        match &self.value {
            SimpleValue::Primitive(p) => p.default.as_ref(),
            SimpleValue::Array { .. } => None,
        }
    }
}

/// The value carried by a non-body parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleValue {
    Primitive(PrimitiveSchema),
    Array {
        array: ArraySchema,
        collection_format: CollectionFormat,
    },
}

impl SimpleValue {
    /// The value as a schema node, for mapping through the same paths as
    /// properties.
    pub fn to_schema(&self) -> Schema {
        match self {
            SimpleValue::Primitive(p) => Schema::Primitive(p.clone()),
            SimpleValue::Array { array, .. } => Schema::Array(array.clone()),
        }
    }
}

/// How array parameter values are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionFormat {
    #[default]
    Csv,
    Ssv,
    Tsv,
    Pipes,
    Multi,
}

impl CollectionFormat {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "csv" => Some(Self::Csv),
            "ssv" => Some(Self::Ssv),
            "tsv" => Some(Self::Tsv),
            "pipes" => Some(Self::Pipes),
            "multi" => Some(Self::Multi),
            _ => None,
        }
    }

    /// Separator joining the values, or `None` for `multi` (repeat the key).
    pub fn separator(&self) -> Option<&'static str> {
        match self {
            Self::Csv => Some(","),
            Self::Ssv => Some(" "),
            Self::Tsv => Some("\t"),
            Self::Pipes => Some("|"),
            Self::Multi => None,
        }
    }
}

/// A body or formData parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyParameter {
    pub name: String,
    pub description: Option<String>,
    pub required: bool,
    pub schema: Schema,
}

/// An HTTP status key on an operation's responses map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Code(u16),
    Default,
}

impl StatusCode {
    pub fn code(&self) -> Option<u16> {
        match self {
            StatusCode::Code(c) => Some(*c),
            StatusCode::Default => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Code(c) if (200..=299).contains(c))
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusCode::Code(c) => write!(f, "{c}"),
            StatusCode::Default => f.write_str("default"),
        }
    }
}

/// A declared response. Entries in the document's shared response pool carry
/// `StatusCode::Default` until they are referenced from an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub description: String,
    pub schema: Option<Schema>,
    pub headers: IndexMap<String, Schema>,
    /// MIME type → example payload.
    pub examples: IndexMap<String, serde_json::Value>,
}
