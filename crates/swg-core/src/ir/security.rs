use indexmap::IndexMap;

/// A named security scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityDefinition {
    pub name: String,
    pub description: Option<String>,
    pub kind: SecurityKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SecurityKind {
    Basic,
    ApiKey {
        name: String,
        location: ApiKeyLocation,
    },
    OAuth2 {
        flow: Option<OAuthFlow>,
        authorization_url: Option<String>,
        token_url: Option<String>,
        scopes: IndexMap<String, String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyLocation {
    Query,
    Header,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthFlow {
    Implicit,
    Password,
    Application,
    AccessCode,
}

impl OAuthFlow {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "implicit" => Some(Self::Implicit),
            "password" => Some(Self::Password),
            "application" => Some(Self::Application),
            "accessCode" => Some(Self::AccessCode),
            _ => None,
        }
    }
}

/// One scheme name with the scopes it requires.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityRequirement {
    pub name: String,
    pub scopes: Vec<String>,
}
