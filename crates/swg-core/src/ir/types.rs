use indexmap::IndexMap;

use crate::error::{Diagnostic, DiagnosticKind};

use super::operations::{Operation, Parameter, PathItem, Response};
use super::schemas::Schema;
use super::security::{SecurityDefinition, SecurityRequirement};

/// The IR of one input document. Built once by the transform and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Specification {
    /// Path or URL the document was loaded from.
    pub source_id: String,
    pub swagger: String,
    pub info: Info,
    pub host: Option<String>,
    pub base_path: Option<String>,
    pub schemes: Vec<String>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub paths: Vec<PathItem>,
    pub definitions: IndexMap<String, Schema>,
    pub parameters: IndexMap<String, Parameter>,
    pub responses: IndexMap<String, Response>,
    pub security_definitions: IndexMap<String, SecurityDefinition>,
    pub security: Vec<SecurityRequirement>,
    pub tags: Vec<Tag>,
    pub external_docs: Option<ExternalDocs>,
}

impl Specification {
    /// Look up a definition by its raw (un-normalized) name.
    pub fn definition(&self, name: &str) -> Option<&Schema> {
        self.definitions.get(name)
    }

    /// Every operation with the path item that owns it, in document order.
    pub fn operations(&self) -> impl Iterator<Item = (&PathItem, &Operation)> {
        self.paths
            .iter()
            .flat_map(|item| item.operations.iter().map(move |op| (item, op)))
    }

    /// Warning-level findings: every operation whose 2xx responses disagree
    /// on shape.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for (_, op) in self.operations() {
            let codes = op.success_ambiguity();
            let Some(chosen) = op.canonical_success().and_then(|r| r.status.code()) else {
                continue;
            };
            if codes.is_empty() {
                continue;
            }
            diagnostics.push(Diagnostic {
                source_id: self.source_id.clone(),
                operation: op.label(),
                kind: DiagnosticKind::AmbiguousSuccessResponse { chosen, codes },
            });
        }
        diagnostics
    }

    /// `<scheme>://<host><basePath>`, with `http` when no scheme is declared.
    pub fn base_url(&self) -> String {
        let scheme = self.schemes.first().map(String::as_str).unwrap_or("http");
        format!(
            "{}://{}{}",
            scheme,
            self.host.as_deref().unwrap_or("localhost"),
            self.base_path.as_deref().unwrap_or("")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Info {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub terms_of_service: Option<String>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contact {
    pub name: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct License {
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub description: Option<String>,
    pub external_docs: Option<ExternalDocs>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalDocs {
    pub url: String,
    pub description: Option<String>,
}
