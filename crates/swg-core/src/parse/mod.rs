pub mod operation;
pub mod parameter;
pub mod response;
pub mod schema;
pub mod security;
pub mod spec;

use log::warn;

use crate::error::ParseError;
use crate::ir::Specification;
use crate::transform;
use spec::SwaggerDocument;

/// Parse a Swagger 2.0 document from JSON.
pub fn from_json(input: &str) -> Result<SwaggerDocument, ParseError> {
    let doc: SwaggerDocument = serde_json::from_str(input)?;
    validate_version(&doc)?;
    Ok(doc)
}

fn validate_version(doc: &SwaggerDocument) -> Result<(), ParseError> {
    let version = doc
        .swagger
        .as_deref()
        .ok_or_else(|| ParseError::MissingField("swagger".into()))?;
    if !version.starts_with("2.") {
        return Err(ParseError::UnsupportedVersion(version.to_string()));
    }
    Ok(())
}

/// Parse and transform one document into the IR.
pub fn parse_specification(source_id: &str, input: &str) -> Result<Specification, ParseError> {
    let doc = from_json(input)?;
    transform::transform(source_id, &doc)
}

/// The outcome of parsing one source in a batch.
#[derive(Debug)]
pub struct ParsedSource {
    pub source_id: String,
    pub outcome: Result<Specification, ParseError>,
}

impl ParsedSource {
    pub fn is_errored(&self) -> bool {
        self.outcome.is_err()
    }

    pub fn specification(&self) -> Option<&Specification> {
        self.outcome.as_ref().ok()
    }
}

/// Parse every `(source_id, text)` pair. A failing source is reported in its
/// own [`ParsedSource`] and never stops the others.
pub fn parse_batch<'a, I>(sources: I) -> Vec<ParsedSource>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    sources
        .into_iter()
        .map(|(source_id, text)| {
            let outcome = parse_specification(source_id, text);
            if let Err(err) = &outcome {
                warn!("{source_id}: {err}");
            }
            ParsedSource {
                source_id: source_id.to_string(),
                outcome,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_openapi_3() {
        let err = from_json(r#"{"openapi": "3.0.0", "swagger": "3.0"}"#).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedVersion(ref v) if v == "3.0"));
    }

    #[test]
    fn test_requires_swagger_field() {
        let err = from_json(r#"{"info": {}}"#).unwrap_err();
        assert!(matches!(err, ParseError::MissingField(ref f) if f == "swagger"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(from_json("{"), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let good = r#"{"swagger": "2.0", "info": {"title": "A", "version": "1"}, "paths": {}}"#;
        let results = parse_batch([("a.json", good), ("b.json", "not json"), ("c.json", good)]);
        let errored: Vec<bool> = results.iter().map(ParsedSource::is_errored).collect();
        assert_eq!(errored, vec![false, true, false]);
        assert_eq!(results[2].specification().unwrap().source_id, "c.json");
    }
}
