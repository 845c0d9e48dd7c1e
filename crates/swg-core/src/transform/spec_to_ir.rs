use indexmap::IndexMap;
use log::{debug, warn};

use crate::error::ParseError;
use crate::ir::*;
use crate::parse::operation as raw_op;
use crate::parse::parameter as raw_param;
use crate::parse::response as raw_resp;
use crate::parse::security as raw_sec;
use crate::parse::spec::{self as raw, SwaggerDocument};

use super::schema_resolver::{PrimitiveParts, to_ir_primitive, to_ir_schema};

/// Transform a deserialized Swagger document into the IR, validating required
/// fields and classifying every schema and parameter.
pub fn transform(source_id: &str, doc: &SwaggerDocument) -> Result<Specification, ParseError> {
    let swagger = doc
        .swagger
        .clone()
        .ok_or_else(|| ParseError::MissingField("swagger".into()))?;

    // Phase 1: Info
    let info = resolve_info(doc.info.as_ref())?;

    // Phase 2: Shared pools, so path-level `$ref`s can resolve against them
    let parameters = resolve_parameter_pool(&doc.parameters)?;
    let responses = resolve_response_pool(&doc.responses)?;

    // Phase 3: Security definitions and the document-wide requirement
    let security_definitions = resolve_security_definitions(&doc.security_definitions)?;
    let security = doc
        .security
        .as_deref()
        .map(flatten_requirements)
        .unwrap_or_default();

    // Phase 4: Paths
    let raw_paths = doc
        .paths
        .as_ref()
        .ok_or_else(|| ParseError::MissingField("paths".into()))?;
    let context = OperationContext {
        source_id,
        doc,
        parameters: &parameters,
        responses: &responses,
        security: &security,
    };
    let mut paths = Vec::with_capacity(raw_paths.len());
    for (path, item) in raw_paths {
        paths.push(resolve_path_item(&context, path, item)?);
    }

    // Phase 5: Definitions
    let mut definitions = IndexMap::with_capacity(doc.definitions.len());
    for (name, schema) in &doc.definitions {
        definitions.insert(
            name.clone(),
            to_ir_schema(schema, &format!("definitions.{name}"))?,
        );
    }

    let spec = Specification {
        source_id: source_id.to_string(),
        swagger,
        info,
        host: doc.host.clone(),
        base_path: doc.base_path.clone(),
        schemes: doc.schemes.clone(),
        consumes: doc.consumes.clone(),
        produces: doc.produces.clone(),
        paths,
        definitions,
        parameters,
        responses,
        security_definitions,
        security,
        tags: resolve_tags(&doc.tags),
        external_docs: doc.external_docs.as_ref().and_then(resolve_external_docs),
    };

    debug!(
        "{source_id}: parsed {} paths, {} operations, {} definitions",
        spec.paths.len(),
        spec.operations().count(),
        spec.definitions.len()
    );
    Ok(spec)
}

fn resolve_info(info: Option<&raw::Info>) -> Result<Info, ParseError> {
    let info = info.ok_or_else(|| ParseError::MissingField("info".into()))?;
    Ok(Info {
        title: info
            .title
            .clone()
            .ok_or_else(|| ParseError::MissingField("info.title".into()))?,
        version: info
            .version
            .clone()
            .ok_or_else(|| ParseError::MissingField("info.version".into()))?,
        description: info.description.clone(),
        terms_of_service: info.terms_of_service.clone(),
        contact: info.contact.as_ref().map(|c| Contact {
            name: c.name.clone(),
            url: c.url.clone(),
            email: c.email.clone(),
        }),
        license: info.license.as_ref().map(|l| License {
            name: l.name.clone(),
            url: l.url.clone(),
        }),
    })
}

fn resolve_parameter_pool(
    pool: &IndexMap<String, raw_param::Parameter>,
) -> Result<IndexMap<String, Parameter>, ParseError> {
    let empty = IndexMap::new();
    let mut resolved = IndexMap::with_capacity(pool.len());
    for (name, param) in pool {
        let path = format!("parameters.{name}");
        if param.ref_path.is_some() {
            return Err(ParseError::invalid(
                format!("{path}.$ref"),
                "shared parameters cannot be references",
            ));
        }
        resolved.insert(name.clone(), resolve_parameter(param, &empty, &path)?);
    }
    Ok(resolved)
}

fn resolve_response_pool(
    pool: &IndexMap<String, raw_resp::Response>,
) -> Result<IndexMap<String, Response>, ParseError> {
    let empty = IndexMap::new();
    let mut resolved = IndexMap::with_capacity(pool.len());
    for (name, response) in pool {
        let path = format!("responses.{name}");
        if response.ref_path.is_some() {
            return Err(ParseError::invalid(
                format!("{path}.$ref"),
                "shared responses cannot be references",
            ));
        }
        resolved.insert(
            name.clone(),
            resolve_response(StatusCode::Default, response, &empty, &path)?,
        );
    }
    Ok(resolved)
}

/// Convert one parameter, resolving `#/parameters/<name>` against `pool`.
fn resolve_parameter(
    param: &raw_param::Parameter,
    pool: &IndexMap<String, Parameter>,
    path: &str,
) -> Result<Parameter, ParseError> {
    if let Some(ref_path) = &param.ref_path {
        return ref_path
            .strip_prefix("#/parameters/")
            .and_then(|name| pool.get(name))
            .cloned()
            .ok_or_else(|| ParseError::UnresolvedParameter(ref_path.clone()));
    }

    let name = param
        .name
        .clone()
        .ok_or_else(|| ParameterField::Name.missing(path))?;
    let path = format!("{path}({name})");
    let location_name = param
        .location
        .as_deref()
        .ok_or_else(|| ParameterField::In.missing(&path))?;
    let location = ParameterLocation::from_wire(location_name).ok_or_else(|| {
        ParseError::invalid(
            format!("{path}.in"),
            format!("unknown parameter location `{location_name}`"),
        )
    })?;

    match location {
        ParameterLocation::Body => {
            let schema = match &param.schema {
                Some(schema) => to_ir_schema(schema, &format!("{path}.schema"))?,
                None => {
                    warn!("{path}: body parameter without schema, treating it as string");
                    Schema::string()
                }
            };
            Ok(Parameter::Body(BodyParameter {
                name,
                description: param.description.clone(),
                required: param.required.unwrap_or(false),
                schema,
            }))
        }
        ParameterLocation::FormData => {
            let value = resolve_simple_value(param, &path)?;
            Ok(Parameter::FormData(BodyParameter {
                name,
                description: param.description.clone(),
                required: param.required.unwrap_or(false),
                schema: value.to_schema(),
            }))
        }
        ParameterLocation::Path | ParameterLocation::Query | ParameterLocation::Header => {
            let simple = SimpleParameter {
                name,
                description: param.description.clone(),
                // Path parameters are always required.
                required: location == ParameterLocation::Path || param.required.unwrap_or(false),
                value: resolve_simple_value(param, &path)?,
            };
            Ok(match location {
                ParameterLocation::Path => Parameter::Path(simple),
                ParameterLocation::Query => Parameter::Query(simple),
                _ => Parameter::Header(simple),
            })
        }
    }
}

enum ParameterField {
    Name,
    In,
    Type,
    Items,
}

impl ParameterField {
    fn missing(&self, path: &str) -> ParseError {
        let field = match self {
            ParameterField::Name => "name",
            ParameterField::In => "in",
            ParameterField::Type => "type",
            ParameterField::Items => "items",
        };
        ParseError::MissingField(format!("{path}.{field}"))
    }
}

fn resolve_simple_value(
    param: &raw_param::Parameter,
    path: &str,
) -> Result<SimpleValue, ParseError> {
    let type_name = param
        .param_type
        .as_deref()
        .ok_or_else(|| ParameterField::Type.missing(path))?;

    if type_name == "array" {
        let items = param
            .items
            .as_ref()
            .ok_or_else(|| ParameterField::Items.missing(path))?;
        let collection_format = match param.collection_format.as_deref() {
            None => CollectionFormat::default(),
            Some(format) => CollectionFormat::from_wire(format).ok_or_else(|| {
                ParseError::invalid(
                    format!("{path}.collectionFormat"),
                    format!("unknown collection format `{format}`"),
                )
            })?,
        };
        return Ok(SimpleValue::Array {
            array: ArraySchema {
                items: Box::new(to_ir_schema(items, &format!("{path}.items"))?),
                description: param.description.clone(),
                constraints: super::schema_resolver::to_ir_constraints(&param.constraints),
            },
            collection_format,
        });
    }

    let primitive = PrimitiveType::from_type_name(type_name).ok_or_else(|| {
        ParseError::invalid(
            format!("{path}.type"),
            format!("unknown parameter type `{type_name}`"),
        )
    })?;
    Ok(SimpleValue::Primitive(to_ir_primitive(
        primitive,
        PrimitiveParts {
            format: param.format.as_deref(),
            description: param.description.as_deref(),
            constraints: &param.constraints,
            enum_values: &param.enum_values,
            default: param.default_value.as_ref(),
        },
        path,
    )))
}

/// Convert one response, resolving `#/responses/<name>` against `pool`.
fn resolve_response(
    status: StatusCode,
    response: &raw_resp::Response,
    pool: &IndexMap<String, Response>,
    path: &str,
) -> Result<Response, ParseError> {
    if let Some(ref_path) = &response.ref_path {
        let shared = ref_path
            .strip_prefix("#/responses/")
            .and_then(|name| pool.get(name))
            .ok_or_else(|| ParseError::UnresolvedResponse(ref_path.clone()))?;
        return Ok(Response {
            status,
            ..shared.clone()
        });
    }

    let description = response
        .description
        .clone()
        .ok_or_else(|| ParseError::MissingField(format!("{path}.description")))?;
    let schema = response
        .schema
        .as_ref()
        .map(|s| to_ir_schema(s, &format!("{path}.schema")))
        .transpose()?;

    let mut headers = IndexMap::with_capacity(response.headers.len());
    for (name, header) in &response.headers {
        headers.insert(
            name.clone(),
            to_ir_schema(header, &format!("{path}.headers.{name}"))?,
        );
    }

    Ok(Response {
        status,
        description,
        schema,
        headers,
        examples: response.examples.clone(),
    })
}

fn parse_status(key: &str, path: &str) -> Result<StatusCode, ParseError> {
    if key == "default" {
        return Ok(StatusCode::Default);
    }
    key.parse::<u16>().map(StatusCode::Code).map_err(|_| {
        ParseError::invalid(
            format!("{path}.{key}"),
            "status code must be an integer or `default`",
        )
    })
}

fn resolve_security_definitions(
    defs: &IndexMap<String, raw_sec::SecurityScheme>,
) -> Result<IndexMap<String, SecurityDefinition>, ParseError> {
    let mut resolved = IndexMap::with_capacity(defs.len());
    for (name, scheme) in defs {
        let path = format!("securityDefinitions.{name}");
        let missing = |field: &str| ParseError::MissingField(format!("{path}.{field}"));
        let scheme_type = scheme.scheme_type.as_deref().ok_or_else(|| missing("type"))?;

        let kind = match scheme_type {
            "basic" => SecurityKind::Basic,
            "apiKey" => {
                let key_name = scheme.name.clone().ok_or_else(|| missing("name"))?;
                let location = match scheme.location.as_deref() {
                    Some("query") => ApiKeyLocation::Query,
                    Some("header") => ApiKeyLocation::Header,
                    Some(other) => {
                        return Err(ParseError::invalid(
                            format!("{path}.in"),
                            format!("unknown api key location `{other}`"),
                        ));
                    }
                    None => return Err(missing("in")),
                };
                SecurityKind::ApiKey {
                    name: key_name,
                    location,
                }
            }
            "oauth2" => {
                let flow = match scheme.flow.as_deref() {
                    None => None,
                    Some(flow) => Some(OAuthFlow::from_wire(flow).ok_or_else(|| {
                        ParseError::invalid(
                            format!("{path}.flow"),
                            format!("unknown oauth2 flow `{flow}`"),
                        )
                    })?),
                };
                SecurityKind::OAuth2 {
                    flow,
                    authorization_url: scheme.authorization_url.clone(),
                    token_url: scheme.token_url.clone(),
                    scopes: scheme.scopes.clone(),
                }
            }
            other => {
                return Err(ParseError::invalid(
                    format!("{path}.type"),
                    format!("unknown security scheme type `{other}`"),
                ));
            }
        };

        resolved.insert(
            name.clone(),
            SecurityDefinition {
                name: name.clone(),
                description: scheme.description.clone(),
                kind,
            },
        );
    }
    Ok(resolved)
}

fn flatten_requirements(requirements: &[raw_sec::SecurityRequirement]) -> Vec<SecurityRequirement> {
    requirements
        .iter()
        .flat_map(|req| {
            req.iter().map(|(name, scopes)| SecurityRequirement {
                name: name.clone(),
                scopes: scopes.clone(),
            })
        })
        .collect()
}

/// Everything an operation needs from its document.
struct OperationContext<'a> {
    source_id: &'a str,
    doc: &'a SwaggerDocument,
    parameters: &'a IndexMap<String, Parameter>,
    responses: &'a IndexMap<String, Response>,
    security: &'a [SecurityRequirement],
}

impl OperationContext<'_> {
    /// A requirement names either the literal `oauth` scheme or one whose
    /// definition is of type `oauth2`.
    fn is_oauth(&self, requirement: &SecurityRequirement) -> bool {
        requirement.name.eq_ignore_ascii_case("oauth")
            || self
                .doc
                .security_definitions
                .iter()
                .any(|(name, scheme)| {
                    name.eq_ignore_ascii_case(&requirement.name)
                        && scheme.scheme_type.as_deref() == Some("oauth2")
                })
    }
}

fn resolve_path_item(
    ctx: &OperationContext<'_>,
    path: &str,
    item: &raw_op::PathItem,
) -> Result<PathItem, ParseError> {
    let json_path = format!("paths.{path}");

    let mut parameters = Vec::with_capacity(item.parameters.len());
    for (i, param) in item.parameters.iter().enumerate() {
        parameters.push(resolve_parameter(
            param,
            ctx.parameters,
            &format!("{json_path}.parameters[{i}]"),
        )?);
    }

    let mut operations = Vec::new();
    for method in HttpMethod::ALL {
        let raw = match method {
            HttpMethod::Get => item.get.as_ref(),
            HttpMethod::Put => item.put.as_ref(),
            HttpMethod::Post => item.post.as_ref(),
            HttpMethod::Delete => item.delete.as_ref(),
            HttpMethod::Options => item.options.as_ref(),
            HttpMethod::Head => item.head.as_ref(),
            HttpMethod::Patch => item.patch.as_ref(),
        };
        if let Some(raw) = raw {
            operations.push(resolve_operation(ctx, method, path, raw)?);
        }
    }

    let item = PathItem {
        path: path.to_string(),
        parameters,
        operations,
    };
    for op in &item.operations {
        check_unique_parameters(&item, op, &json_path)?;
    }
    Ok(item)
}

fn resolve_operation(
    ctx: &OperationContext<'_>,
    method: HttpMethod,
    path: &str,
    op: &raw_op::Operation,
) -> Result<Operation, ParseError> {
    let json_path = format!("paths.{path}.{}", method.as_str().to_ascii_lowercase());

    let mut parameters = Vec::with_capacity(op.parameters.len());
    for (i, param) in op.parameters.iter().enumerate() {
        parameters.push(resolve_parameter(
            param,
            ctx.parameters,
            &format!("{json_path}.parameters[{i}]"),
        )?);
    }

    let raw_responses = op
        .responses
        .as_ref()
        .ok_or_else(|| ParseError::MissingField(format!("{json_path}.responses")))?;
    let responses_path = format!("{json_path}.responses");
    let mut responses = Vec::with_capacity(raw_responses.len());
    for (key, response) in raw_responses {
        let status = parse_status(key, &responses_path)?;
        responses.push(resolve_response(
            status,
            response,
            ctx.responses,
            &format!("{responses_path}.{key}"),
        )?);
    }

    let security = match &op.security {
        Some(own) => flatten_requirements(own),
        None => ctx.security.to_vec(),
    };
    let oauth_secured = security.iter().any(|req| ctx.is_oauth(req));

    let operation = Operation {
        method,
        path: path.to_string(),
        operation_id: op.operation_id.clone(),
        summary: op.summary.clone(),
        description: op.description.clone(),
        tags: op.tags.clone(),
        consumes: op.consumes.clone().unwrap_or_else(|| ctx.doc.consumes.clone()),
        produces: op.produces.clone().unwrap_or_else(|| ctx.doc.produces.clone()),
        parameters,
        responses,
        security,
        oauth_secured,
        deprecated: op.deprecated.unwrap_or(false),
        external_docs: op.external_docs.as_ref().and_then(resolve_external_docs),
    };

    if operation.canonical_success().is_none() {
        warn!(
            "{}: operation `{}` declares no 2xx response, its success type is void",
            ctx.source_id,
            operation.label()
        );
    }
    Ok(operation)
}

/// Names must be unique across an operation's merged parameter list.
fn check_unique_parameters(
    item: &PathItem,
    op: &Operation,
    json_path: &str,
) -> Result<(), ParseError> {
    let effective = item.effective_parameters(op);
    for (i, param) in effective.iter().enumerate() {
        if effective[..i].iter().any(|p| p.name() == param.name()) {
            return Err(ParseError::invalid(
                format!(
                    "{json_path}.{}.parameters",
                    op.method.as_str().to_ascii_lowercase()
                ),
                format!("duplicate parameter `{}`", param.name()),
            ));
        }
    }
    Ok(())
}

fn resolve_tags(tags: &[raw::Tag]) -> Vec<Tag> {
    tags.iter()
        .filter_map(|tag| {
            let Some(name) = tag.name.clone() else {
                warn!("ignoring tag without a name");
                return None;
            };
            Some(Tag {
                name,
                description: tag.description.clone(),
                external_docs: tag.external_docs.as_ref().and_then(resolve_external_docs),
            })
        })
        .collect()
}

fn resolve_external_docs(docs: &raw::ExternalDocs) -> Option<ExternalDocs> {
    match &docs.url {
        Some(url) => Some(ExternalDocs {
            url: url.clone(),
            description: docs.description.clone(),
        }),
        None => {
            warn!("ignoring externalDocs without a url");
            None
        }
    }
}
