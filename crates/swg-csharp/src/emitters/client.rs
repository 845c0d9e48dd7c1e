use heck::ToPascalCase;
use log::warn;
use minijinja::context;
use swg_core::config::EmitOptions;
use swg_core::error::EmitError;
use swg_core::ir::{
    CollectionFormat, Literal, Operation, Parameter, PathItem, Schema, SimpleValue, Specification,
};
use swg_core::transform::name_normalizer::{
    class_operation_name, route_operation_name, sanitize_identifier,
};

use super::{CodeBlock, escape_xml, one_line, unique_name};
use crate::type_mapper::{
    CsType, NORMALIZER, TypeMapper, parameter_name, string_literal, type_name,
};

/// Success payload type of operations without a success body.
pub const NO_CONTENT: &str = "NoContent";

const TOKEN_PARAMETER: &str = "oauthToken";

/// Locals declared by generated method bodies.
const BODY_LOCALS: &[&str] = &[
    "_uri", "_query", "_item", "_options", "_form", "_content", "_response", "_data",
];

/// Wrapper class name for a specification, from its title.
pub fn client_name(spec: &Specification) -> String {
    type_name(&spec.info.title)
}

/// `operationId` when present, otherwise `<Verb><FirstSegment>`.
pub fn method_base_name(op: &Operation) -> String {
    match &op.operation_id {
        Some(id) => NORMALIZER.normalize(id),
        None => class_operation_name(op.method.as_str(), &op.path),
    }
}

/// A synthesized name that is already taken falls back to the full route
/// name, then to a numeric suffix.
fn operation_name(op: &Operation, taken: &[String]) -> String {
    let base = method_base_name(op);
    if !taken.contains(&base) {
        return base;
    }
    let route = route_operation_name(op.method.as_str(), &op.path).to_pascal_case();
    unique_name(&route, |n| taken.iter().any(|t| t == n))
}

fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgumentKind {
    Token,
    Path,
    Query(Option<CollectionFormat>),
    Header,
    Body,
    FormData,
}

/// One parameter of a generated method.
#[derive(Debug, Clone)]
struct Argument {
    ident: String,
    wire_name: String,
    cs_type: CsType,
    required: bool,
    default: Option<String>,
    description: Option<String>,
    kind: ArgumentKind,
}

impl Argument {
    fn declaration(&self) -> String {
        if self.required {
            format!("{} {}", self.cs_type.name, self.ident)
        } else {
            format!(
                "{} {} = {}",
                self.cs_type.nullable(),
                self.ident,
                self.default.as_deref().unwrap_or("null")
            )
        }
    }
}

/// The C# literal for a typed default, when it fits the parameter type.
fn default_literal(literal: &Literal, ty: &CsType) -> Option<String> {
    match (literal, ty.name.as_str()) {
        (Literal::String(s), "string") => Some(string_literal(s)),
        (Literal::Integer(i), "int") if i32::try_from(*i).is_ok() => Some(i.to_string()),
        (Literal::Integer(i), "long" | "double" | "float") => Some(i.to_string()),
        (Literal::Number(n), "double") if n.is_finite() => Some(format!("{n:?}")),
        (Literal::Number(n), "float") if n.is_finite() => Some(format!("{n:?}f")),
        (Literal::Boolean(b), "bool") => Some(b.to_string()),
        _ => None,
    }
}

/// Arguments in signature order: token, required, then optional.
fn arguments(
    mapper: &mut TypeMapper<'_>,
    item: &PathItem,
    op: &Operation,
    prefix: &str,
) -> Result<Vec<Argument>, EmitError> {
    let params = item.effective_parameters(op);
    let payloads = params.iter().filter(|p| p.as_body().is_some()).count();
    let context = format!("operation `{}`", op.label());

    let mut args: Vec<Argument> = Vec::with_capacity(params.len() + 1);
    if op.oauth_secured {
        args.push(Argument {
            ident: TOKEN_PARAMETER.to_string(),
            wire_name: TOKEN_PARAMETER.to_string(),
            cs_type: CsType::reference("string"),
            required: true,
            default: None,
            description: Some("OAuth bearer token".to_string()),
            kind: ArgumentKind::Token,
        });
    }

    for param in params {
        let (cs_type, kind, default) = match param {
            Parameter::Path(p) | Parameter::Query(p) | Parameter::Header(p) => {
                let hint = format!("{prefix}{}", sanitize_identifier(&p.name).to_pascal_case());
                let cs_type = mapper.map(&p.value.to_schema(), &hint, &context)?;
                let default = p.default_value().and_then(|lit| default_literal(lit, &cs_type));
                let kind = match (param, &p.value) {
                    (Parameter::Path(_), _) => ArgumentKind::Path,
                    (Parameter::Header(_), _) => ArgumentKind::Header,
                    (_, SimpleValue::Array { collection_format, .. }) => {
                        ArgumentKind::Query(Some(*collection_format))
                    }
                    _ => ArgumentKind::Query(None),
                };
                (cs_type, kind, default)
            }
            Parameter::Body(b) | Parameter::FormData(b) => {
                let hint = if payloads > 1 {
                    format!("{prefix}In_{}", sanitize_identifier(&b.name))
                } else {
                    format!("{prefix}In")
                };
                let cs_type = mapper.map(&b.schema, &hint, &context)?;
                let kind = match param {
                    Parameter::Body(_) => ArgumentKind::Body,
                    _ => ArgumentKind::FormData,
                };
                (cs_type, kind, None)
            }
        };

        let ident = unique_name(&parameter_name(param.name()), |n| {
            BODY_LOCALS.contains(&n) || args.iter().any(|a| a.ident == n)
        });
        args.push(Argument {
            ident,
            wire_name: param.name().to_string(),
            cs_type,
            required: param.required(),
            default,
            description: one_line(param.description()),
            kind,
        });
    }

    // Stable: declaration order is kept within each group.
    args.sort_by_key(|a| (a.kind != ArgumentKind::Token, !a.required));
    Ok(args)
}

/// `url + "/pets/" + <escaped petId>` for a path template.
fn path_expression(path: &str, args: &[Argument]) -> String {
    let mut parts = vec!["this.url".to_string()];
    let mut literal = String::new();
    let mut rest = path;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|i| open + i) else {
            break;
        };
        let name = &rest[open + 1..close];
        match args
            .iter()
            .find(|a| a.kind == ArgumentKind::Path && a.wire_name == name)
        {
            Some(arg) => {
                literal.push_str(&rest[..open]);
                if !literal.is_empty() {
                    parts.push(string_literal(&literal));
                    literal.clear();
                }
                parts.push(format!(
                    "Uri.EscapeDataString(QueryString.Format({}))",
                    arg.ident
                ));
            }
            None => literal.push_str(&rest[..=close]),
        }
        rest = &rest[close + 1..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        parts.push(string_literal(&literal));
    }
    parts.join(" + ")
}

/// Run `body` directly for required arguments, behind a null check otherwise.
fn guarded(code: &mut CodeBlock, arg: &Argument, body: impl FnOnce(&mut CodeBlock)) {
    if arg.required {
        body(code);
    } else {
        code.block(format!("if ({} != null)", arg.ident), body);
    }
}

fn query_lines(code: &mut CodeBlock, arg: &Argument) {
    let key = string_literal(&format!("{}=", arg.wire_name));
    let ident = &arg.ident;
    match arg.kind {
        ArgumentKind::Query(Some(CollectionFormat::Multi)) => guarded(code, arg, |code| {
            code.block(format!("foreach (var _item in {ident})"), |code| {
                code.line(format!(
                    "_query.Add({key} + Uri.EscapeDataString(QueryString.Format(_item)));"
                ));
            });
        }),
        ArgumentKind::Query(Some(format)) => {
            let separator = string_literal(format.separator().unwrap_or(","));
            guarded(code, arg, |code| {
                code.line(format!(
                    "_query.Add({key} + string.Join({separator}, {ident}.Select(_item => Uri.EscapeDataString(QueryString.Format(_item)))));"
                ));
            });
        }
        _ => guarded(code, arg, |code| {
            code.line(format!(
                "_query.Add({key} + Uri.EscapeDataString(QueryString.Format({ident})));"
            ));
        }),
    }
}

/// Writes `_content` and returns true when the operation sends a body.
fn content_lines(code: &mut CodeBlock, op: &Operation, args: &[Argument]) -> bool {
    let media_type = string_literal(
        op.consumes
            .first()
            .map(String::as_str)
            .unwrap_or("application/json"),
    );

    let body = args.iter().find(|a| a.kind == ArgumentKind::Body);
    let form: Vec<&Argument> = args
        .iter()
        .filter(|a| a.kind == ArgumentKind::FormData)
        .collect();

    let payload = match (body, form.as_slice()) {
        (Some(arg), _) => arg.ident.clone(),
        (None, []) => return false,
        (None, [arg]) => arg.ident.clone(),
        (None, fields) => {
            code.line("var _form = new Dictionary<string, object>");
            code.open();
            for field in fields {
                code.line(format!(
                    "[{}] = {},",
                    string_literal(&field.wire_name),
                    field.ident
                ));
            }
            code.close_with("};");
            "_form".to_string()
        }
    };
    code.line(format!(
        "var _content = new StringContent(JsonConvert.SerializeObject({payload}), Encoding.UTF8, {media_type});"
    ));
    true
}

/// How one declared status code is answered.
struct ResponseCase {
    code: u16,
    payload: Option<String>,
    success: bool,
}

fn response_cases(
    mapper: &mut TypeMapper<'_>,
    op: &Operation,
    prefix: &str,
    success_type: &CsType,
) -> Result<Vec<ResponseCase>, EmitError> {
    let context = format!("operation `{}`", op.label());
    let canonical = op.canonical_success();
    let success_shape = canonical.and_then(|r| r.schema.as_ref()).map(Schema::shape);
    let success_payload = (success_type.name != NO_CONTENT).then(|| success_type.name.clone());

    let mut cases = Vec::with_capacity(op.responses.len());
    for response in &op.responses {
        // `default` is answered by the switch's default case.
        let Some(code) = response.status.code() else {
            continue;
        };
        let is_canonical = canonical.is_some_and(|c| c.status == response.status);

        let payload = if is_canonical {
            success_payload.clone()
        } else {
            match &response.schema {
                None => success_payload.clone(),
                Some(schema) if Some(schema.shape()) == success_shape => success_payload.clone(),
                Some(schema) => {
                    let hint = format!("{prefix}Out{code}");
                    Some(mapper.map(schema, &hint, &context)?.name)
                }
            }
        };
        let success = response.status.is_success() && payload == success_payload;
        cases.push(ResponseCase {
            code,
            payload,
            success,
        });
    }
    Ok(cases)
}

fn dispatch_lines(code: &mut CodeBlock, result: &str, cases: &[ResponseCase]) {
    code.block("switch ((int)_response.StatusCode)", |code| {
        for case in cases {
            code.line(format!("case {}:", case.code));
            code.open();
            let factory = if case.success { "Success" } else { "Declared" };
            match &case.payload {
                Some(payload) => {
                    code.line(format!(
                        "var _data = JsonConvert.DeserializeObject<{payload}>(await _response.Content.ReadAsStringAsync());"
                    ));
                    if case.success {
                        code.line(format!(
                            "return APIResponse<{result}>.Success(_data, _response.StatusCode);"
                        ));
                    } else {
                        code.line(format!(
                            "return APIResponse<{result}>.Declared<{payload}>(_data, _response.StatusCode);"
                        ));
                    }
                }
                None => code.line(format!(
                    "return APIResponse<{result}>.{factory}(_response.StatusCode);"
                )),
            }
            code.close();
        }
        code.line("default:");
        code.open();
        code.line(format!(
            "return APIResponse<{result}>.Undeclared(_response.StatusCode);"
        ));
        code.close();
    });
}

fn doc_lines(op: &Operation, args: &[Argument]) -> Vec<String> {
    let mut docs = Vec::new();
    if let Some(summary) = one_line(op.summary.as_deref()) {
        docs.push(format!("<summary>{}</summary>", escape_xml(&summary)));
    }
    if let Some(remarks) = one_line(op.description.as_deref()) {
        docs.push(format!("<remarks>{}</remarks>", escape_xml(&remarks)));
    }
    for arg in args {
        if let Some(description) = &arg.description {
            docs.push(format!(
                "<param name=\"{}\">{}</param>",
                arg.ident.trim_start_matches('@'),
                escape_xml(description)
            ));
        }
    }
    if let Some(returns) = one_line(op.canonical_success().map(|r| r.description.as_str())) {
        docs.push(format!("<returns>{}</returns>", escape_xml(&returns)));
    }
    docs
}

fn method_ctx(
    mapper: &mut TypeMapper<'_>,
    item: &PathItem,
    op: &Operation,
    name: &str,
    options: &EmitOptions,
) -> Result<minijinja::Value, EmitError> {
    let prefix = upper_first(name);
    let context = format!("operation `{}`", op.label());

    let success_type = match op.canonical_success().and_then(|r| r.schema.as_ref()) {
        Some(schema) => mapper.map(schema, &format!("{prefix}Out"), &context)?,
        None => CsType::reference(NO_CONTENT),
    };
    let args = arguments(mapper, item, op, &prefix)?;
    let cases = response_cases(mapper, op, &prefix, &success_type)?;
    let result = success_type.name.as_str();

    let mut code = CodeBlock::default();
    code.line(format!("var _uri = {};", path_expression(&op.path, &args)));

    let query: Vec<&Argument> = args
        .iter()
        .filter(|a| matches!(a.kind, ArgumentKind::Query(_)))
        .collect();
    if !query.is_empty() {
        code.line("var _query = new List<string>();");
        for arg in query {
            query_lines(&mut code, arg);
        }
        code.block("if (_query.Count > 0)", |code| {
            code.line("_uri += \"?\" + string.Join(\"&\", _query);");
        });
    }

    code.line(format!(
        "var _options = new HTTPOptions(TimeSpan.FromSeconds({}));",
        options.http_timeout_seconds
    ));
    if op.oauth_secured {
        code.line(format!("_options.Token = {TOKEN_PARAMETER};"));
    }
    for arg in args.iter().filter(|a| a.kind == ArgumentKind::Header) {
        guarded(&mut code, arg, |code| {
            code.line(format!(
                "_options.Headers[{}] = QueryString.Format({});",
                string_literal(&arg.wire_name),
                arg.ident
            ));
        });
    }

    let uri = "new Uri(_uri, UriKind.Absolute)";
    let verb = op.method.pascal();
    if op.method.has_body() {
        let content = if content_lines(&mut code, op, &args) {
            "_content"
        } else {
            "null"
        };
        code.line(format!(
            "var _response = await this.http.{verb}Async({uri}, {content}, _options);"
        ));
    } else {
        if args
            .iter()
            .any(|a| matches!(a.kind, ArgumentKind::Body | ArgumentKind::FormData))
        {
            warn!(
                "{}: {} does not send a body; its body parameters are ignored",
                mapper.spec().source_id,
                op.label()
            );
        }
        code.line(format!("var _response = await this.http.{verb}Async({uri}, _options);"));
    }

    code.block("if (_response == null)", |code| {
        code.line(format!("return APIResponse<{result}>.TransportFailure();"));
    });
    dispatch_lines(&mut code, result, &cases);

    let params: Vec<String> = args.iter().map(Argument::declaration).collect();
    Ok(context! {
        name => format!("{name}Async"),
        result => result,
        params => params.join(", "),
        docs => doc_lines(op, &args),
        deprecated => op.deprecated,
        body => code.into_lines(),
    })
}

/// Template context for one specification's wrapper class. Models the
/// operations need are declared into `mapper`.
pub fn client_ctx(
    mapper: &mut TypeMapper<'_>,
    options: &EmitOptions,
) -> Result<minijinja::Value, EmitError> {
    let spec = mapper.spec();
    let base_url = options.base_url.clone().unwrap_or_else(|| spec.base_url());

    let mut taken: Vec<String> = Vec::new();
    let mut methods = Vec::new();
    for (item, op) in spec.operations() {
        let name = operation_name(op, &taken);
        methods.push(method_ctx(mapper, item, op, &name, options)?);
        taken.push(name);
    }

    Ok(context! {
        name => client_name(spec),
        description => one_line(spec.info.description.as_deref()).map(|d| escape_xml(&d)),
        base_url => string_literal(base_url.trim_end_matches('/')),
        methods => methods,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(ident: &str, kind: ArgumentKind, required: bool) -> Argument {
        Argument {
            ident: ident.to_string(),
            wire_name: ident.to_string(),
            cs_type: CsType::value("long"),
            required,
            default: None,
            description: None,
            kind,
        }
    }

    #[test]
    fn test_path_expression() {
        let args = [arg("petId", ArgumentKind::Path, true)];
        assert_eq!(
            path_expression("/pets/{petId}", &args),
            "this.url + \"/pets/\" + Uri.EscapeDataString(QueryString.Format(petId))"
        );
        assert_eq!(
            path_expression("/pets/{petId}/photos", &args),
            "this.url + \"/pets/\" + Uri.EscapeDataString(QueryString.Format(petId)) + \"/photos\""
        );
        assert_eq!(path_expression("/x/{unknown}", &args), "this.url + \"/x/{unknown}\"");
    }

    #[test]
    fn test_declarations() {
        assert_eq!(arg("petId", ArgumentKind::Path, true).declaration(), "long petId");
        assert_eq!(
            arg("limit", ArgumentKind::Query(None), false).declaration(),
            "long? limit = null"
        );
        let mut with_default = arg("limit", ArgumentKind::Query(None), false);
        with_default.default = Some("20".into());
        assert_eq!(with_default.declaration(), "long? limit = 20");
    }

    #[test]
    fn test_default_literals() {
        let int = CsType::value("int");
        assert_eq!(default_literal(&Literal::Integer(20), &int), Some("20".into()));
        assert_eq!(default_literal(&Literal::Integer(i64::MAX), &int), None);
        assert_eq!(
            default_literal(&Literal::Number(1.5), &CsType::value("float")),
            Some("1.5f".into())
        );
        assert_eq!(
            default_literal(&Literal::String("a\"b".into()), &CsType::reference("string")),
            Some("\"a\\\"b\"".into())
        );
        assert_eq!(default_literal(&Literal::Boolean(true), &int), None);
    }

    #[test]
    fn test_query_formats() {
        let cases = [
            (None, "_query.Add(\"q=\" + Uri.EscapeDataString(QueryString.Format(q)));"),
            (
                Some(CollectionFormat::Pipes),
                "_query.Add(\"q=\" + string.Join(\"|\", q.Select(_item => Uri.EscapeDataString(QueryString.Format(_item)))));",
            ),
        ];
        for (format, expected) in cases {
            let mut code = CodeBlock::default();
            query_lines(&mut code, &arg("q", ArgumentKind::Query(format), true));
            assert_eq!(code.into_lines(), vec![expected.to_string()]);
        }

        let mut code = CodeBlock::default();
        query_lines(
            &mut code,
            &arg("q", ArgumentKind::Query(Some(CollectionFormat::Multi)), false),
        );
        assert_eq!(code.into_lines()[0], "if (q != null)");
    }

    #[test]
    fn test_upper_first() {
        assert_eq!(upper_first("listPets"), "ListPets");
        assert_eq!(upper_first(""), "");
    }
}
