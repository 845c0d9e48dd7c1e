use heck::ToPascalCase;

/// Turns arbitrary document text into target-language identifiers.
///
/// The only per-target knob is the "any" type the literal name `object`
/// maps to. `normalize` is idempotent and total over any input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameNormalizer {
    any_type: &'static str,
}

impl NameNormalizer {
    pub const fn new(any_type: &'static str) -> Self {
        Self { any_type }
    }

    pub fn any_type(&self) -> &'static str {
        self.any_type
    }

    /// Normalize a type name:
    ///
    /// - whitespace is removed
    /// - `Foo[Bar]` collapses to `FooOfBar`, repeatedly for nested brackets
    /// - remaining non-identifier characters are dropped and the next
    ///   character is upper-cased (`pet-store` → `petStore`)
    /// - a leading digit gets a `_` prefix, an empty result becomes `Unnamed`
    /// - `object` (any case) becomes the target's any type
    pub fn normalize(&self, raw: &str) -> String {
        let mut name: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        while let Some(collapsed) = collapse_brackets(&name) {
            name = collapsed;
        }

        let name = sanitize_identifier(&name);
        if name.eq_ignore_ascii_case("object") {
            return self.any_type.to_string();
        }
        name
    }

    /// Normalize each `.`-separated segment of a namespace path.
    pub fn normalize_path(&self, raw: &str) -> String {
        let path = raw
            .split('.')
            .filter(|segment| !segment.trim().is_empty())
            .map(|segment| self.normalize(segment))
            .collect::<Vec<_>>()
            .join(".");
        if path.is_empty() { self.normalize(raw) } else { path }
    }

    /// True when `raw` normalizes to the target's any type.
    pub fn is_any(&self, raw: &str) -> bool {
        self.normalize(raw) == self.any_type
    }
}

/// `Outer[Inner]rest` → `OuterOfInnerrest`, matching the first `[` with the
/// last `]`. `None` when there is nothing to collapse.
fn collapse_brackets(name: &str) -> Option<String> {
    let open = name.find('[')?;
    let close = name.rfind(']')?;
    if close <= open + 1 {
        return None;
    }
    Some(format!(
        "{}Of{}{}",
        &name[..open],
        &name[open + 1..close],
        &name[close + 1..]
    ))
}

/// Keep `[A-Za-z0-9_]`, upper-casing the character after each dropped one.
pub fn sanitize_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut upper_next = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if upper_next {
                result.push(ch.to_ascii_uppercase());
            } else {
                result.push(ch);
            }
            upper_next = false;
        } else {
            upper_next = !result.is_empty();
        }
    }

    if result.is_empty() {
        return "Unnamed".to_string();
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}

/// Name for an operation without an `operationId` in class-based output:
/// verb plus the first path segment.
///
/// - `GET /pets` → `GetPets`
/// - `DELETE /pets/{id}` → `DeletePets`
/// - `GET /` → `Get`
pub fn class_operation_name(method: &str, path: &str) -> String {
    let verb = method.to_ascii_lowercase().to_pascal_case();
    let first = path
        .split('/')
        .find(|s| !s.is_empty())
        .map(|s| s.trim_matches(|c| c == '{' || c == '}'))
        .unwrap_or("");
    format!("{}{}", verb, sanitize_segment(first))
}

/// Name for an operation without an `operationId` in interface-based
/// output: lower-case verb plus every path segment, with `by<Name>` for
/// template segments.
///
/// - `GET /pets` → `getPets`
/// - `GET /pets/{id}` → `getPetsById`
/// - `POST /stores/{storeId}/orders/` → `postStoresByStoreIdOrders`
pub fn route_operation_name(method: &str, path: &str) -> String {
    let mut name = method.to_ascii_lowercase();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if let Some(param) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            name.push_str("By");
            name.push_str(&sanitize_segment(param));
        } else {
            name.push_str(&sanitize_segment(segment));
        }
    }
    name
}

fn sanitize_segment(segment: &str) -> String {
    if segment.is_empty() {
        return String::new();
    }
    sanitize_identifier(segment).trim_start_matches('_').to_pascal_case()
}

/// Definition name behind a `#/definitions/<Name>` pointer.
pub fn definition_ref_name(ref_path: &str) -> Option<&str> {
    ref_path
        .strip_prefix("#/definitions/")
        .filter(|name| !name.is_empty())
}
