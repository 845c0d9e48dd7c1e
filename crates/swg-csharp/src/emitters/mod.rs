pub mod client;
pub mod models;

use minijinja::Environment;
use swg_core::error::EmitError;

pub(crate) fn render_error(err: minijinja::Error) -> EmitError {
    EmitError::Render(err.to_string())
}

/// Escape text for an XML doc comment.
pub(crate) fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Template environment shared by every specification of one document.
pub fn environment() -> Result<Environment<'static>, EmitError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_filter("escape_xml", |value: String| escape_xml(&value));
    env.add_template("document.cs.j2", include_str!("../../templates/document.cs.j2"))
        .map_err(render_error)?;
    env.add_template("model.cs.j2", include_str!("../../templates/model.cs.j2"))
        .map_err(render_error)?;
    env.add_template("client.cs.j2", include_str!("../../templates/client.cs.j2"))
        .map_err(render_error)?;
    Ok(env)
}

/// Collapse documentation onto one line.
pub(crate) fn one_line(text: Option<&str>) -> Option<String> {
    let text = text?.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() { None } else { Some(text) }
}

/// `base`, or `base` with the first free numeric suffix from 2 up.
pub(crate) fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut name = base.to_string();
    let mut n = 2;
    while taken(&name) {
        name = format!("{base}{n}");
        n += 1;
    }
    name
}

/// Statement lines with tracked brace depth, for method bodies.
#[derive(Debug, Default)]
pub struct CodeBlock {
    lines: Vec<String>,
    depth: usize,
}

impl CodeBlock {
    pub fn line(&mut self, text: impl AsRef<str>) {
        self.lines
            .push(format!("{}{}", "    ".repeat(self.depth), text.as_ref()));
    }

    pub fn open(&mut self) {
        self.line("{");
        self.depth += 1;
    }

    pub fn close(&mut self) {
        self.close_with("}");
    }

    /// Close a block with something other than a bare brace, e.g. `};`.
    pub fn close_with(&mut self, closing: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(closing);
    }

    /// `header` followed by a braced block built by `body`.
    pub fn block(&mut self, header: impl AsRef<str>, body: impl FnOnce(&mut CodeBlock)) {
        self.line(header);
        self.open();
        body(self);
        self.close();
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
