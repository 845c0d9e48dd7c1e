pub mod api;
pub mod module;
pub mod types;

use minijinja::Environment;
use swg_core::error::EmitError;

pub(crate) fn render_error(err: minijinja::Error) -> EmitError {
    EmitError::Render(err.to_string())
}

/// Escape `*/` sequences that would prematurely close JSDoc comment blocks.
fn escape_jsdoc(value: String) -> String {
    value.replace("*/", "*\\/")
}

/// Template environment shared by every module of one document.
pub fn environment() -> Result<Environment<'static>, EmitError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_filter("escape_jsdoc", escape_jsdoc);
    env.add_template("module.ts.j2", include_str!("../../templates/module.ts.j2"))
        .map_err(render_error)?;
    env.add_template("document.ts.j2", include_str!("../../templates/document.ts.j2"))
        .map_err(render_error)?;
    Ok(env)
}

/// Collapse documentation onto one line for a `/** */` comment.
pub(crate) fn one_line(text: Option<&str>) -> Option<String> {
    let text = text?.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() { None } else { Some(text) }
}
