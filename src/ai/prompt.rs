use std::env;
use std::fs;
use std::path::Path;

use handlebars::Handlebars;
use once_cell::sync::Lazy;

use crate::models::ReviewInput;

const BUILTIN_TEMPLATE: &str = include_str!("../../review-prompt.txt");
const NOT_SPECIFIED: &str = "Not specified";

// Loaded once per process
static PROMPT_TEMPLATE: Lazy<String> = Lazy::new(|| {
    let override_path = env::var("REVIEW_AGENT_PROMPT_PATH").ok();
    load_prompt_template(override_path.as_deref().map(Path::new))
});

/// Read the prompt template from `path`, falling back to the built-in one.
pub fn load_prompt_template(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return BUILTIN_TEMPLATE.to_owned();
    };

    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "cannot read prompt template, using built-in template"
            );
            BUILTIN_TEMPLATE.to_owned()
        }
    }
}

/// Render the configured prompt for one review.
pub fn render_prompt(input: &ReviewInput) -> anyhow::Result<String> {
    render_with_template(&PROMPT_TEMPLATE, input)
}

pub fn render_with_template(template: &str, input: &ReviewInput) -> anyhow::Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    let data = serde_json::json!({
        "business_name": input.business_name(),
        "experience_text": input.experience_text(),
        "rating": input
            .rating()
            .map(|r| r.to_string())
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        "visit_date": input.visit_date().unwrap_or(NOT_SPECIFIED),
    });

    Ok(handlebars.render_template(template, &data)?)
}
