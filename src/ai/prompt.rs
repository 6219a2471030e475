//! Reusable prompts using Handlebars for templating. Handlebars adds
//! additional security controls since it can't do much out of the box
//! without registering your own helpers.
//!
//! The snippet is rendered with a triple-stash so it is embedded
//! verbatim. Nothing is escaped, so a snippet containing backticks
//! will collide with the fence around it and is passed through as-is.

use std::fmt;

use handlebars::{Handlebars, RenderError};
use serde_json::json;

#[derive(Debug)]
pub enum Prompt {
    CodeNotes,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Default instruction seeded as the first message of every session.
pub const SYSTEM_PROMPT: &str = "Create in details Notes \n\
    If needed as Table and mermaid diagram\n\
    Explain as much as you can \n\
    Be grounded to content \n\
    Create only one .md file \n\
    if you found math equaction then write all step with github markdown supported latex";

pub const WELCOME_MESSAGE: &str = "Welcome! Paste a code snippet, and I'll generate detailed notes in Markdown format, including tables, diagrams, and explanations where applicable.";

const CODE_NOTES_PROMPT: &str = "Analyze this code and generate detailed notes:\n\n```{{{snippet}}}```";

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry
        .register_template_string(&Prompt::CodeNotes.to_string(), CODE_NOTES_PROMPT)
        .expect("Failed to register template");
    registry
}

/// Wrap a raw code snippet in the analysis instructions.
pub fn code_notes(registry: &Handlebars, snippet: &str) -> Result<String, RenderError> {
    registry.render(&Prompt::CodeNotes.to_string(), &json!({ "snippet": snippet }))
}
