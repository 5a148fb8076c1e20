//! Prompt templates with strict variable substitution.
//!
//! A [`PromptSpec`] holds the immutable pieces of a chat prompt: an optional
//! system template, a fixed table of few-shot example turns, and a human
//! template. [`PromptSpec::render`] substitutes `{key}` placeholders in the
//! system and human templates and produces a [`RenderedPrompt`] ready for the
//! completion backend. Example turns are literal data — they typically contain
//! JSON braces and are never substituted.

use std::collections::HashMap;

use crate::error::{ChainError, Result};

/// Sentinel that should never appear in real templates.
const ESCAPE_SENTINEL: &str = "\x00LBRACE\x00";
/// Sentinel for escaped closing brace.
const ESCAPE_SENTINEL_CLOSE: &str = "\x00RBRACE\x00";

/// The author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// System instructions.
    System,
    /// User input.
    User,
    /// Assistant (model) response.
    Assistant,
}

impl Role {
    /// Wire name used by chat-completion APIs.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single (role, text) turn.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// A fully substituted, ordered sequence of turns ready for transport.
///
/// Created per request and discarded once the completion call returns.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    pub turns: Vec<Turn>,
}

/// An immutable parameterized prompt.
///
/// Built once at process start from static template sources. Placeholders use
/// `{key}` syntax; `{{` and `}}` insert literal braces.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use prompt_chain::template::PromptSpec;
///
/// let spec = PromptSpec::new("Summarize: {prompt}").with_system("You are terse.");
/// let vars = HashMap::from([("prompt".to_string(), "a long text".to_string())]);
/// let rendered = spec.render(&vars).unwrap();
/// assert_eq!(rendered.turns[1].text, "Summarize: a long text");
/// ```
#[derive(Debug, Clone)]
pub struct PromptSpec {
    system: Option<String>,
    examples: Vec<Turn>,
    human: String,
}

impl PromptSpec {
    /// Create a spec with a human template only.
    pub fn new(human: impl Into<String>) -> Self {
        Self {
            system: None,
            examples: Vec::new(),
            human: human.into(),
        }
    }

    /// Set the system template.
    pub fn with_system(mut self, template: impl Into<String>) -> Self {
        self.system = Some(template.into());
        self
    }

    /// Append a literal few-shot example turn. Example text is never
    /// substituted.
    pub fn with_example(mut self, role: Role, text: impl Into<String>) -> Self {
        self.examples.push(Turn::new(role, text));
        self
    }

    /// Append a table of literal few-shot example turns.
    pub fn with_examples(mut self, turns: &[(Role, &str)]) -> Self {
        for (role, text) in turns {
            self.examples.push(Turn::new(*role, *text));
        }
        self
    }

    /// Render the prompt, substituting `{key}` placeholders from `vars` in
    /// the system and human templates.
    ///
    /// Every placeholder referenced in a template must have a matching entry
    /// in `vars`; an unresolved placeholder is a [`ChainError::TemplateRender`].
    pub fn render(&self, vars: &HashMap<String, String>) -> Result<RenderedPrompt> {
        let mut turns = Vec::with_capacity(self.examples.len() + 2);

        if let Some(ref system) = self.system {
            turns.push(Turn::new(Role::System, substitute(system, vars)?));
        }
        turns.extend(self.examples.iter().cloned());
        turns.push(Turn::new(Role::User, substitute(&self.human, vars)?));

        Ok(RenderedPrompt { turns })
    }
}

/// Substitute `{key}` placeholders in a single template.
fn substitute(template: &str, vars: &HashMap<String, String>) -> Result<String> {
    // Pass 1: protect escaped braces
    let mut rendered = template.replace("{{", ESCAPE_SENTINEL);
    rendered = rendered.replace("}}", ESCAPE_SENTINEL_CLOSE);

    // Pass 2: every placeholder must resolve — checked against the template
    // itself, before substitution, so brace-like user content cannot trip it
    if let Some(name) = placeholder_names(&rendered)
        .into_iter()
        .find(|name| !vars.contains_key(name))
    {
        return Err(ChainError::TemplateRender { placeholder: name });
    }

    // Pass 3: substitute
    for (key, value) in vars {
        let placeholder = format!("{{{}}}", key);
        rendered = rendered.replace(&placeholder, value);
    }

    // Pass 4: restore escaped braces
    rendered = rendered.replace(ESCAPE_SENTINEL, "{");
    rendered = rendered.replace(ESCAPE_SENTINEL_CLOSE, "}");
    Ok(rendered)
}

/// Collect `{name}` placeholder names, where `name` is an identifier.
fn placeholder_names(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                if is_identifier(name) {
                    names.push(name.to_string());
                }
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    names
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
