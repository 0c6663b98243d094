//! Prompts handed to the external content generator.
//!
//! The generator is told to create its branch under an exact name, which is
//! what lets the reconciliation loop find it later.

use super::{InitiatorError, InitiatorResult};
use crate::task::domain::TaskKind;
use minijinja::Environment;
use serde_json::{Map, Value};

const GLOSSARY_TEMPLATE: &str = "\
Hi! Time to add content to the project.

FIRST create a branch with EXACTLY this name format:
git checkout -b {{ branch }}
git push -u origin {{ branch }}

Replace XXXXX with any 5 random characters.
Example for this task: {{ example }}

Do NOT start work until the branch is created and pushed.

Find the glossary instruction (GLOSSARY_INSTRUCTION.md) in the Instructions folder and follow it.
This is for module {{ module }} of the book {{ book }}.
Good luck";

const TESTS_TEMPLATE: &str = "\
Hi! Time to add content to the project.

FIRST create a branch with EXACTLY this name format:
git checkout -b {{ branch }}
git push -u origin {{ branch }}

Replace XXXXX with any 5 random characters.
Example for this task: {{ example }}

Do NOT start work until the branch is created and pushed.

Find the test bank instruction (QBANK_INSTRUCTION.md) in the Instructions folder and follow it.
This is for module {{ module }} of the book {{ book }}.
Good luck";

/// Book token used in prompted branch names: the display name lower-cased,
/// spaces turned into hyphens, cut at the first hyphen.
#[must_use]
pub fn prompt_book_token(book: &str) -> String {
    book.trim()
        .to_lowercase()
        .replace(' ', "-")
        .split('-')
        .next()
        .unwrap_or_default()
        .to_owned()
}

/// Renders generator prompts with `minijinja`.
#[derive(Debug, Clone)]
pub struct PromptRenderer {
    branch_prefix: String,
}

impl PromptRenderer {
    /// Creates a renderer for branches under `branch_prefix`.
    #[must_use]
    pub fn new(branch_prefix: impl Into<String>) -> Self {
        Self {
            branch_prefix: branch_prefix.into(),
        }
    }

    /// Returns the branch name pattern a generator must use, with `XXXXX`
    /// standing for the random suffix.
    #[must_use]
    pub fn branch_pattern(&self, kind: TaskKind, book: &str, module: u32) -> String {
        self.branch_with_suffix(kind, book, module, "XXXXX")
    }

    /// Renders the prompt for one task.
    ///
    /// # Errors
    ///
    /// Returns [`InitiatorError::TemplateRender`] when rendering fails.
    pub fn render(&self, kind: TaskKind, book: &str, module: u32) -> InitiatorResult<String> {
        let template = match kind {
            TaskKind::Glossary => GLOSSARY_TEMPLATE,
            TaskKind::Tests => TESTS_TEMPLATE,
        };

        let mut context = Map::new();
        context.insert(
            "branch".to_owned(),
            Value::String(self.branch_pattern(kind, book, module)),
        );
        context.insert(
            "example".to_owned(),
            Value::String(self.branch_with_suffix(kind, book, module, "aB3nQ")),
        );
        context.insert("module".to_owned(), Value::from(module));
        context.insert("book".to_owned(), Value::String(book.to_owned()));

        Environment::new()
            .render_str(template, context)
            .map_err(|error| InitiatorError::TemplateRender {
                kind,
                reason: error.to_string(),
            })
    }

    fn branch_with_suffix(&self, kind: TaskKind, book: &str, module: u32, suffix: &str) -> String {
        format!(
            "{}add-{}-module-{module}-{kind}-{suffix}",
            self.branch_prefix,
            prompt_book_token(book)
        )
    }
}
