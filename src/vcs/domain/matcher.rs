//! Heuristic matching of tasks to remote branch names.

use super::BranchName;
use crate::task::domain::TaskKind;

/// Returns the book token used in branch names: the first
/// whitespace-delimited word of the book, lower-cased.
#[must_use]
pub fn book_token(book: &str) -> String {
    book.split_whitespace()
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Finds the branch that carries the given task's output.
///
/// A candidate matches when it contains the book token, names the module
/// number (`module-{n}`, `module{n}`, `-{n}-` or a trailing `-{n}`) and
/// carries the kind marker (`glossar` for glossaries, `test` or `qbank` for
/// tests). Comparisons are case-insensitive and the module number must not
/// be followed by another digit, so module 5 never matches `module-15` or
/// `module-50`. The first match in iteration order wins.
#[must_use]
pub fn match_branch<'a, I>(kind: TaskKind, book: &str, module: u32, candidates: I) -> Option<BranchName>
where
    I: IntoIterator<Item = &'a BranchName>,
{
    let token = book_token(book);
    if token.is_empty() {
        return None;
    }

    candidates
        .into_iter()
        .find(|candidate| {
            let lowered = candidate.as_str().to_lowercase();
            lowered.contains(&token)
                && mentions_module(&lowered, module)
                && mentions_kind(&lowered, kind)
        })
        .cloned()
}

fn mentions_module(name: &str, module: u32) -> bool {
    let number = module.to_string();
    let bounded_forms = [
        format!("module-{number}"),
        format!("module{number}"),
        format!("-{number}-"),
    ];

    bounded_forms
        .iter()
        .any(|form| contains_bounded(name, form))
        || name.ends_with(&format!("-{number}"))
}

/// Returns `true` when `needle` occurs in `haystack` without a digit
/// directly after it.
fn contains_bounded(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, matched)| {
        haystack
            .get(start + matched.len()..)
            .and_then(|rest| rest.chars().next())
            .is_none_or(|next| !next.is_ascii_digit())
    })
}

fn mentions_kind(name: &str, kind: TaskKind) -> bool {
    match kind {
        TaskKind::Glossary => name.contains("glossar"),
        TaskKind::Tests => name.contains("test") || name.contains("qbank"),
    }
}
