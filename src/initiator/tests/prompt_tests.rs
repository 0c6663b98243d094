//! Prompt rendering and branch naming.

use crate::initiator::{PromptRenderer, prompt_book_token};
use crate::task::domain::TaskKind;
use crate::vcs::domain::{BranchName, match_branch};
use rstest::rstest;

#[rstest]
#[case("Economics", "economics")]
#[case("Fixed Income", "fixed")]
#[case("Alternative Investments", "alternative")]
#[case("Self-Study Notes", "self")]
fn book_token_stops_at_first_separator(#[case] book: &str, #[case] expected: &str) {
    assert_eq!(prompt_book_token(book), expected);
}

#[rstest]
#[case(TaskKind::Glossary, "claude/add-economics-module-5-glossary-XXXXX")]
#[case(TaskKind::Tests, "claude/add-economics-module-5-tests-XXXXX")]
fn branch_pattern_follows_convention(#[case] kind: TaskKind, #[case] expected: &str) {
    let renderer = PromptRenderer::new("claude/");
    assert_eq!(renderer.branch_pattern(kind, "Economics", 5), expected);
}

#[rstest]
#[case(TaskKind::Glossary, "GLOSSARY_INSTRUCTION.md")]
#[case(TaskKind::Tests, "QBANK_INSTRUCTION.md")]
fn prompt_names_branch_and_instruction(#[case] kind: TaskKind, #[case] instruction: &str) {
    let renderer = PromptRenderer::new("claude/");

    let prompt = renderer
        .render(kind, "Fixed Income", 12)
        .expect("template renders");

    assert!(prompt.contains(&format!("git checkout -b claude/add-fixed-module-12-{kind}-XXXXX")));
    assert!(prompt.contains(instruction));
    assert!(prompt.contains("module 12 of the book Fixed Income"));
}

#[rstest]
#[case(TaskKind::Glossary)]
#[case(TaskKind::Tests)]
fn example_branch_is_matched_back_to_its_task(#[case] kind: TaskKind) {
    let renderer = PromptRenderer::new("claude/");
    let prompt = renderer
        .render(kind, "Portfolio Management", 7)
        .expect("template renders");
    let example = prompt
        .lines()
        .find_map(|line| line.strip_prefix("Example for this task: "))
        .expect("prompt has an example branch");
    let candidates = [BranchName::new(example).expect("valid branch")];

    let matched = match_branch(kind, "Portfolio Management", 7, &candidates);

    assert_eq!(matched.as_ref().map(BranchName::as_str), Some(example));
}
