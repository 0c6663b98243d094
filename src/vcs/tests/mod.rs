mod commit_tests;
mod merge_tests;
