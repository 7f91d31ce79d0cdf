//! Hygiene: source-level rules checked at test time.
//!
//! Each rule scans the production files under `src/` (test files excluded)
//! and has a budget. Budgets only go down.
#![allow(clippy::absurd_extreme_comparisons)]

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

struct Rule {
    pattern: &'static str,
    budget: usize,
    why: &'static str,
}

const RULES: &[Rule] = &[
    Rule { pattern: ".unwrap()", budget: 0, why: "panics in the browser tab" },
    Rule { pattern: ".expect(", budget: 0, why: "panics in the browser tab" },
    Rule { pattern: "panic!(", budget: 0, why: "panics in the browser tab" },
    Rule { pattern: "unreachable!(", budget: 0, why: "panics in the browser tab" },
    Rule { pattern: "todo!(", budget: 0, why: "unfinished stub" },
    Rule { pattern: "unimplemented!(", budget: 0, why: "unfinished stub" },
    Rule { pattern: "let _ =", budget: 0, why: "discards an error without looking at it" },
    Rule { pattern: ".ok()", budget: 0, why: "discards an error without looking at it" },
    Rule { pattern: "#[allow(dead_code)]", budget: 0, why: "hides unused code" },
];

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

fn format_hits(hits: &[(String, usize)]) -> String {
    hits.iter()
        .map(|(path, count)| format!("  {path}: {count}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn source_tree_is_not_empty() {
    assert!(!source_files().is_empty(), "no sources found under src/");
}

#[test]
fn budgets_hold() {
    let files = source_files();
    let mut failures = Vec::new();
    for rule in RULES {
        let found = hits(&files, rule.pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > rule.budget {
            failures.push(format!(
                "`{}` ({}): found {count}, max {}\n{}",
                rule.pattern,
                rule.why,
                rule.budget,
                format_hits(&found)
            ));
        }
    }
    assert!(failures.is_empty(), "hygiene budgets exceeded:\n{}", failures.join("\n"));
}

#[test]
fn browser_storage_only_in_token_store() {
    let files = source_files();
    let offenders: Vec<_> = hits(&files, "local_storage()")
        .into_iter()
        .filter(|(path, _)| !path.ends_with("token_store.rs"))
        .collect();
    assert!(
        offenders.is_empty(),
        "credentials must be persisted through TokenStore:\n{}",
        format_hits(&offenders)
    );
}
