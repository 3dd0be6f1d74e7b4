//! Prompt construction for the four analyses.

use crate::models::{AnalysisContext, AnalysisKind};
use std::fmt::Write;

/// Shared instructions for every analysis.
const BASE_SYSTEM_PROMPT: &str = r#"You are a friendly open-source mentor helping a newcomer make their first contribution to a GitHub project.
Answer only from the repository information you are given. If something is not covered, say so instead of guessing.
Format the answer as a short HTML fragment using only <h4>, <p>, <ul>, <ol>, <li>, <strong>, <em>, <code> and <a href>.
Do not wrap the answer in markdown code fences and do not include <html>, <head> or <body> tags."#;

/// Task-specific instructions.
fn task_instructions(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::WhereToStart => {
            "Recommend where a newcomer should start. Pick up to five of the listed issues that look \
             most approachable, link each one, and explain in one sentence why it is a good first step. \
             Then list the files or docs to read first and how to set up the project locally."
        }
        AnalysisKind::WhatNeedsImproving => {
            "Identify what in this project needs improving: gaps in documentation, missing contributor \
             guidance, recurring themes in open issues, and areas where help is explicitly requested. \
             Group the points by theme and keep each point actionable."
        }
        AnalysisKind::ContributionRules => {
            "Summarize the contribution rules: workflow (fork, branch, pull request), commit and code style \
             requirements, testing expectations, review process, and the key points of the code of conduct. \
             If the project has no CONTRIBUTING or CODE_OF_CONDUCT file, say so and give the usual GitHub \
             etiquette instead."
        }
        AnalysisKind::ProjectOverview => {
            "Give a project overview: what the project does, who it is for, the main technologies, \
             how active and popular it is, and how it is organized. Keep it under 250 words."
        }
    }
}

pub fn system_prompt(kind: AnalysisKind) -> String {
    format!("{}\n\nTask: {}", BASE_SYSTEM_PROMPT, task_instructions(kind))
}

/// Render the repository context. Documents are cut to `max_document_chars`.
pub fn user_prompt(kind: AnalysisKind, context: &AnalysisContext, max_document_chars: usize) -> String {
    let repo = &context.repository;
    let mut prompt = String::new();

    let _ = writeln!(prompt, "=== REPOSITORY ===");
    let _ = writeln!(prompt, "Name: {}", repo.full_name);
    let _ = writeln!(prompt, "URL: {}", repo.html_url);
    if let Some(ref description) = repo.description {
        let _ = writeln!(prompt, "Description: {}", description);
    }
    if let Some(ref language) = repo.language {
        let _ = writeln!(prompt, "Primary language: {}", language);
    }
    if !repo.topics.is_empty() {
        let _ = writeln!(prompt, "Topics: {}", repo.topics.join(", "));
    }
    if let Some(ref license) = repo.license {
        let _ = writeln!(prompt, "License: {}", license.name);
    }
    let _ = writeln!(
        prompt,
        "Stars: {} | Forks: {} | Open issues: {}",
        repo.stargazers_count, repo.forks_count, repo.open_issues_count
    );
    if let Some(updated) = repo.updated_at {
        let _ = writeln!(prompt, "Last updated: {}", updated.format("%Y-%m-%d"));
    }

    let _ = writeln!(prompt, "\n=== BEGINNER-FRIENDLY ISSUES ({}) ===", context.issues.len());
    if context.issues.is_empty() {
        let _ = writeln!(prompt, "(none found)");
    }
    for issue in &context.issues {
        let _ = writeln!(
            prompt,
            "- #{} {} [{}] {}",
            issue.number,
            issue.title,
            issue.label_names().join(", "),
            issue.html_url
        );
    }

    push_document(&mut prompt, "README.md", context.readme.as_deref(), max_document_chars);
    push_document(
        &mut prompt,
        "CONTRIBUTING.md",
        context.contributing.as_deref(),
        max_document_chars,
    );
    push_document(
        &mut prompt,
        "CODE_OF_CONDUCT.md",
        context.code_of_conduct.as_deref(),
        max_document_chars,
    );

    let _ = write!(prompt, "\nNow write the {} analysis.", kind);
    prompt
}

fn push_document(prompt: &mut String, name: &str, content: Option<&str>, max_chars: usize) {
    let _ = writeln!(prompt, "\n=== {} ===", name);
    match content {
        Some(text) => {
            let (excerpt, truncated) = truncate_chars(text.trim(), max_chars);
            prompt.push_str(excerpt);
            if truncated {
                prompt.push_str("\n[... truncated ...]");
            }
            prompt.push('\n');
        }
        None => {
            let _ = writeln!(prompt, "(not present in this repository)");
        }
    }
}

/// Cut `text` to at most `max_chars` characters on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

/// Strip a markdown code fence the model may have wrapped its answer in.
pub fn clean_output(output: &str) -> String {
    let trimmed = output.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    // Drop the info string (```html) on the opening line.
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    fn context() -> AnalysisContext {
        AnalysisContext {
            repository: fixtures::repository("octocat", "hello"),
            issues: vec![fixtures::issue(7, "Fix typo in docs", &["good first issue"])],
            readme: Some("# Hello\nWelcome to the project.".to_string()),
            contributing: None,
            code_of_conduct: Some("Be kind.".to_string()),
        }
    }

    #[test]
    fn test_system_prompt_includes_task() {
        let prompt = system_prompt(AnalysisKind::ContributionRules);
        assert!(prompt.contains("open-source mentor"));
        assert!(prompt.contains("contribution rules"));
    }

    #[test]
    fn test_user_prompt_lists_context() {
        let prompt = user_prompt(AnalysisKind::WhereToStart, &context(), 4000);
        assert!(prompt.contains("Name: octocat/hello"));
        assert!(prompt.contains("- #7 Fix typo in docs [good first issue]"));
        assert!(prompt.contains("Welcome to the project."));
        assert!(prompt.contains("=== CONTRIBUTING.md ===\n(not present in this repository)"));
        assert!(prompt.contains("Be kind."));
        assert!(prompt.ends_with("Now write the where to start analysis."));
    }

    #[test]
    fn test_user_prompt_truncates_documents() {
        let mut ctx = context();
        ctx.readme = Some("é".repeat(50));
        let prompt = user_prompt(AnalysisKind::ProjectOverview, &ctx, 10);
        assert!(prompt.contains(&format!("{}\n[... truncated ...]", "é".repeat(10))));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), ("hello", false));
        assert_eq!(truncate_chars("hello", 5), ("hello", false));
        assert_eq!(truncate_chars("hello", 2), ("he", true));
    }

    #[test]
    fn test_clean_output() {
        assert_eq!(clean_output("  <p>hi</p>\n"), "<p>hi</p>");
        assert_eq!(clean_output("```html\n<p>hi</p>\n```"), "<p>hi</p>");
        assert_eq!(clean_output("```\n<ul><li>a</li></ul>\n```\n"), "<ul><li>a</li></ul>");
        assert_eq!(clean_output("```html\n<p>unterminated</p>"), "<p>unterminated</p>");
    }
}
