//! Prompt assembly.
//!
//! Turns an issue snapshot and the repository files into the single text
//! payload sent to the completion service. The layout is fixed:
//!
//! ```text
//! <system prompt>Title:<title>
//! Body:<body>
//! <login>:<comment>          (one line per non-bot comment)
//! ----------
//! Below is the source code for the repository.  ...
//! <path>:<contents>          (one line per file)
//! ```
//!
//! Assembly is pure: no I/O, and identical inputs give byte-identical output.

use crate::{FileEntry, IssueSnapshot, Prompt};

/// Login of the automation account whose comments are left out of the prompt.
///
/// The pipeline posts its own results under this identity, so including them
/// would feed earlier completions back into the model.
pub const AUTOMATION_BOT_LOGIN: &str = "github-actions[bot]";

/// Line separating the issue conversation from the source dump.
pub const SOURCE_DIVIDER: &str = "----------\nBelow is the source code for the repository.  Please use the code below to help you answer the issue, including how to respond to the issue.\n";

/// An assembled prompt plus counts describing what went into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub prompt: Prompt,
    pub included_comments: usize,
    pub skipped_comments: usize,
    pub files: usize,
}

/// Builds the prompt for `issue` and `files`, prefixed by `system_prompt`.
pub fn assemble_prompt(
    issue: &IssueSnapshot,
    files: &[FileEntry],
    system_prompt: &str,
) -> AssembledPrompt {
    let mut text = String::with_capacity(estimate_capacity(issue, files, system_prompt));
    text.push_str(system_prompt);

    text.push_str("Title:");
    text.push_str(&issue.title);
    text.push('\n');
    text.push_str("Body:");
    text.push_str(&issue.body);
    text.push('\n');

    let mut included_comments = 0;
    let mut skipped_comments = 0;
    for comment in &issue.comments {
        if comment.author == AUTOMATION_BOT_LOGIN {
            skipped_comments += 1;
            continue;
        }
        push_entry(&mut text, &comment.author, &comment.body);
        included_comments += 1;
    }

    text.push_str(SOURCE_DIVIDER);

    for file in files {
        push_entry(&mut text, &file.path, &file.contents);
    }

    AssembledPrompt {
        prompt: Prompt::from_string(text),
        included_comments,
        skipped_comments,
        files: files.len(),
    }
}

fn push_entry(text: &mut String, label: &str, value: &str) {
    text.push_str(label);
    text.push(':');
    text.push_str(value);
    text.push('\n');
}

fn estimate_capacity(issue: &IssueSnapshot, files: &[FileEntry], system_prompt: &str) -> usize {
    let comments: usize = issue
        .comments
        .iter()
        .map(|c| c.author.len() + c.body.len() + 2)
        .sum();
    let sources: usize = files
        .iter()
        .map(|f| f.path.len() + f.contents.len() + 2)
        .sum();
    system_prompt.len() + issue.title.len() + issue.body.len() + 14 + comments
        + SOURCE_DIVIDER.len()
        + sources
}
