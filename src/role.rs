use serde::{Deserialize, Serialize};

use crate::models::{PrActivity, PrActivityKind};

/// Role a pull-request activity plays relative to the pull request's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Author,
    Reviewer,
    Unclassified,
}

/// Classify an activity against the author of its pull request.
///
/// Commits by the PR author are author work and reviews or review comments by
/// anyone else are reviewer work. Everything else, including an activity on a
/// PR whose author is unknown, is unclassified.
pub fn classify<'a, F>(activity: &PrActivity, pr_author_of: F) -> Role
where
    F: Fn(&str) -> Option<&'a str>,
{
    let Some(pr_author) = pr_author_of(&activity.pr_id) else {
        return Role::Unclassified;
    };
    let by_pr_author = activity.author == pr_author;

    match activity.kind {
        PrActivityKind::Commit if by_pr_author => Role::Author,
        PrActivityKind::Review | PrActivityKind::ReviewComment if !by_pr_author => Role::Reviewer,
        _ => Role::Unclassified,
    }
}
