use std::collections::{BTreeSet, HashSet};

use crate::config::EngagementConfig;
use crate::index::ActivityIndex;
use crate::models::{Issue, IssueTeamEffort};
use crate::role::Role;

/// Team effort on one issue, counting each member's days independently.
///
/// Returns `None` when no roster member earned a commenter, author or reviewer
/// day on the issue.
pub fn issue_team_effort(
    index: &ActivityIndex<'_>,
    config: &EngagementConfig,
    issue: &Issue,
) -> Option<IssueTeamEffort> {
    let mut commenter_days: HashSet<(&str, &str)> = HashSet::new();
    let mut author_days: HashSet<(&str, &str)> = HashSet::new();
    let mut reviewer_days: HashSet<(&str, &str)> = HashSet::new();
    let mut contributors: BTreeSet<&str> = BTreeSet::new();

    for dated in index.comments_on(&issue.id) {
        let member = dated.comment.author.as_str();
        if !config.is_member(member) {
            continue;
        }
        contributors.insert(member);
        commenter_days.insert((member, dated.day.as_str()));
    }

    for dated in index.activities_on(&issue.id) {
        let member = dated.activity.author.as_str();
        if !config.is_member(member) {
            continue;
        }
        contributors.insert(member);
        match dated.role {
            Role::Author => {
                author_days.insert((member, dated.day.as_str()));
            }
            Role::Reviewer => {
                reviewer_days.insert((member, dated.day.as_str()));
            }
            Role::Unclassified => {}
        }
    }

    let total_effort_days = commenter_days.len() + author_days.len() + reviewer_days.len();
    if total_effort_days == 0 {
        return None;
    }

    Some(IssueTeamEffort {
        issue_id: issue.id.clone(),
        issue_number: issue.number,
        repository: issue.repository.clone(),
        title: issue.title.clone(),
        url: issue.url.clone(),
        commenter_days: commenter_days.len(),
        author_days: author_days.len(),
        reviewer_days: reviewer_days.len(),
        total_effort_days,
        contributors: contributors.into_iter().map(str::to_string).collect(),
    })
}

/// Effort for every tracked issue the team worked on, heaviest first.
///
/// Equal totals are ordered by repository, then issue number.
pub fn team_issue_effort(
    index: &ActivityIndex<'_>,
    config: &EngagementConfig,
) -> Vec<IssueTeamEffort> {
    let mut efforts: Vec<IssueTeamEffort> = index
        .issues()
        .filter_map(|issue| issue_team_effort(index, config, issue))
        .collect();

    efforts.sort_by(|a, b| {
        b.total_effort_days
            .cmp(&a.total_effort_days)
            .then_with(|| a.repository.cmp(&b.repository))
            .then_with(|| a.issue_number.cmp(&b.issue_number))
            .then_with(|| a.issue_id.cmp(&b.issue_id))
    });
    efforts
}
