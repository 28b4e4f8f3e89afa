//! Per-member audit trail for a single issue: which days each member
//! commented, and which pull requests they authored or reviewed on each day.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::config::EngagementConfig;
use crate::index::ActivityIndex;
use crate::models::{DayComment, DayPullRequests, Issue, MemberIssueContribution, PrLink};
use crate::role::Role;

#[derive(Default)]
struct Trail<'i> {
    // day -> (instant, comment id) of the latest comment that day
    comments: BTreeMap<&'i str, (DateTime<Utc>, &'i str)>,
    authored: BTreeMap<&'i str, BTreeSet<&'i str>>,
    reviewed: BTreeMap<&'i str, BTreeSet<&'i str>>,
}

/// Contributions of every roster member with activity on `issue_id`, largest
/// first. An unknown issue yields an empty list.
pub fn member_issue_contributions(
    index: &ActivityIndex<'_>,
    config: &EngagementConfig,
    issue_id: &str,
) -> Vec<MemberIssueContribution> {
    let Some(issue) = index.issue(issue_id) else {
        return Vec::new();
    };

    let mut trails: HashMap<&str, Trail<'_>> = HashMap::new();

    for dated in index.comments_on(issue_id) {
        let comment = dated.comment;
        if !config.is_member(&comment.author) {
            continue;
        }
        let candidate = (dated.at, comment.id.as_str());
        trails
            .entry(comment.author.as_str())
            .or_default()
            .comments
            .entry(dated.day.as_str())
            .and_modify(|latest| {
                if candidate > *latest {
                    *latest = candidate;
                }
            })
            .or_insert(candidate);
    }

    for dated in index.activities_on(issue_id) {
        let activity = dated.activity;
        if !config.is_member(&activity.author) {
            continue;
        }
        let trail = trails.entry(activity.author.as_str()).or_default();
        let channel = match dated.role {
            Role::Author => &mut trail.authored,
            Role::Reviewer => &mut trail.reviewed,
            Role::Unclassified => continue,
        };
        channel
            .entry(dated.day.as_str())
            .or_default()
            .insert(activity.pr_id.as_str());
    }

    let mut contributions: Vec<MemberIssueContribution> = trails
        .into_iter()
        .map(|(member, trail)| build_contribution(index, issue, member, trail))
        .filter(|contribution| contribution.total_days() > 0)
        .collect();

    contributions.sort_by(|a, b| {
        b.total_days()
            .cmp(&a.total_days())
            .then_with(|| a.member.cmp(&b.member))
    });
    contributions
}

fn build_contribution(
    index: &ActivityIndex<'_>,
    issue: &Issue,
    member: &str,
    trail: Trail<'_>,
) -> MemberIssueContribution {
    let comments = trail
        .comments
        .into_iter()
        .rev()
        .map(|(date, (_, comment_id))| DayComment {
            date: date.to_string(),
            comment_id: comment_id.to_string(),
            url: comment_url(issue, comment_id),
        })
        .collect::<Vec<_>>();

    let authored = pull_request_days(index, trail.authored);
    let reviewed = pull_request_days(index, trail.reviewed);

    MemberIssueContribution {
        member: member.to_string(),
        commenter_days: comments.len(),
        author_days: authored.len(),
        reviewer_days: reviewed.len(),
        comments,
        authored,
        reviewed,
    }
}

fn pull_request_days(
    index: &ActivityIndex<'_>,
    days: BTreeMap<&str, BTreeSet<&str>>,
) -> Vec<DayPullRequests> {
    days.into_iter()
        .rev()
        .map(|(date, pr_ids)| {
            let mut pull_requests: Vec<PrLink> = pr_ids
                .into_iter()
                .filter_map(|pr_id| index.pull_request(pr_id))
                .map(|pr| PrLink {
                    number: pr.number,
                    url: pr.url.clone(),
                })
                .collect();
            pull_requests.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.url.cmp(&b.url)));

            DayPullRequests {
                date: date.to_string(),
                pull_requests,
            }
        })
        .collect()
}

fn comment_url(issue: &Issue, comment_id: &str) -> String {
    if issue.url.is_empty() {
        String::new()
    } else {
        format!("{}#issuecomment-{comment_id}", issue.url)
    }
}
