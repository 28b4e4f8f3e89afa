//! Pre-indexed view over a snapshot.
//!
//! Every record's day key and role are derived exactly once here. Batch
//! aggregations then look records up by issue, author or pull request instead
//! of rescanning the raw collections.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::EngagementConfig;
use crate::day::{day_key, format_day, parse_timestamp};
use crate::models::{Comment, Issue, LinkedPr, PrActivity};
use crate::role::{classify, Role};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone)]
pub struct DatedComment<'a> {
    pub comment: &'a Comment,
    pub at: DateTime<Utc>,
    pub day: String,
}

#[derive(Debug, Clone)]
pub struct DatedActivity<'a> {
    pub activity: &'a PrActivity,
    pub day: String,
    pub role: Role,
}

#[derive(Debug, Default)]
pub struct ActivityIndex<'a> {
    issues: Vec<&'a Issue>,
    issues_by_id: HashMap<&'a str, &'a Issue>,
    prs: HashMap<&'a str, &'a LinkedPr>,
    issues_by_pr: HashMap<&'a str, Vec<&'a str>>,
    comments: Vec<DatedComment<'a>>,
    activities: Vec<DatedActivity<'a>>,
    comments_by_issue: HashMap<&'a str, Vec<usize>>,
    comments_by_author: HashMap<&'a str, Vec<usize>>,
    activities_by_issue: HashMap<&'a str, Vec<usize>>,
    activities_by_author: HashMap<&'a str, Vec<usize>>,
    skipped: usize,
}

impl<'a> ActivityIndex<'a> {
    pub fn new(snapshot: &'a Snapshot, config: &EngagementConfig) -> Self {
        Self::from_parts(
            &snapshot.issues,
            &snapshot.comments,
            &snapshot.pr_activities,
            config,
        )
    }

    pub fn from_parts(
        issues: &'a [Issue],
        comments: &'a [Comment],
        activities: &'a [PrActivity],
        config: &EngagementConfig,
    ) -> Self {
        let mut index = Self::default();

        for issue in issues.iter().filter(|issue| config.tracks(issue)) {
            if index.issues_by_id.contains_key(issue.id.as_str()) {
                debug!(issue = %issue.id, "duplicate issue ignored");
                continue;
            }
            index.issues_by_id.insert(&issue.id, issue);
            index.issues.push(issue);

            for pr in &issue.linked_prs {
                index.prs.entry(&pr.id).or_insert(pr);
                let linked = index.issues_by_pr.entry(&pr.id).or_default();
                if !linked.contains(&issue.id.as_str()) {
                    linked.push(&issue.id);
                }
            }
        }

        let mut seen = HashSet::new();
        for comment in comments {
            if !seen.insert(comment.id.as_str()) {
                continue;
            }
            if !index.issues_by_id.contains_key(comment.issue_id.as_str()) {
                debug!(comment = %comment.id, issue = %comment.issue_id, "comment on unknown issue dropped");
                continue;
            }
            let at = match parse_timestamp(&comment.id, &comment.created_at) {
                Ok(at) => at,
                Err(err) => {
                    warn!(%err, "skipping comment");
                    index.skipped += 1;
                    continue;
                }
            };

            let slot = index.comments.len();
            index.comments.push(DatedComment {
                comment,
                at,
                day: format_day(at.date_naive()),
            });
            index
                .comments_by_issue
                .entry(&comment.issue_id)
                .or_default()
                .push(slot);
            index
                .comments_by_author
                .entry(&comment.author)
                .or_default()
                .push(slot);
        }

        let mut seen = HashSet::new();
        for activity in activities {
            if !seen.insert(activity.id.as_str()) {
                continue;
            }
            let Some(linked_issues) = index.issues_by_pr.get(activity.pr_id.as_str()) else {
                debug!(activity = %activity.id, pr = %activity.pr_id, "activity on unlinked pull request dropped");
                continue;
            };
            let day = match day_key(&activity.id, &activity.created_at) {
                Ok(day) => day,
                Err(err) => {
                    warn!(%err, "skipping pull request activity");
                    index.skipped += 1;
                    continue;
                }
            };
            let prs = &index.prs;
            let role = classify(activity, |pr_id: &str| {
                prs.get(pr_id).map(|pr| pr.author.as_str())
            });

            let slot = index.activities.len();
            for issue_id in linked_issues {
                index
                    .activities_by_issue
                    .entry(*issue_id)
                    .or_default()
                    .push(slot);
            }
            index.activities.push(DatedActivity {
                activity,
                day,
                role,
            });
            index
                .activities_by_author
                .entry(&activity.author)
                .or_default()
                .push(slot);
        }

        debug!(
            issues = index.issues.len(),
            comments = index.comments.len(),
            activities = index.activities.len(),
            skipped = index.skipped,
            "indexed snapshot"
        );
        index
    }

    /// Tracked issues in snapshot order.
    pub fn issues(&self) -> impl Iterator<Item = &'a Issue> + '_ {
        self.issues.iter().copied()
    }

    pub fn issue(&self, issue_id: &str) -> Option<&'a Issue> {
        self.issues_by_id.get(issue_id).copied()
    }

    pub fn pull_request(&self, pr_id: &str) -> Option<&'a LinkedPr> {
        self.prs.get(pr_id).copied()
    }

    /// Issues that link the given pull request.
    pub fn issues_linked_to(&self, pr_id: &str) -> &[&'a str] {
        self.issues_by_pr
            .get(pr_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn comments_on(&self, issue_id: &str) -> impl Iterator<Item = &DatedComment<'a>> + '_ {
        Self::resolve(&self.comments, self.comments_by_issue.get(issue_id))
    }

    pub fn comments_by(&self, author: &str) -> impl Iterator<Item = &DatedComment<'a>> + '_ {
        Self::resolve(&self.comments, self.comments_by_author.get(author))
    }

    /// Activities on any pull request linked to the issue.
    pub fn activities_on(&self, issue_id: &str) -> impl Iterator<Item = &DatedActivity<'a>> + '_ {
        Self::resolve(&self.activities, self.activities_by_issue.get(issue_id))
    }

    pub fn activities_by(&self, author: &str) -> impl Iterator<Item = &DatedActivity<'a>> + '_ {
        Self::resolve(&self.activities, self.activities_by_author.get(author))
    }

    /// Records dropped because their timestamp could not be parsed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn resolve<'s, T>(
        records: &'s [T],
        slots: Option<&'s Vec<usize>>,
    ) -> impl Iterator<Item = &'s T> + 's {
        slots
            .into_iter()
            .flatten()
            .filter_map(move |&slot| records.get(slot))
    }
}
