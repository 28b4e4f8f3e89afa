//! Per-member engagement: what one contributor did on each issue and across
//! all of them.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::config::EngagementConfig;
use crate::index::ActivityIndex;
use crate::models::{AorMatch, DailyActivity, Issue, IssueEngagement, TeamMemberEngagement};
use crate::role::Role;

const TOP_AORS: usize = 3;

/// Which issues a member touched on each day, per channel.
///
/// This is the member's global history; the context-switch credit for any one
/// issue depends on everything else the member did that day.
#[derive(Debug, Default)]
pub struct MemberHistory<'i> {
    comment_issues: HashMap<&'i str, HashSet<&'i str>>,
    dev_issues: HashMap<&'i str, HashSet<&'i str>>,
    author_days: HashSet<&'i str>,
    reviewer_days: HashSet<&'i str>,
}

impl<'i> MemberHistory<'i> {
    pub fn collect(index: &'i ActivityIndex<'_>, member: &str) -> Self {
        let mut history = Self::default();

        for dated in index.comments_by(member) {
            history
                .comment_issues
                .entry(dated.day.as_str())
                .or_default()
                .insert(dated.comment.issue_id.as_str());
        }

        for dated in index.activities_by(member) {
            let day = dated.day.as_str();
            let issues = history.dev_issues.entry(day).or_default();
            issues.extend(index.issues_linked_to(&dated.activity.pr_id).iter().copied());

            match dated.role {
                Role::Author => {
                    history.author_days.insert(day);
                }
                Role::Reviewer => {
                    history.reviewer_days.insert(day);
                }
                Role::Unclassified => {}
            }
        }

        history
    }

    pub fn is_empty(&self) -> bool {
        self.comment_issues.is_empty() && self.dev_issues.is_empty()
    }

    /// Every issue the member touched through either channel.
    pub fn issues(&self) -> BTreeSet<&'i str> {
        self.comment_issues
            .values()
            .chain(self.dev_issues.values())
            .flatten()
            .copied()
            .collect()
    }

    /// Share of a comment day owed to each issue commented on that day.
    pub fn comment_share(&self, day: &str) -> f64 {
        share(self.comment_issues.get(day))
    }

    /// Share of a development day owed to each issue worked on that day.
    pub fn dev_share(&self, day: &str) -> f64 {
        share(self.dev_issues.get(day))
    }
}

fn share(issues: Option<&HashSet<&str>>) -> f64 {
    match issues.map(HashSet::len) {
        Some(n) if n > 0 => 1.0 / n as f64,
        _ => 0.0,
    }
}

#[derive(Default)]
struct DayTally {
    comments: usize,
    pr_activities: usize,
    author: usize,
    review: usize,
}

/// Engagement of `member` on a single issue.
///
/// Returns `None` when the member neither commented on the issue nor acted on
/// a pull request linked to it.
pub fn issue_engagement(
    index: &ActivityIndex<'_>,
    history: &MemberHistory<'_>,
    member: &str,
    issue: &Issue,
) -> Option<IssueEngagement> {
    let mut tallies: BTreeMap<&str, DayTally> = BTreeMap::new();
    let mut comm_days = BTreeSet::new();
    let mut dev_days = BTreeSet::new();
    let mut author_days = BTreeSet::new();
    let mut reviewer_days = BTreeSet::new();
    let mut total_comments = 0;
    let mut total_pr_activities = 0;
    let mut total_author_activities = 0;
    let mut total_review_activities = 0;

    for dated in index
        .comments_on(&issue.id)
        .filter(|dated| dated.comment.author == member)
    {
        let day = dated.day.as_str();
        comm_days.insert(day);
        tallies.entry(day).or_default().comments += 1;
        total_comments += 1;
    }

    for dated in index
        .activities_on(&issue.id)
        .filter(|dated| dated.activity.author == member)
    {
        let day = dated.day.as_str();
        let tally = tallies.entry(day).or_default();
        dev_days.insert(day);
        tally.pr_activities += 1;
        total_pr_activities += 1;

        match dated.role {
            Role::Author => {
                author_days.insert(day);
                tally.author += 1;
                total_author_activities += 1;
            }
            Role::Reviewer => {
                reviewer_days.insert(day);
                tally.review += 1;
                total_review_activities += 1;
            }
            Role::Unclassified => {}
        }
    }

    if tallies.is_empty() {
        return None;
    }

    let comm_day_credits: f64 = comm_days.iter().map(|day| history.comment_share(day)).sum();
    let dev_day_credits: f64 = dev_days.iter().map(|day| history.dev_share(day)).sum();

    let activity_details = tallies
        .into_iter()
        .rev()
        .map(|(date, tally)| DailyActivity {
            date: date.to_string(),
            comment_count: tally.comments,
            pr_activity_count: tally.pr_activities,
            author_activity_count: tally.author,
            review_activity_count: tally.review,
        })
        .collect();

    Some(IssueEngagement {
        issue_id: issue.id.clone(),
        issue_number: issue.number,
        repository: issue.repository.clone(),
        title: issue.title.clone(),
        comm_days: comm_days.len(),
        dev_days: dev_days.len(),
        author_days: author_days.len(),
        reviewer_days: reviewer_days.len(),
        comm_day_credits,
        dev_day_credits,
        activity_details,
        total_comments,
        total_pr_activities,
        total_author_activities,
        total_review_activities,
    })
}

/// Member-wide engagement across every issue the member touched.
///
/// Returns `None` for a member with no activity on any tracked issue.
pub fn member_engagement(
    index: &ActivityIndex<'_>,
    member: &str,
    config: &EngagementConfig,
) -> Option<TeamMemberEngagement> {
    let history = MemberHistory::collect(index, member);
    if history.is_empty() {
        return None;
    }

    let issue_engagements: BTreeMap<String, IssueEngagement> = history
        .issues()
        .into_iter()
        .filter_map(|issue_id| index.issue(issue_id))
        .filter_map(|issue| {
            issue_engagement(index, &history, member, issue)
                .map(|engagement| (issue.id.clone(), engagement))
        })
        .collect();

    let comm_days: BTreeSet<&str> = history.comment_issues.keys().copied().collect();
    let dev_days: BTreeSet<&str> = history.dev_issues.keys().copied().collect();
    let total_active_days = comm_days.union(&dev_days).count();

    let top_aors = rank_aors(index, config, &issue_engagements);

    Some(TeamMemberEngagement {
        member: member.to_string(),
        comm_days: comm_days.len(),
        dev_days: dev_days.len(),
        author_days: history.author_days.len(),
        reviewer_days: history.reviewer_days.len(),
        total_active_days,
        comm_day_credits: comm_days.len() as f64,
        dev_day_credits: dev_days.len() as f64,
        top_aors,
        issue_engagements,
    })
}

/// Engagement for every roster member with any activity, busiest first.
pub fn team_engagement(
    index: &ActivityIndex<'_>,
    config: &EngagementConfig,
) -> Vec<TeamMemberEngagement> {
    let mut members: Vec<TeamMemberEngagement> = config
        .roster()
        .into_iter()
        .filter_map(|member| member_engagement(index, member, config))
        .collect();

    members.sort_by(|a, b| {
        b.total_active_days
            .cmp(&a.total_active_days)
            .then_with(|| a.member.cmp(&b.member))
    });
    members
}

/// Rank areas of responsibility by distinct active days on matching issues.
///
/// Ties keep the order the areas are configured in.
fn rank_aors(
    index: &ActivityIndex<'_>,
    config: &EngagementConfig,
    engagements: &BTreeMap<String, IssueEngagement>,
) -> Vec<AorMatch> {
    let mut ranked: Vec<AorMatch> = config
        .aors
        .iter()
        .map(|aor| {
            let days: HashSet<&str> = engagements
                .iter()
                .filter(|(issue_id, _)| {
                    index
                        .issue(issue_id)
                        .is_some_and(|issue| aor.matches(issue))
                })
                .flat_map(|(_, engagement)| {
                    engagement
                        .activity_details
                        .iter()
                        .map(|detail| detail.date.as_str())
                })
                .collect();

            AorMatch {
                aor_id: aor.id.clone(),
                name: aor.name.clone(),
                days: days.len(),
            }
        })
        .filter(|aor| aor.days > 0)
        .collect();

    ranked.sort_by(|a, b| b.days.cmp(&a.days));
    ranked.truncate(TOP_AORS);
    ranked
}
