use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub issue_id: String,
    pub author: String,
    #[serde(default)]
    pub body: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrActivityKind {
    Commit,
    Review,
    ReviewComment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrActivity {
    pub id: String,
    pub pr_id: String,
    #[serde(rename = "type")]
    pub kind: PrActivityKind,
    pub author: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Snapshot of a linked pull request's identity, taken when the link was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedPr {
    pub id: String,
    pub number: u64,
    pub author: String,
    pub url: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub number: u64,
    pub repository: String,
    pub title: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default, rename = "linkedPRs")]
    pub linked_prs: Vec<LinkedPr>,
}

/// Named keyword set used to attribute issue engagement to a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaOfResponsibility {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub terms: Vec<String>,
}

impl AreaOfResponsibility {
    /// True when any term is a case-insensitive substring of the title or a label.
    pub fn matches(&self, issue: &Issue) -> bool {
        let title = issue.title.to_lowercase();
        let labels: Vec<String> = issue
            .labels
            .iter()
            .map(|label| label.name.to_lowercase())
            .collect();

        self.terms
            .iter()
            .map(|term| term.to_lowercase())
            .filter(|term| !term.is_empty())
            .any(|term| title.contains(&term) || labels.iter().any(|label| label.contains(&term)))
    }
}

/// Raw per-day tallies for one member on one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub date: String,
    pub comment_count: usize,
    pub pr_activity_count: usize,
    pub author_activity_count: usize,
    pub review_activity_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueEngagement {
    pub issue_id: String,
    pub issue_number: u64,
    pub repository: String,
    pub title: String,
    pub comm_days: usize,
    pub dev_days: usize,
    pub author_days: usize,
    pub reviewer_days: usize,
    pub comm_day_credits: f64,
    pub dev_day_credits: f64,
    pub activity_details: Vec<DailyActivity>,
    pub total_comments: usize,
    pub total_pr_activities: usize,
    pub total_author_activities: usize,
    pub total_review_activities: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AorMatch {
    pub aor_id: String,
    pub name: String,
    pub days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberEngagement {
    pub member: String,
    pub comm_days: usize,
    pub dev_days: usize,
    pub author_days: usize,
    pub reviewer_days: usize,
    pub total_active_days: usize,
    pub comm_day_credits: f64,
    pub dev_day_credits: f64,
    pub top_aors: Vec<AorMatch>,
    pub issue_engagements: BTreeMap<String, IssueEngagement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTeamEffort {
    pub issue_id: String,
    pub issue_number: u64,
    pub repository: String,
    pub title: String,
    pub url: String,
    pub commenter_days: usize,
    pub author_days: usize,
    pub reviewer_days: usize,
    pub total_effort_days: usize,
    pub contributors: Vec<String>,
}

/// Team effort rolled up per repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySummary {
    pub repository: String,
    pub issue_count: usize,
    pub effort_days: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrLink {
    pub number: u64,
    pub url: String,
}

/// The latest comment a member left on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayComment {
    pub date: String,
    pub comment_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPullRequests {
    pub date: String,
    pub pull_requests: Vec<PrLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberIssueContribution {
    pub member: String,
    pub commenter_days: usize,
    pub author_days: usize,
    pub reviewer_days: usize,
    pub comments: Vec<DayComment>,
    pub authored: Vec<DayPullRequests>,
    pub reviewed: Vec<DayPullRequests>,
}

impl MemberIssueContribution {
    pub fn total_days(&self) -> usize {
        self.commenter_days + self.author_days + self.reviewer_days
    }
}
