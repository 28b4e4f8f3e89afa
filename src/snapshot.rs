use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::day::utc_date;
use crate::error::EngagementError;
use crate::models::{Comment, Issue, PrActivity};

/// The three input collections the engine recomputes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub pr_activities: Vec<PrActivity>,
}

impl Snapshot {
    /// Copy of the snapshot keeping only records on or after `cutoff` (UTC day).
    ///
    /// Issues are kept as-is. Records whose timestamp cannot be parsed are
    /// dropped.
    pub fn since(&self, cutoff: NaiveDate) -> Snapshot {
        let keep = |record: &str, timestamp: &str| match utc_date(timestamp) {
            Some(date) => date >= cutoff,
            None => {
                warn!(record, timestamp, "dropping record with unparseable timestamp");
                false
            }
        };

        Snapshot {
            issues: self.issues.clone(),
            comments: self
                .comments
                .iter()
                .filter(|comment| keep(&comment.id, &comment.created_at))
                .cloned()
                .collect(),
            pr_activities: self
                .pr_activities
                .iter()
                .filter(|activity| keep(&activity.id, &activity.created_at))
                .cloned()
                .collect(),
        }
    }

    /// Append comments whose id is not already present. Returns how many were added.
    pub fn merge_comments(&mut self, comments: impl IntoIterator<Item = Comment>) -> usize {
        let mut known: HashSet<String> = self.comments.iter().map(|c| c.id.clone()).collect();
        let before = self.comments.len();
        for comment in comments {
            if known.insert(comment.id.clone()) {
                self.comments.push(comment);
            }
        }
        self.comments.len() - before
    }

    /// Append PR activities whose id is not already present. Returns how many were added.
    pub fn merge_pr_activities(&mut self, activities: impl IntoIterator<Item = PrActivity>) -> usize {
        let mut known: HashSet<String> = self.pr_activities.iter().map(|a| a.id.clone()).collect();
        let before = self.pr_activities.len();
        for activity in activities {
            if known.insert(activity.id.clone()) {
                self.pr_activities.push(activity);
            }
        }
        self.pr_activities.len() - before
    }
}

pub fn parse_snapshot(path: &Path, contents: &str) -> Result<Snapshot, EngagementError> {
    serde_json::from_str(contents).map_err(|err| EngagementError::Snapshot {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

pub fn load_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let snapshot = parse_snapshot(path, &contents)?;
    tracing::debug!(
        issues = snapshot.issues.len(),
        comments = snapshot.comments.len(),
        pr_activities = snapshot.pr_activities.len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    Ok(())
}

/// Read `id,issueId,author,body,createdAt` rows.
pub fn read_comments_csv(csv_path: &Path) -> anyhow::Result<Vec<Comment>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut comments = Vec::new();
    for row in reader.deserialize::<Comment>() {
        comments.push(row.with_context(|| format!("bad comment row in {}", csv_path.display()))?);
    }
    Ok(comments)
}

/// Read `id,prId,type,author,createdAt` rows.
pub fn read_pr_activities_csv(csv_path: &Path) -> anyhow::Result<Vec<PrActivity>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut activities = Vec::new();
    for row in reader.deserialize::<PrActivity>() {
        activities
            .push(row.with_context(|| format!("bad PR activity row in {}", csv_path.display()))?);
    }
    Ok(activities)
}
