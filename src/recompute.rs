use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EngagementConfig;
use crate::effort::team_issue_effort;
use crate::engagement::team_engagement;
use crate::index::ActivityIndex;
use crate::models::{IssueTeamEffort, TeamMemberEngagement};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementResults {
    pub members: Vec<TeamMemberEngagement>,
    pub issue_effort: Vec<IssueTeamEffort>,
}

/// Full team view computed from scratch.
pub fn recompute(snapshot: &Snapshot, config: &EngagementConfig) -> EngagementResults {
    let index = ActivityIndex::new(snapshot, config);
    let results = EngagementResults {
        members: team_engagement(&index, config),
        issue_effort: team_issue_effort(&index, config),
    };
    info!(
        members = results.members.len(),
        issues = results.issue_effort.len(),
        skipped = index.skipped(),
        "recomputed engagement"
    );
    results
}

/// Remembers the last result and the content hash it was computed from.
///
/// Any change to the snapshot or config produces a new hash and a complete
/// recomputation.
#[derive(Debug, Default)]
pub struct EngagementCache {
    last: Option<(blake3::Hash, EngagementResults)>,
}

impl EngagementCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_recompute(
        &mut self,
        snapshot: &Snapshot,
        config: &EngagementConfig,
    ) -> anyhow::Result<&EngagementResults> {
        let key = content_hash(snapshot, config)?;

        let cached = matches!(&self.last, Some((hash, _)) if *hash == key);
        if cached {
            info!(hash = %key, "engagement served from cache");
        } else {
            let results = recompute(snapshot, config);
            self.last = Some((key, results));
        }

        self.last
            .as_ref()
            .map(|(_, results)| results)
            .ok_or_else(|| anyhow::anyhow!("engagement cache is empty after recompute"))
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

fn content_hash(snapshot: &Snapshot, config: &EngagementConfig) -> anyhow::Result<blake3::Hash> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&serde_json::to_vec(snapshot)?);
    hasher.update(&serde_json::to_vec(config)?);
    Ok(hasher.finalize())
}
