use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::EngagementError;
use crate::models::{AreaOfResponsibility, Issue};

/// Everything the aggregators need beyond the snapshot itself.
///
/// Passed explicitly into every computation; nothing is read from ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementConfig {
    #[serde(default)]
    pub team: Vec<String>,
    #[serde(default)]
    pub aors: Vec<AreaOfResponsibility>,
    /// Tracked repositories. Empty tracks every repository in the snapshot.
    #[serde(default)]
    pub repositories: Vec<String>,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_top_members")]
    pub top_members: usize,
    #[serde(default = "default_top_issues")]
    pub top_issues: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_members: default_top_members(),
            top_issues: default_top_issues(),
        }
    }
}

const fn default_top_members() -> usize {
    10
}

const fn default_top_issues() -> usize {
    10
}

impl EngagementConfig {
    pub fn new(team: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            team: team.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_aors(mut self, aors: Vec<AreaOfResponsibility>) -> Self {
        self.aors = aors;
        self
    }

    /// Roster in sorted order with duplicates removed.
    pub fn roster(&self) -> BTreeSet<&str> {
        self.team.iter().map(String::as_str).collect()
    }

    pub fn is_member(&self, author: &str) -> bool {
        self.team.iter().any(|member| member == author)
    }

    pub fn tracks(&self, issue: &Issue) -> bool {
        self.repositories.is_empty()
            || self
                .repositories
                .iter()
                .any(|repository| repository == &issue.repository)
    }
}

pub fn parse_config(path: &Path, contents: &str) -> Result<EngagementConfig, EngagementError> {
    toml::from_str(contents).map_err(|err| EngagementError::Config {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

pub fn load_config(path: &Path) -> Result<EngagementConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = parse_config(path, &contents)?;
    tracing::debug!(
        members = config.team.len(),
        aors = config.aors.len(),
        repositories = config.repositories.len(),
        "loaded config"
    );
    Ok(config)
}
