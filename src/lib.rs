//! Attribution of collaboration events (issue comments, pull-request commits,
//! reviews and review comments) to team members and issues.
//!
//! Everything here is a pure batch transform over a [`Snapshot`]: build an
//! [`ActivityIndex`], then run the per-member, per-issue or team aggregators
//! over it, or call [`recompute`] for the full team view.
//!
//! # Conventions
//!
//! - **Errors**: [`EngagementError`] for engine failures, `anyhow::Result` for file I/O.
//! - **Logging**: `tracing` macros; records that cannot be dated are skipped with a warning.

pub mod config;
pub mod contribution;
pub mod day;
pub mod effort;
pub mod engagement;
pub mod error;
pub mod index;
pub mod models;
pub mod recompute;
pub mod report;
pub mod role;
pub mod snapshot;

pub use config::{load_config, EngagementConfig, ReportConfig};
pub use contribution::member_issue_contributions;
pub use day::day_key;
pub use effort::{issue_team_effort, team_issue_effort};
pub use engagement::{issue_engagement, member_engagement, team_engagement, MemberHistory};
pub use error::EngagementError;
pub use index::ActivityIndex;
pub use models::{
    AreaOfResponsibility, Comment, Issue, IssueEngagement, IssueTeamEffort,
    MemberIssueContribution, PrActivity, PrActivityKind, TeamMemberEngagement,
};
pub use recompute::{recompute, EngagementCache, EngagementResults};
pub use role::{classify, Role};
pub use snapshot::{load_snapshot, Snapshot};
