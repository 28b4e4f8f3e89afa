use std::collections::HashMap;
use std::fmt::Write;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;

use crate::config::EngagementConfig;
use crate::models::{
    DayPullRequests, Issue, IssueTeamEffort, MemberIssueContribution, RepositorySummary,
    TeamMemberEngagement,
};
use crate::recompute::EngagementResults;

pub fn summarize_by_repository(efforts: &[IssueTeamEffort]) -> Vec<RepositorySummary> {
    let mut map: HashMap<&str, (usize, usize)> = HashMap::new();

    for effort in efforts {
        let entry = map.entry(effort.repository.as_str()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += effort.total_effort_days;
    }

    let mut summaries: Vec<RepositorySummary> = map
        .into_iter()
        .map(|(repository, (issue_count, effort_days))| RepositorySummary {
            repository: repository.to_string(),
            issue_count,
            effort_days,
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.effort_days
            .cmp(&a.effort_days)
            .then_with(|| a.repository.cmp(&b.repository))
    });
    summaries
}

pub fn build_report(
    config: &EngagementConfig,
    results: &EngagementResults,
    since: Option<NaiveDate>,
) -> String {
    let summaries = summarize_by_repository(&results.issue_effort);
    let mut output = String::new();

    let window = since.map_or_else(
        || "all recorded activity".to_string(),
        |cutoff| format!("activity since {cutoff}"),
    );

    let _ = writeln!(output, "# Team Engagement Report");
    let _ = writeln!(
        output,
        "Generated for {} team members ({})",
        config.roster().len(),
        window
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Repository Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No team activity recorded for this window.");
    } else {
        for summary in &summaries {
            let _ = writeln!(
                output,
                "- {}: {} issues, {} effort days",
                summary.repository, summary.issue_count, summary.effort_days
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Heaviest Issues");

    if results.issue_effort.is_empty() {
        let _ = writeln!(output, "No issues with team effort in this window.");
    } else {
        for effort in results.issue_effort.iter().take(config.report.top_issues) {
            let _ = writeln!(output, "- {}", effort_line(effort));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Member Workload");

    if results.members.is_empty() {
        let _ = writeln!(output, "No team members active in this window.");
    } else {
        for member in results.members.iter().take(config.report.top_members) {
            let _ = writeln!(output, "- {}", member_line(member));
        }
    }

    for member in results.members.iter().take(config.report.top_members) {
        let _ = writeln!(output);
        let _ = writeln!(output, "### {}", member.member);

        let mut issues: Vec<_> = member.issue_engagements.values().collect();
        issues.sort_by(|a, b| {
            let credit_a = a.comm_day_credits + a.dev_day_credits;
            let credit_b = b.comm_day_credits + b.dev_day_credits;
            credit_b
                .partial_cmp(&credit_a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.issue_id.cmp(&b.issue_id))
        });

        for engagement in issues {
            let _ = writeln!(
                output,
                "- {}#{} {}: {:.2} comment credits over {} days, {:.2} dev credits over {} days (author {}, reviewer {})",
                engagement.repository,
                engagement.issue_number,
                engagement.title,
                engagement.comm_day_credits,
                engagement.comm_days,
                engagement.dev_day_credits,
                engagement.dev_days,
                engagement.author_days,
                engagement.reviewer_days
            );
        }
    }

    output
}

pub fn effort_line(effort: &IssueTeamEffort) -> String {
    format!(
        "{}#{} {}: {} effort days (comments {}, authoring {}, reviews {}) by {}",
        effort.repository,
        effort.issue_number,
        effort.title,
        effort.total_effort_days,
        effort.commenter_days,
        effort.author_days,
        effort.reviewer_days,
        effort.contributors.join(", ")
    )
}

pub fn member_line(member: &TeamMemberEngagement) -> String {
    let mut line = format!(
        "{}: {} active days across {} issues (comments {}, development {}; author {}, reviewer {})",
        member.member,
        member.total_active_days,
        member.issue_engagements.len(),
        member.comm_days,
        member.dev_days,
        member.author_days,
        member.reviewer_days
    );

    if !member.top_aors.is_empty() {
        let areas: Vec<String> = member
            .top_aors
            .iter()
            .map(|aor| format!("{} ({} days)", aor.name, aor.days))
            .collect();
        let _ = write!(line, " areas: {}", areas.join(", "));
    }
    line
}

/// Markdown audit trail of who did what on one issue.
pub fn build_issue_report(issue: &Issue, contributions: &[MemberIssueContribution]) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "# {}#{} {}",
        issue.repository, issue.number, issue.title
    );
    if !issue.url.is_empty() {
        let _ = writeln!(output, "{}", issue.url);
    }

    if contributions.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "No team activity recorded on this issue.");
        return output;
    }

    for contribution in contributions {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "## {} ({} days: comments {}, authoring {}, reviews {})",
            contribution.member,
            contribution.total_days(),
            contribution.commenter_days,
            contribution.author_days,
            contribution.reviewer_days
        );

        for day in &contribution.comments {
            let _ = writeln!(output, "- {} commented {}", day.date, link_or_id(&day.url, &day.comment_id));
        }
        write_pull_request_days(&mut output, "authored", &contribution.authored);
        write_pull_request_days(&mut output, "reviewed", &contribution.reviewed);
    }

    output
}

fn write_pull_request_days(output: &mut String, verb: &str, days: &[DayPullRequests]) {
    for day in days {
        let links: Vec<String> = day
            .pull_requests
            .iter()
            .map(|pr| format!("[#{}]({})", pr.number, pr.url))
            .collect();
        let _ = writeln!(output, "- {} {} {}", day.date, verb, links.join(", "));
    }
}

fn link_or_id(url: &str, id: &str) -> String {
    if url.is_empty() {
        id.to_string()
    } else {
        format!("[{id}]({url})")
    }
}

#[derive(Serialize)]
struct EffortRow<'a> {
    repository: &'a str,
    number: u64,
    title: &'a str,
    url: &'a str,
    commenter_days: usize,
    author_days: usize,
    reviewer_days: usize,
    total_effort_days: usize,
    contributors: String,
}

#[derive(Serialize)]
struct MemberRow<'a> {
    member: &'a str,
    total_active_days: usize,
    comm_days: usize,
    dev_days: usize,
    author_days: usize,
    reviewer_days: usize,
    issues: usize,
    top_aors: String,
}

pub fn write_effort_csv(path: &Path, efforts: &[IssueTeamEffort]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for effort in efforts {
        writer.serialize(EffortRow {
            repository: &effort.repository,
            number: effort.issue_number,
            title: &effort.title,
            url: &effort.url,
            commenter_days: effort.commenter_days,
            author_days: effort.author_days,
            reviewer_days: effort.reviewer_days,
            total_effort_days: effort.total_effort_days,
            contributors: effort.contributors.join(";"),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_member_csv(path: &Path, members: &[TeamMemberEngagement]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for member in members {
        let top_aors: Vec<&str> = member.top_aors.iter().map(|aor| aor.name.as_str()).collect();
        writer.serialize(MemberRow {
            member: &member.member,
            total_active_days: member.total_active_days,
            comm_days: member.comm_days,
            dev_days: member.dev_days,
            author_days: member.author_days,
            reviewer_days: member.reviewer_days,
            issues: member.issue_engagements.len(),
            top_aors: top_aors.join(";"),
        })?;
    }
    writer.flush()?;
    Ok(())
}
