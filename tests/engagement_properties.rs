//! End-to-end checks of the attribution rules: context-switch credits,
//! day unions, role exclusivity and team effort counting.

use std::collections::BTreeSet;

use proptest::prelude::*;
use team_engagement::models::{Label, LinkedPr};
use team_engagement::{
    day_key, member_engagement, member_issue_contributions, recompute, team_issue_effort, ActivityIndex,
    AreaOfResponsibility, Comment, EngagementConfig, Issue, PrActivity, PrActivityKind, Snapshot,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn issue(id: &str, number: u64, prs: &[(&str, u64, &str)]) -> Issue {
    Issue {
        id: id.to_string(),
        number,
        repository: "acme/api".to_string(),
        title: format!("Issue {number}"),
        state: "open".to_string(),
        url: format!("https://github.com/acme/api/issues/{number}"),
        labels: vec![Label {
            name: "bug".to_string(),
        }],
        linked_prs: prs
            .iter()
            .map(|(pr_id, pr_number, author)| LinkedPr {
                id: pr_id.to_string(),
                number: *pr_number,
                author: author.to_string(),
                url: format!("https://github.com/acme/api/pull/{pr_number}"),
                state: Some("open".to_string()),
            })
            .collect(),
    }
}

fn comment(id: &str, issue_id: &str, author: &str, created_at: &str) -> Comment {
    Comment {
        id: id.to_string(),
        issue_id: issue_id.to_string(),
        author: author.to_string(),
        body: "note".to_string(),
        created_at: created_at.to_string(),
    }
}

fn activity(
    id: &str,
    pr_id: &str,
    kind: PrActivityKind,
    author: &str,
    created_at: &str,
) -> PrActivity {
    PrActivity {
        id: id.to_string(),
        pr_id: pr_id.to_string(),
        kind,
        author: author.to_string(),
        created_at: created_at.to_string(),
    }
}

fn assert_approx_eq(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

/// Two issues commented on the same day share that day's credit.
#[test]
fn comment_day_split_between_two_issues() {
    let snapshot = Snapshot {
        issues: vec![issue("I1", 1, &[]), issue("I2", 2, &[])],
        comments: vec![
            comment("c1", "I1", "alice", "2024-01-01T08:00:00Z"),
            comment("c2", "I2", "alice", "2024-01-01T20:00:00Z"),
        ],
        pr_activities: Vec::new(),
    };
    let config = EngagementConfig::new(["alice"]);
    let index = ActivityIndex::new(&snapshot, &config);

    let alice = member_engagement(&index, "alice", &config).expect("alice is active");

    assert_approx_eq(alice.issue_engagements["I1"].comm_day_credits, 0.5);
    assert_approx_eq(alice.issue_engagements["I2"].comm_day_credits, 0.5);
    assert_eq!(alice.total_active_days, 1);
}

/// Author commits, foreign reviews and self-reviews on the same PR.
#[test]
fn author_and_reviewer_days_follow_pr_authorship() {
    let snapshot = Snapshot {
        issues: vec![issue("I5", 5, &[("P10", 10, "bob")])],
        comments: Vec::new(),
        pr_activities: vec![
            activity("a1", "P10", PrActivityKind::Commit, "bob", "2024-02-02T09:00:00Z"),
            activity("a2", "P10", PrActivityKind::Review, "carol", "2024-02-02T11:00:00Z"),
            activity("a3", "P10", PrActivityKind::Review, "bob", "2024-02-03T11:00:00Z"),
        ],
    };
    let config = EngagementConfig::new(["bob", "carol"]);
    let index = ActivityIndex::new(&snapshot, &config);

    let bob = member_engagement(&index, "bob", &config).expect("bob is active");
    let carol = member_engagement(&index, "carol", &config).expect("carol is active");

    assert_eq!(bob.issue_engagements["I5"].author_days, 1);
    assert_eq!(bob.issue_engagements["I5"].reviewer_days, 0);
    assert_eq!(bob.issue_engagements["I5"].dev_days, 2);
    assert_eq!(carol.issue_engagements["I5"].reviewer_days, 1);
}

/// Only unclassified activity: development days but no role days.
#[test]
fn non_author_commit_is_development_without_role() {
    let snapshot = Snapshot {
        issues: vec![issue("I7", 7, &[("P20", 20, "bob")])],
        comments: Vec::new(),
        pr_activities: vec![activity(
            "a1",
            "P20",
            PrActivityKind::Commit,
            "dave",
            "2024-03-01T09:00:00Z",
        )],
    };
    let config = EngagementConfig::new(["dave"]);
    let index = ActivityIndex::new(&snapshot, &config);

    let dave = member_engagement(&index, "dave", &config).expect("dave is active");
    let on_issue = &dave.issue_engagements["I7"];

    assert!(on_issue.dev_days > 0);
    assert_eq!(on_issue.author_days, 0);
    assert_eq!(on_issue.reviewer_days, 0);
    assert_eq!(on_issue.total_pr_activities, 1);
    assert!(team_issue_effort(&index, &config).is_empty());
}

#[test]
fn comment_and_commit_on_the_same_day_is_one_active_day() {
    let snapshot = Snapshot {
        issues: vec![issue("I1", 1, &[("P1", 1, "bob")])],
        comments: vec![comment("c1", "I1", "bob", "2024-01-01T08:00:00Z")],
        pr_activities: vec![activity(
            "a1",
            "P1",
            PrActivityKind::Commit,
            "bob",
            "2024-01-01T09:00:00Z",
        )],
    };
    let config = EngagementConfig::new(["bob"]);
    let index = ActivityIndex::new(&snapshot, &config);

    let bob = member_engagement(&index, "bob", &config).expect("bob is active");

    assert_eq!(bob.comm_days, 1);
    assert_eq!(bob.dev_days, 1);
    assert_eq!(bob.total_active_days, 1);
}

#[test]
fn malformed_timestamps_are_skipped_not_fatal() {
    let snapshot = Snapshot {
        issues: vec![issue("I1", 1, &[])],
        comments: vec![
            comment("c1", "I1", "alice", "2024-01-01T08:00:00Z"),
            comment("c2", "I1", "alice", "last tuesday"),
        ],
        pr_activities: Vec::new(),
    };
    let config = EngagementConfig::new(["alice"]);

    let results = recompute(&snapshot, &config);

    assert_eq!(results.members.len(), 1);
    assert_eq!(results.members[0].issue_engagements["I1"].total_comments, 1);
}

#[test]
fn aor_ranking_reaches_the_full_pipeline() {
    let mut docs_issue = issue("I2", 2, &[]);
    docs_issue.title = "Update install docs".to_string();
    docs_issue.labels.clear();
    let snapshot = Snapshot {
        issues: vec![issue("I1", 1, &[]), docs_issue],
        comments: vec![
            comment("c1", "I1", "alice", "2024-01-01T08:00:00Z"),
            comment("c2", "I1", "alice", "2024-01-02T08:00:00Z"),
            comment("c3", "I2", "alice", "2024-01-03T08:00:00Z"),
        ],
        pr_activities: Vec::new(),
    };
    let config = EngagementConfig::new(["alice"]).with_aors(vec![
        AreaOfResponsibility {
            id: "docs".to_string(),
            name: "Documentation".to_string(),
            terms: vec!["Docs".to_string()],
        },
        AreaOfResponsibility {
            id: "bugs".to_string(),
            name: "Bugs".to_string(),
            terms: vec!["BUG".to_string()],
        },
    ]);

    let results = recompute(&snapshot, &config);
    let aors: Vec<(&str, usize)> = results.members[0]
        .top_aors
        .iter()
        .map(|aor| (aor.aor_id.as_str(), aor.days))
        .collect();

    assert_eq!(aors, vec![("bugs", 2), ("docs", 1)]);
}

#[test]
fn contributions_cover_every_channel_for_an_issue() {
    let snapshot = Snapshot {
        issues: vec![issue("I5", 5, &[("P10", 10, "bob"), ("P11", 11, "bob")])],
        comments: vec![
            comment("c1", "I5", "carol", "2024-02-02T08:00:00Z"),
            comment("c2", "I5", "carol", "2024-02-02T18:30:00Z"),
        ],
        pr_activities: vec![
            activity("a1", "P11", PrActivityKind::Commit, "bob", "2024-02-02T09:00:00Z"),
            activity("a2", "P10", PrActivityKind::Commit, "bob", "2024-02-02T10:00:00Z"),
            activity("a3", "P10", PrActivityKind::ReviewComment, "carol", "2024-02-02T11:00:00Z"),
        ],
    };
    let config = EngagementConfig::new(["bob", "carol"]);
    let index = ActivityIndex::new(&snapshot, &config);

    let contributions = member_issue_contributions(&index, &config, "I5");

    assert_eq!(contributions.len(), 2);
    let carol = contributions
        .iter()
        .find(|c| c.member == "carol")
        .expect("carol contributed");
    assert_eq!(carol.commenter_days, 1);
    assert_eq!(carol.comments[0].comment_id, "c2");
    assert_eq!(carol.reviewer_days, 1);

    let bob = contributions
        .iter()
        .find(|c| c.member == "bob")
        .expect("bob contributed");
    let numbers: Vec<u64> = bob.authored[0]
        .pull_requests
        .iter()
        .map(|pr| pr.number)
        .collect();
    assert_eq!(numbers, vec![10, 11]);
}

#[test]
fn empty_inputs_degrade_to_empty_results() {
    let results = recompute(&Snapshot::default(), &EngagementConfig::default());
    assert!(results.members.is_empty());
    assert!(results.issue_effort.is_empty());
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

const MEMBERS: [&str; 3] = ["alice", "bob", "carol"];
const ISSUE_COUNT: usize = 4;

fn fixture_issues() -> Vec<Issue> {
    (0..ISSUE_COUNT)
        .map(|n| {
            let id = format!("I{n}");
            let pr_id = format!("P{n}");
            issue(&id, n as u64, &[(pr_id.as_str(), 100 + n as u64, MEMBERS[n % 3])])
        })
        .collect()
}

fn kind_strategy() -> impl Strategy<Value = PrActivityKind> {
    prop_oneof![
        Just(PrActivityKind::Commit),
        Just(PrActivityKind::Review),
        Just(PrActivityKind::ReviewComment),
    ]
}

fn snapshot_strategy() -> impl Strategy<Value = Snapshot> {
    let comments = prop::collection::vec((0..ISSUE_COUNT, 0..3usize, 0..5u32, 0..24u32), 0..25);
    let activities = prop::collection::vec(
        (0..ISSUE_COUNT, 0..3usize, 0..5u32, 0..24u32, kind_strategy()),
        0..25,
    );

    (comments, activities).prop_map(|(comments, activities)| Snapshot {
        issues: fixture_issues(),
        comments: comments
            .into_iter()
            .enumerate()
            .map(|(n, (issue, member, day, hour))| {
                comment(
                    &format!("c{n}"),
                    &format!("I{issue}"),
                    MEMBERS[member],
                    &format!("2024-05-{:02}T{hour:02}:15:00Z", day + 1),
                )
            })
            .collect(),
        pr_activities: activities
            .into_iter()
            .enumerate()
            .map(|(n, (pr, member, day, hour, kind))| {
                activity(
                    &format!("a{n}"),
                    &format!("P{pr}"),
                    kind,
                    MEMBERS[member],
                    &format!("2024-05-{:02}T{hour:02}:45:00Z", day + 1),
                )
            })
            .collect(),
    })
}

proptest! {
    /// Summed across issues, a member's per-issue credits equal one per active day.
    #[test]
    fn credits_are_conserved(snapshot in snapshot_strategy()) {
        let config = EngagementConfig::new(MEMBERS);
        let results = recompute(&snapshot, &config);

        for member in &results.members {
            let comm: f64 = member.issue_engagements.values().map(|e| e.comm_day_credits).sum();
            let dev: f64 = member.issue_engagements.values().map(|e| e.dev_day_credits).sum();
            prop_assert!((comm - member.comm_day_credits).abs() < 1e-9);
            prop_assert!((dev - member.dev_day_credits).abs() < 1e-9);
        }
    }

    #[test]
    fn active_days_are_a_union(snapshot in snapshot_strategy()) {
        let config = EngagementConfig::new(MEMBERS);
        for member in recompute(&snapshot, &config).members {
            let comm: BTreeSet<String> = snapshot
                .comments
                .iter()
                .filter(|c| c.author == member.member)
                .map(|c| day_key(&c.id, &c.created_at).unwrap())
                .collect();
            let dev: BTreeSet<String> = snapshot
                .pr_activities
                .iter()
                .filter(|a| a.author == member.member)
                .map(|a| day_key(&a.id, &a.created_at).unwrap())
                .collect();

            prop_assert_eq!(member.comm_days, comm.len());
            prop_assert_eq!(member.dev_days, dev.len());
            prop_assert_eq!(member.total_active_days, comm.union(&dev).count());
        }
    }

    #[test]
    fn role_days_never_exceed_dev_days(snapshot in snapshot_strategy()) {
        let config = EngagementConfig::new(MEMBERS);
        for member in recompute(&snapshot, &config).members {
            for engagement in member.issue_engagements.values() {
                prop_assert!(engagement.author_days + engagement.reviewer_days <= engagement.dev_days);
            }
        }
    }

    #[test]
    fn team_effort_sums_channels_and_skips_idle_issues(snapshot in snapshot_strategy()) {
        let config = EngagementConfig::new(MEMBERS);
        for effort in recompute(&snapshot, &config).issue_effort {
            prop_assert!(effort.total_effort_days > 0);
            prop_assert_eq!(
                effort.total_effort_days,
                effort.commenter_days + effort.author_days + effort.reviewer_days
            );
        }
    }

    #[test]
    fn recomputation_is_deterministic(snapshot in snapshot_strategy()) {
        let config = EngagementConfig::new(MEMBERS);
        let mut reversed = snapshot.clone();
        reversed.comments.reverse();
        reversed.pr_activities.reverse();

        let first = recompute(&snapshot, &config);
        prop_assert_eq!(&first, &recompute(&snapshot, &config));

        // Input order must not change any grouped result.
        let shuffled = recompute(&reversed, &config);
        prop_assert_eq!(first.issue_effort, shuffled.issue_effort);
        prop_assert_eq!(first.members.len(), shuffled.members.len());
        for (a, b) in first.members.iter().zip(&shuffled.members) {
            prop_assert_eq!(a.total_active_days, b.total_active_days);
            prop_assert_eq!(&a.top_aors, &b.top_aors);
        }
    }
}

/// Credits on one day across k issues add back up to exactly one day.
#[test]
fn credit_conservation_for_k_issues() {
    for k in 1..=7 {
        let issues: Vec<Issue> = (0..k).map(|n| issue(&format!("I{n}"), n, &[])).collect();
        let comments: Vec<Comment> = (0..k)
            .map(|n| comment(&format!("c{n}"), &format!("I{n}"), "alice", "2024-06-01T12:00:00Z"))
            .collect();
        let config = EngagementConfig::new(["alice"]);
        let index = ActivityIndex::from_parts(&issues, &comments, &[], &config);

        let alice = member_engagement(&index, "alice", &config).expect("alice is active");
        let total: f64 = alice.issue_engagements.values().map(|e| e.comm_day_credits).sum();

        assert_approx_eq(total, 1.0);
    }
}
