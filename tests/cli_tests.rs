use chrono::{Duration, TimeZone, Utc};
use clap::Parser;
use git_activity::cli::{ActivityCli, ActivityCommand, HistoryCli, HistoryCommand};
use git_activity::config::OutputFormat;

#[test]
fn export_flags_reach_the_filter() {
    let cli = HistoryCli::try_parse_from([
        "git-history",
        "export",
        "-p",
        "/tmp/repo",
        "-a",
        "alice",
        "--author",
        "bob@corp",
        "--since",
        "2024-01-02T00:00:00Z",
        "--no-merges",
        "-n",
        "5",
        "--page-size",
        "20",
        "--format",
        "json",
        "--json",
    ])
    .unwrap();

    assert!(cli.output.json);
    let HistoryCommand::Export(export) = cli.command else {
        panic!("expected export");
    };
    assert_eq!(export.page_size, 20);
    assert_eq!(export.format, OutputFormat::Json);

    let filter = export.history.filter();
    assert_eq!(filter.authors, vec!["alice", "bob@corp"]);
    assert_eq!(filter.since, Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()));
    assert!(filter.no_merges);
    assert_eq!(filter.limit, Some(5));
}

#[test]
fn branch_and_all_branches_conflict() {
    let parsed = HistoryCli::try_parse_from(["git-history", "authors", "-b", "main", "--all-branches"]);
    assert!(parsed.is_err());
}

#[test]
fn bad_dates_are_rejected_at_parse_time() {
    assert!(HistoryCli::try_parse_from(["git-history", "export", "--since", "yesterday"]).is_err());
    assert!(ActivityCli::try_parse_from(["gh-activity", "fetch", "o/r", "u", "--until", "2024-13-01"]).is_err());
}

#[test]
fn fetch_window_defaults_to_thirty_days() {
    let cli = ActivityCli::try_parse_from(["gh-activity", "fetch", "https://github.com/octo/repo.git", "octocat"])
        .unwrap();
    let ActivityCommand::Fetch(fetch) = cli.command else {
        panic!("expected fetch");
    };
    assert_eq!(fetch.target.repo.to_string(), "octo/repo");
    assert_eq!(fetch.target.days, 30);

    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let window = fetch.target.window(now).unwrap();
    assert_eq!(window.end, now);
    assert_eq!(window.start, now - Duration::days(30));
}

#[test]
fn window_bounds_are_cut_to_whole_seconds() {
    let cli = ActivityCli::try_parse_from([
        "gh-activity",
        "fetch",
        "octo/repo",
        "octocat",
        "--since",
        "2024-01-01T00:00:00.750Z",
        "--until",
        "2024-01-02T00:00:00.250Z",
    ])
    .unwrap();
    let ActivityCommand::Fetch(fetch) = cli.command else {
        panic!("expected fetch");
    };
    let window = fetch.target.window(Utc::now()).unwrap();
    assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
}

#[test]
fn inverted_fetch_window_is_an_error() {
    let cli = ActivityCli::try_parse_from([
        "gh-activity",
        "show",
        "octo/repo",
        "octocat",
        "--since",
        "2024-02-01T00:00:00Z",
        "--until",
        "2024-01-01T00:00:00Z",
    ])
    .unwrap();
    let ActivityCommand::Show(show) = cli.command else {
        panic!("expected show");
    };
    assert!(show.target.window(Utc::now()).is_err());
}

#[test]
fn clear_needs_a_target_or_all() {
    assert!(ActivityCli::try_parse_from(["gh-activity", "clear"]).is_err());
    assert!(ActivityCli::try_parse_from(["gh-activity", "clear", "octo/repo"]).is_err());
    assert!(ActivityCli::try_parse_from(["gh-activity", "clear", "octo/repo", "me", "--all"]).is_err());
    assert!(ActivityCli::try_parse_from(["gh-activity", "clear", "--all"]).is_ok());
    assert!(ActivityCli::try_parse_from(["gh-activity", "clear", "octo/repo", "me"]).is_ok());
}

#[test]
fn malformed_repo_is_rejected() {
    assert!(ActivityCli::try_parse_from(["gh-activity", "fetch", "not a repo", "me"]).is_err());
}

#[test]
fn github_settings_are_global() {
    let cli = ActivityCli::try_parse_from([
        "gh-activity",
        "status",
        "--cache-dir",
        "/tmp/gh-cache",
        "--per-page",
        "50",
    ])
    .unwrap();
    assert_eq!(cli.github.cache_dir(), std::path::PathBuf::from("/tmp/gh-cache"));
    assert_eq!(cli.github.per_page, 50);
}
