use super::*;

#[test]
fn test_cli_build() {
    let app = build_cli();
    assert_eq!(app.get_name(), "jenkins-watch");
}

#[test]
fn test_cli_requires_subcommand() {
    let app = build_cli();
    assert!(app.try_get_matches_from(vec!["jenkins-watch"]).is_err());
}

#[test]
fn test_cli_watch_command() {
    let app = build_cli();
    let matches = app
        .try_get_matches_from(vec![
            "jenkins-watch",
            "watch",
            "--server",
            "https://ci.example.com",
            "--interval",
            "30",
            "--timeout",
            "5",
            "--job",
            "api",
            "--job",
            "platform/deploy",
            "--layout",
            "split",
        ])
        .unwrap();

    let watch = matches.subcommand_matches("watch").unwrap();
    assert_eq!(
        watch.get_one::<String>("server").unwrap(),
        "https://ci.example.com"
    );
    assert_eq!(*watch.get_one::<u64>("interval").unwrap(), 30);
    assert_eq!(*watch.get_one::<u64>("timeout").unwrap(), 5);
    let jobs: Vec<&String> = watch.get_many::<String>("job").unwrap().collect();
    assert_eq!(jobs, vec!["api", "platform/deploy"]);
    assert_eq!(watch.get_one::<String>("layout").unwrap(), "split");
}

#[test]
fn test_cli_watch_rejects_unknown_layout() {
    let app = build_cli();
    let result = app.try_get_matches_from(vec!["jenkins-watch", "watch", "--layout", "grid"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_watch_rejects_non_numeric_interval() {
    let app = build_cli();
    let result = app.try_get_matches_from(vec!["jenkins-watch", "watch", "--interval", "soon"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_status_json_flag() {
    let app = build_cli();
    let matches = app
        .try_get_matches_from(vec!["jenkins-watch", "status", "--json"])
        .unwrap();
    let status = matches.subcommand_matches("status").unwrap();
    assert!(status.get_flag("json"));
    assert!(status.get_one::<String>("server").is_none());
}

#[test]
fn test_cli_status_has_no_interval() {
    let app = build_cli();
    let result = app.try_get_matches_from(vec!["jenkins-watch", "status", "--interval", "5"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_global_flags_after_subcommand() {
    let app = build_cli();
    let matches = app
        .try_get_matches_from(vec!["jenkins-watch", "status", "-v", "--no-color"])
        .unwrap();
    assert!(matches.get_flag("verbose"));
    assert!(matches.get_flag("no-color"));
}
