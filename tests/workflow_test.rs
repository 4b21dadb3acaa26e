// tests/workflow_test.rs
use git2::Oid;
use git_release_tag::cli::run_release_workflow;
use git_release_tag::config::Config;
use git_release_tag::error::{ErrorCategory, ReleaseError};
use git_release_tag::git::{DryRunRepository, MockRepository, Repository};
use git_release_tag::ui::{Response, ScriptedOperator};

fn commit(byte: u8) -> Oid {
    Oid::from_bytes(&[byte; 20]).unwrap()
}

fn value(v: &str) -> Response {
    Response::Value(v.to_string())
}

/// Repository on `main`, in sync with `upstream`, HEAD at commit 0x10
fn repo_on_main() -> MockRepository {
    let mut repo = MockRepository::new();
    repo.add_remote("upstream", Some("main"));
    repo.set_current_branch("main");
    repo.set_head(commit(0x10));
    repo
}

fn config() -> Config {
    Config::default()
}

#[test]
fn test_first_release_accepts_all_defaults() {
    let repo = repo_on_main();
    let mut operator = ScriptedOperator::new([Response::Accept, Response::Accept, Response::Accept]);

    let outcome = run_release_workflow(&config(), &repo, &mut operator).unwrap();

    assert_eq!(
        operator.transcript(),
        &[
            "Moving major tag [v1]".to_string(),
            "Semver tag [v1.0.0]".to_string(),
            "Tag message [Release v1.0.0]".to_string(),
        ]
    );
    assert_eq!(outcome.published.semver.name, "v1.0.0");
    assert_eq!(outcome.published.major.name, "v1");
    assert_eq!(outcome.published.lease.expected_old_value, None);
    assert_eq!(
        outcome.summary,
        vec![
            ("v1.0.0".to_string(), "1010101".to_string()),
            ("v1".to_string(), "1010101".to_string()),
        ]
    );
    assert_eq!(repo.remote_tag_target("upstream", "v1.0.0"), Some(commit(0x10)));
    assert_eq!(repo.remote_tag_target("upstream", "v1"), Some(commit(0x10)));
    assert_eq!(repo.tag_message("v1.0.0").as_deref(), Some("Release v1.0.0"));
}

#[test]
fn test_patch_release_moves_existing_major() {
    let mut repo = repo_on_main();
    repo.add_published_tag("upstream", "v1.2.3", commit(0x01));
    repo.add_published_tag("upstream", "v1.2.4", commit(0x02));
    repo.add_published_tag("upstream", "v1", commit(0x02));
    let lease = repo.remote_tag_value("upstream", "v1");

    let mut operator = ScriptedOperator::new([
        Response::Accept,
        Response::Accept,
        Response::Yes,
        value("Bugfix release"),
    ]);

    let outcome = run_release_workflow(&config(), &repo, &mut operator).unwrap();

    assert_eq!(operator.transcript()[0], "Moving major tag [v1]");
    assert_eq!(operator.transcript()[1], "Semver tag [v1.2.5]");
    assert_eq!(operator.transcript()[2], "Move existing tag v1?");
    assert_eq!(outcome.published.lease.expected_old_value, lease);
    assert_eq!(repo.remote_tag_target("upstream", "v1.2.5"), Some(commit(0x10)));
    assert_eq!(repo.remote_tag_target("upstream", "v1"), Some(commit(0x10)));
    assert_eq!(repo.tag_message("v1").as_deref(), Some("Bugfix release"));
    assert_eq!(operator.remaining(), 0);
}

#[test]
fn test_remote_tags_are_fetched_before_suggesting() {
    let mut repo = repo_on_main();
    repo.add_remote_tag("upstream", "v3.1.0", commit(0x03));
    let mut operator = ScriptedOperator::default();

    let _ = run_release_workflow(&config(), &repo, &mut operator);

    assert_eq!(operator.transcript()[0], "Moving major tag [v3]");
}

#[test]
fn test_major_at_head_is_preferred() {
    let mut repo = repo_on_main();
    repo.add_published_tag("upstream", "v5.0.0", commit(0x05));
    repo.add_published_tag("upstream", "v2", commit(0x10));
    let mut operator = ScriptedOperator::default();

    let _ = run_release_workflow(&config(), &repo, &mut operator);

    assert_eq!(operator.transcript()[0], "Moving major tag [v2]");
}

#[test]
fn test_operator_override_redirects_semver_suggestion() {
    let mut repo = repo_on_main();
    repo.add_published_tag("upstream", "v1.4.0", commit(0x01));
    repo.add_published_tag("upstream", "v2.0.3", commit(0x02));
    let mut operator = ScriptedOperator::new([value("v1"), Response::Accept]);

    let _ = run_release_workflow(&config(), &repo, &mut operator);

    assert_eq!(operator.transcript()[0], "Moving major tag [v2]");
    assert_eq!(operator.transcript()[1], "Semver tag [v1.4.1]");
}

#[test]
fn test_dirty_working_tree_stops_before_any_prompt() {
    let mut repo = repo_on_main();
    repo.set_clean(false);
    let mut operator = ScriptedOperator::default();

    let err = run_release_workflow(&config(), &repo, &mut operator).unwrap_err();

    assert!(matches!(err, ReleaseError::DirtyWorkingTree));
    assert_eq!(err.category(), ErrorCategory::Precondition);
    assert!(operator.transcript().is_empty());
}

#[test]
fn test_missing_remote_is_precondition_failure() {
    let mut repo = MockRepository::new();
    repo.set_head(commit(0x10));
    let config = Config {
        remote: "fork".to_string(),
        ..Config::default()
    };
    let mut operator = ScriptedOperator::default();

    let err = run_release_workflow(&config, &repo, &mut operator).unwrap_err();

    assert!(matches!(err, ReleaseError::RemoteNotFound { ref remote } if remote == "fork"));
    assert_eq!(err.category(), ErrorCategory::Precondition);
}

#[test]
fn test_unknown_default_branch_is_precondition_failure() {
    let mut repo = MockRepository::new();
    repo.add_remote("upstream", None);
    repo.set_head(commit(0x10));
    let mut operator = ScriptedOperator::default();

    let err = run_release_workflow(&config(), &repo, &mut operator).unwrap_err();

    assert!(matches!(err, ReleaseError::DefaultBranchUnknown { .. }));
}

#[test]
fn test_fast_forward_only_on_default_branch() {
    let repo = repo_on_main();
    let mut operator = ScriptedOperator::new([Response::Accept, Response::Accept, Response::Accept]);
    run_release_workflow(&config(), &repo, &mut operator).unwrap();
    assert_eq!(repo.calls()[0], "git pull --ff-only upstream main");

    let mut feature = repo_on_main();
    feature.set_current_branch("feature/x");
    let mut operator = ScriptedOperator::new([Response::Accept, Response::Accept, Response::Accept]);
    run_release_workflow(&config(), &feature, &mut operator).unwrap();
    assert!(!feature.calls().iter().any(|c| c.starts_with("git pull")));
}

#[test]
fn test_diverged_default_branch_fails() {
    let mut repo = repo_on_main();
    repo.set_diverged(true);
    let mut operator = ScriptedOperator::default();

    let err = run_release_workflow(&config(), &repo, &mut operator).unwrap_err();

    assert!(matches!(err, ReleaseError::NotFastForward { .. }));
    assert!(operator.transcript().is_empty());
}

#[test]
fn test_invalid_major_tag_is_validation_error() {
    let repo = repo_on_main();
    for bad in ["1", "v1.0", "v01", "vx"] {
        let mut operator = ScriptedOperator::new([value(bad)]);
        let err = run_release_workflow(&config(), &repo, &mut operator).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation, "{}", bad);
    }
    assert_eq!(repo.push_attempts(), 0);
}

#[test]
fn test_invalid_semver_tag_is_validation_error() {
    let repo = repo_on_main();
    for bad in ["1.0.0", "v1.0", "v1.0.0-rc.1", "v1.0.0+build", "v1.00.0"] {
        let mut operator = ScriptedOperator::new([Response::Accept, value(bad)]);
        let err = run_release_workflow(&config(), &repo, &mut operator).unwrap_err();
        assert!(
            matches!(err, ReleaseError::InvalidSemverTag { .. }),
            "{} gave {}",
            bad,
            err
        );
    }
    assert!(repo.list_tags("v*").unwrap().is_empty());
}

#[test]
fn test_mismatched_major_component_requires_confirmation() {
    let repo = repo_on_main();
    let mut operator = ScriptedOperator::new([Response::Accept, value("v2.0.0"), Response::No]);

    let err = run_release_workflow(&config(), &repo, &mut operator).unwrap_err();

    assert!(matches!(err, ReleaseError::Cancelled { .. }));
    assert_eq!(err.exit_code(), 130);
    assert!(repo.list_tags("v*").unwrap().is_empty());
}

#[test]
fn test_mismatched_major_component_confirmed() {
    let repo = repo_on_main();
    let mut operator = ScriptedOperator::new([
        Response::Accept,
        value("v2.0.0"),
        Response::Yes,
        Response::Accept,
    ]);

    run_release_workflow(&config(), &repo, &mut operator).unwrap();

    assert_eq!(repo.remote_tag_target("upstream", "v2.0.0"), Some(commit(0x10)));
    assert_eq!(repo.remote_tag_target("upstream", "v1"), Some(commit(0x10)));
}

#[test]
fn test_existing_local_semver_is_duplicate() {
    let mut repo = repo_on_main();
    repo.add_tag("v1.0.0", commit(0x01));
    let mut operator = ScriptedOperator::new([Response::Accept, value("v1.0.0")]);

    let err = run_release_workflow(&config(), &repo, &mut operator).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::DuplicateTag);
    assert_eq!(repo.push_attempts(), 0);
}

#[test]
fn test_declining_major_move_changes_nothing() {
    let mut repo = repo_on_main();
    repo.add_published_tag("upstream", "v1.0.0", commit(0x01));
    repo.add_published_tag("upstream", "v1", commit(0x01));
    let mut operator = ScriptedOperator::new([Response::Accept, Response::Accept, Response::No]);

    let err = run_release_workflow(&config(), &repo, &mut operator).unwrap_err();

    assert!(matches!(err, ReleaseError::Cancelled { .. }));
    assert_eq!(repo.tag_target("v1").unwrap(), Some(commit(0x01)));
    assert_eq!(repo.tag_target("v1.0.1").unwrap(), None);
    assert_eq!(repo.push_attempts(), 0);
}

#[test]
fn test_major_moved_during_prompts_is_concurrent_modification() {
    let mut repo = repo_on_main();
    repo.add_published_tag("upstream", "v1.0.0", commit(0x01));
    repo.add_published_tag("upstream", "v1", commit(0x01));
    repo.race_on_push("upstream", "v1", Some(commit(0x20)));
    let mut operator = ScriptedOperator::new([
        Response::Accept,
        Response::Accept,
        Response::Yes,
        Response::Accept,
    ]);

    let err = run_release_workflow(&config(), &repo, &mut operator).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::ConcurrentModification);
    assert_eq!(repo.remote_tag_value("upstream", "v1.0.1"), None);
    assert_eq!(repo.remote_tag_target("upstream", "v1"), Some(commit(0x20)));
    // Local tags stay for inspection
    assert_eq!(repo.tag_target("v1.0.1").unwrap(), Some(commit(0x10)));
    assert_eq!(repo.tag_target("v1").unwrap(), Some(commit(0x10)));
}

#[test]
fn test_dry_run_reports_commands_without_mutating() {
    let mut mock = repo_on_main();
    mock.add_published_tag("upstream", "v1.0.0", commit(0x01));
    mock.add_published_tag("upstream", "v1", commit(0x01));
    let repo = DryRunRepository::new(mock);
    let config = Config {
        dry_run: true,
        ..Config::default()
    };
    let mut operator = ScriptedOperator::new([
        Response::Accept,
        Response::Accept,
        Response::Yes,
        Response::Accept,
    ]);

    let outcome = run_release_workflow(&config, &repo, &mut operator).unwrap();

    assert!(outcome.dry_run);
    assert_eq!(
        outcome.summary,
        vec![
            ("v1.0.1".to_string(), "1010101".to_string()),
            ("v1".to_string(), "1010101".to_string()),
        ]
    );

    let commands = repo.commands();
    assert_eq!(commands.len(), 4);
    assert_eq!(commands[0], "git pull --ff-only upstream main");
    assert!(commands[1].starts_with("git tag -a v1.0.1 -m \"Release v1.0.1\""));
    assert!(commands[2].starts_with("git tag -a -f v1 "));
    assert!(commands[3].contains("--atomic"));
    assert!(commands[3].contains("--force-with-lease=refs/tags/v1:"));

    let inner = repo.inner();
    assert!(inner.calls().is_empty());
    assert_eq!(inner.push_attempts(), 0);
    assert_eq!(inner.tag_target("v1.0.1").unwrap(), None);
    assert_eq!(inner.tag_target("v1").unwrap(), Some(commit(0x01)));
}

#[test]
fn test_custom_remote_and_message_template() {
    let mut repo = MockRepository::new();
    repo.add_remote("origin", Some("trunk"));
    repo.set_current_branch("trunk");
    repo.set_head(commit(0x10));
    let config = Config {
        remote: "origin".to_string(),
        dry_run: false,
        message_template: "Ship {tag}".to_string(),
    };
    let mut operator = ScriptedOperator::new([Response::Accept, Response::Accept, Response::Accept]);

    run_release_workflow(&config, &repo, &mut operator).unwrap();

    assert_eq!(operator.transcript()[2], "Tag message [Ship v1.0.0]");
    assert_eq!(repo.calls()[0], "git pull --ff-only origin trunk");
    assert_eq!(repo.remote_tag_target("origin", "v1"), Some(commit(0x10)));
}

#[test]
fn test_dry_run_fails_on_diverged_default_branch() {
    let mut mock = repo_on_main();
    mock.set_diverged(true);
    let repo = DryRunRepository::new(mock);
    let config = Config {
        dry_run: true,
        ..Config::default()
    };
    let mut operator = ScriptedOperator::default();

    let err = run_release_workflow(&config, &repo, &mut operator).unwrap_err();

    assert!(matches!(err, ReleaseError::NotFastForward { .. }));
    assert_eq!(err.category(), ErrorCategory::Precondition);
    assert!(repo.commands().is_empty());
    assert!(operator.transcript().is_empty());
}

#[test]
fn test_dry_run_plans_tags_at_pulled_commit() {
    let accept_all = || ScriptedOperator::new([Response::Accept, Response::Accept, Response::Accept]);

    let mut real = repo_on_main();
    real.set_upstream_ahead(commit(0x20));
    let outcome = run_release_workflow(&config(), &real, &mut accept_all()).unwrap();
    assert_eq!(outcome.summary[0], ("v1.0.0".to_string(), "2020202".to_string()));

    let mut behind = repo_on_main();
    behind.set_upstream_ahead(commit(0x20));
    let repo = DryRunRepository::new(behind);
    let config = Config {
        dry_run: true,
        ..Config::default()
    };
    let dry = run_release_workflow(&config, &repo, &mut accept_all()).unwrap();

    assert_eq!(dry.summary, outcome.summary);
    assert!(repo.commands()[1].ends_with(&commit(0x20).to_string()));
    assert_eq!(repo.inner().head_commit().unwrap(), commit(0x10));
}
