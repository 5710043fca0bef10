//! Integration tests for the mfct binary

#![allow(deprecated)] // cargo_bin is the standard way to test CLI binaries

mod common;

use assert_cmd::Command;
use common::{STABLE, svn_store, trunk_commit};
use mfc_tracker::store::Repository;
use mfc_tracker::tracking::{load_basket, load_profiles, save_store};
use mfc_tracker::types::CommitId;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary state directory plus a config file pointing at it
struct TestEnv {
    temp: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let state = temp.path().join("state");
        fs::write(
            temp.path().join("config.toml"),
            format!(
                "vcs = \"svn\"\nrepository = \"file:///nonexistent/repo\"\noperator = \"gonzo\"\nstate_dir = {:?}\n",
                state.display().to_string()
            ),
        )
        .unwrap();
        Self { temp }
    }

    /// Environment with trunk commits r2..r5 already imported
    fn seeded() -> Self {
        let env = Self::new();
        let mut store = svn_store(vec![
            trunk_commit(2, "gonzo", "Add helper"),
            trunk_commit(3, "kermit", "Use helper\n\nX-MFC-With: r2"),
            trunk_commit(4, "gonzo", "Unrelated fix"),
            trunk_commit(5, "gonzo", "Already merged"),
        ]);
        store
            .link_co_required(&CommitId::Revision(3), &[CommitId::Revision(2)])
            .unwrap();
        store.record_merges(STABLE, &[CommitId::Revision(5)]).unwrap();
        save_store(&env.state_dir(), &store).unwrap();
        env
    }

    fn config(&self) -> PathBuf {
        self.temp.path().join("config.toml")
    }

    fn state_dir(&self) -> PathBuf {
        self.temp.path().join("state")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("mfct").unwrap();
        cmd.arg("--config")
            .arg(self.config())
            .env_remove("MFCT_REPOSITORY")
            .env_remove("MFCT_OPERATOR")
            .env_remove("MFCT_STATE_DIR")
            .env_remove("RUST_LOG");
        cmd
    }
}

fn basket_ids(state_dir: &Path) -> Vec<CommitId> {
    load_basket(state_dir).unwrap().ids
}

// =============================================================================
// CLI Tests
// =============================================================================

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("mfct").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("maintenance branches"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("mfct").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_basket_help() {
    let mut cmd = Command::cargo_bin("mfct").unwrap();
    cmd.args(["basket", "--help"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Stage the declared dependencies"));
}

#[test]
fn test_missing_config_file() {
    let mut cmd = Command::cargo_bin("mfct").unwrap();
    cmd.args(["--config", "/nonexistent/mfct.toml", "branch", "list"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("config error"));
}

// =============================================================================
// Branch Flow Tests
// =============================================================================

#[test]
fn test_branch_add_list_delete() {
    let env = TestEnv::new();

    env.cmd()
        .args(["branch", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No branches registered"));

    env.cmd()
        .args(["branch", "add", "--trunk", "--branch-point", "r1", "HEAD", "head/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added trunk HEAD at /head"));

    env.cmd()
        .args(["branch", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HEAD"))
        .stdout(predicate::str::contains("/head"))
        .stdout(predicate::str::contains("trunk"));

    env.cmd()
        .args(["branch", "delete", "--yes", "HEAD"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted branch HEAD"));
}

#[test]
fn test_second_trunk_rejected() {
    let env = TestEnv::new();
    env.cmd()
        .args(["branch", "add", "--trunk", "--branch-point", "1", "HEAD", "/head"])
        .assert()
        .success();

    env.cmd()
        .args(["branch", "add", "--trunk", "--branch-point", "1", "HEAD2", "/head2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("trunk branch already exists"));
}

#[test]
fn test_branch_point_past_trunk_rejected() {
    let env = TestEnv::new();
    env.cmd()
        .args(["branch", "add", "--trunk", "--branch-point", "1", "HEAD", "/head"])
        .assert()
        .success();

    // Nothing imported yet: the trunk ends just before r1
    env.cmd()
        .args(["branch", "add", "--branch-point", "5", "STABLE-11", "/stable/11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid branch point"));
}

#[test]
fn test_import_unknown_branch() {
    let env = TestEnv::new();
    env.cmd()
        .args(["import", "--branch", "NOPE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("branch not found: NOPE"));
}

// =============================================================================
// Basket and Plan Flow Tests
// =============================================================================

#[test]
fn test_status_shows_states() {
    let env = TestEnv::seeded();
    env.cmd()
        .args(["status", "STABLE-11"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 commit(s), 1 merged"))
        .stdout(predicate::str::contains("r3"))
        .stdout(predicate::str::contains("Use helper"))
        .stdout(predicate::str::contains("done"));

    env.cmd()
        .args(["status", "STABLE-11", "--filter", "kermit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 commit(s)"))
        .stdout(predicate::str::contains("Unrelated fix").not());
}

#[test]
fn test_status_needs_branch() {
    let env = TestEnv::seeded();
    env.cmd()
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no branch given"));
}

#[test]
fn test_basket_requires_target() {
    let env = TestEnv::seeded();
    env.cmd()
        .args(["basket", "add", "r3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no target branch"));
}

#[test]
fn test_basket_add_fix_and_plan() {
    let env = TestEnv::seeded();

    env.cmd()
        .args(["plan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Basket is empty"));

    env.cmd()
        .args(["basket", "add", "--branch", "STABLE-11", "r3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added r3"));
    assert_eq!(basket_ids(&env.state_dir()), vec![CommitId::Revision(3)]);

    env.cmd()
        .args(["plan", "--summarized"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Following commit is marked as X-MFC-With by r3: r2",
        ))
        .stdout(predicate::str::contains("svn merge -c r3 ^/head/ stable/11"))
        .stdout(predicate::str::contains("MFC r3 by kermit:"));

    env.cmd()
        .args(["basket", "fix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added dependency r2"));

    env.cmd()
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("Following").not())
        .stdout(predicate::str::contains("r3 by kermit:"))
        .stdout(predicate::str::contains("svn merge -r 1:3 ^/head/ stable/11"));

    env.cmd()
        .args(["basket", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/stable/11"))
        .stdout(predicate::str::contains("Add helper"));

    env.cmd()
        .args(["basket", "remove", "r2"])
        .assert()
        .success();
    assert_eq!(basket_ids(&env.state_dir()), vec![CommitId::Revision(3)]);

    env.cmd()
        .args(["basket", "clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Basket cleared"));
    assert!(basket_ids(&env.state_dir()).is_empty());
}

#[test]
fn test_basket_add_unknown_commit() {
    let env = TestEnv::seeded();
    env.cmd()
        .args(["basket", "add", "--branch", "STABLE-11", "r42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("commit not found: r42"));
}

#[test]
fn test_basket_fix_one_commit() {
    let env = TestEnv::seeded();
    env.cmd()
        .args(["basket", "add", "--branch", "STABLE-11", "r3", "r4"])
        .assert()
        .success();

    env.cmd()
        .args(["basket", "fix", "r4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No dependencies to add"));

    env.cmd()
        .args(["basket", "fix", "r3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added dependency r2"));
    assert_eq!(
        basket_ids(&env.state_dir()),
        vec![CommitId::Revision(3), CommitId::Revision(4), CommitId::Revision(2)]
    );
}

// =============================================================================
// Operator Profile Tests
// =============================================================================

#[test]
fn test_note_set_show_delete() {
    let env = TestEnv::seeded();

    env.cmd()
        .args(["note", "r3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No notes on r3"));

    env.cmd()
        .args(["note", "r3", "wait for the driver update"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Noted r3"));
    let profiles = load_profiles(&env.state_dir()).unwrap();
    assert_eq!(
        profiles.get("gonzo").unwrap().note(&CommitId::Revision(3)),
        Some("wait for the driver update")
    );

    env.cmd()
        .args(["note", "r3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gonzo"))
        .stdout(predicate::str::contains("wait for the driver update"));

    env.cmd()
        .args(["status", "STABLE-11"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wait for the driver update"));

    env.cmd()
        .args(["note", "r3", "--delete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed note on r3"));
    assert!(load_profiles(&env.state_dir()).unwrap().get("gonzo").is_none());

    env.cmd()
        .args(["note", "r3", "--delete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gonzo has no note on r3"));
}

#[test]
fn test_note_unknown_commit() {
    let env = TestEnv::seeded();
    env.cmd()
        .args(["note", "r42", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("commit not found: r42"));
}

#[test]
fn test_never_hides_commits_from_status() {
    let env = TestEnv::seeded();

    env.cmd()
        .args(["never", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gonzo has no never-MFC commits"));

    env.cmd()
        .args(["never", "add", "r2", "r4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("r2 will not be merged"))
        .stdout(predicate::str::contains("r4 will not be merged"));

    env.cmd()
        .args(["never", "add", "r4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("r4 is already on the list"));

    env.cmd()
        .args(["status", "STABLE-11"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 commit(s), 1 merged"))
        .stdout(predicate::str::contains("Unrelated fix").not());

    env.cmd()
        .args(["never", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Add helper"))
        .stdout(predicate::str::contains("Unrelated fix"));

    env.cmd()
        .args(["never", "remove", "r4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed r4"));
    let profiles = load_profiles(&env.state_dir()).unwrap();
    assert_eq!(profiles.get("gonzo").unwrap().never_mfc, vec![CommitId::Revision(2)]);

    env.cmd()
        .args(["status", "STABLE-11"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 commit(s), 1 merged"))
        .stdout(predicate::str::contains("Unrelated fix"));
}
