//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create an opsdeck command running in the test directory.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("opsdeck").expect("failed to find opsdeck binary");
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `opsdeck init`.
    pub fn init_cmd(&self) -> Output {
        self.cmd()
            .arg("init")
            .output()
            .expect("failed to run opsdeck init")
    }

    /// Shortcut for `opsdeck status`.
    pub fn status(&self) -> Output {
        self.cmd()
            .arg("status")
            .output()
            .expect("failed to run opsdeck status")
    }

    /// Shortcut for `opsdeck accounts list`.
    pub fn accounts_list(&self) -> Output {
        self.cmd()
            .args(["accounts", "list"])
            .output()
            .expect("failed to run opsdeck accounts list")
    }

    /// Shortcut for `opsdeck accounts list --json`.
    pub fn accounts_list_json(&self) -> Output {
        self.cmd()
            .args(["accounts", "list", "--json"])
            .output()
            .expect("failed to run opsdeck accounts list --json")
    }

    /// Shortcut for `opsdeck accounts regions`.
    pub fn accounts_regions(&self, account: &str) -> Output {
        self.cmd()
            .args(["accounts", "regions", account])
            .output()
            .expect("failed to run opsdeck accounts regions")
    }

    /// Shortcut for `opsdeck accounts reconnect`.
    pub fn reconnect(&self, account: &str, region: Option<&str>) -> Output {
        let mut cmd = self.cmd();
        cmd.args(["accounts", "reconnect", account]);
        if let Some(region) = region {
            cmd.args(["--region", region]);
        }
        cmd.output().expect("failed to run opsdeck accounts reconnect")
    }

    /// Shortcut for `opsdeck inventory instances`.
    pub fn instances(&self, account: &str, region: &str, extra: &[&str]) -> Output {
        let mut cmd = self.cmd();
        cmd.args(["inventory", "instances", "--account", account, "--region", region]);
        cmd.args(extra);
        cmd.output().expect("failed to run opsdeck inventory instances")
    }

    /// Shortcut for `opsdeck inventory stacks`.
    pub fn stacks(&self, account: &str, region: &str, extra: &[&str]) -> Output {
        let mut cmd = self.cmd();
        cmd.args(["inventory", "stacks", "--account", account, "--region", region]);
        cmd.args(extra);
        cmd.output().expect("failed to run opsdeck inventory stacks")
    }

    /// Shortcut for `opsdeck deploy list`.
    pub fn deploy_list(&self, extra: &[&str]) -> Output {
        let mut cmd = self.cmd();
        cmd.args(["deploy", "list"]);
        cmd.args(extra);
        cmd.output().expect("failed to run opsdeck deploy list")
    }

    /// Shortcut for `opsdeck deploy pending`.
    pub fn deploy_pending(&self, extra: &[&str]) -> Output {
        let mut cmd = self.cmd();
        cmd.args(["deploy", "pending"]);
        cmd.args(extra);
        cmd.output().expect("failed to run opsdeck deploy pending")
    }

    /// Shortcut for `opsdeck deploy show`.
    pub fn deploy_show(&self, pipeline_id: &str, extra: &[&str]) -> Output {
        let mut cmd = self.cmd();
        cmd.args(["deploy", "show", pipeline_id]);
        cmd.args(extra);
        cmd.output().expect("failed to run opsdeck deploy show")
    }

    /// Shortcut for `opsdeck deploy approve --yes`.
    pub fn deploy_approve(&self, pipeline_id: &str) -> Output {
        self.cmd()
            .args(["deploy", "approve", pipeline_id, "--yes"])
            .output()
            .expect("failed to run opsdeck deploy approve")
    }

    /// Shortcut for `opsdeck deploy reject --reason`.
    pub fn deploy_reject(&self, pipeline_id: &str, reason: &str) -> Output {
        self.cmd()
            .args(["deploy", "reject", pipeline_id, "--reason", reason])
            .output()
            .expect("failed to run opsdeck deploy reject")
    }

    /// Shortcut for `opsdeck deploy trigger`.
    pub fn deploy_trigger(&self, repo: &str, environment: &str, extra: &[&str]) -> Output {
        let mut cmd = self.cmd();
        cmd.args(["deploy", "trigger", "--repo", repo, "--environment", environment]);
        cmd.args(extra);
        cmd.output().expect("failed to run opsdeck deploy trigger")
    }

    /// Shortcut for `opsdeck deploy complete`.
    pub fn deploy_complete(&self, pipeline_id: &str, extra: &[&str]) -> Output {
        let mut cmd = self.cmd();
        cmd.args(["deploy", "complete", pipeline_id]);
        cmd.args(extra);
        cmd.output().expect("failed to run opsdeck deploy complete")
    }
}
