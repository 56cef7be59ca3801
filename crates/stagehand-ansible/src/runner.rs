use crate::AnsibleError;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info};

const MAX_VERBOSITY: u8 = 4;

/// The side-effecting half of the packaging pipeline: something that can
/// run a named playbook with a set of variables.
pub trait PlaybookRunner {
    /// Run the playbook identified by `playbook` (a path relative to the
    /// playbook root, without extension) with the given variables.
    ///
    /// # Errors
    /// Returns `AnsibleError` if the playbook cannot be located or the run
    /// fails.
    fn run(&self, playbook: &str, variables: &serde_json::Value) -> Result<(), AnsibleError>;
}

/// Runs playbooks by shelling out to `ansible-playbook`, blocking until
/// the child exits. Ansible inherits the terminal, so its own output is
/// what the user sees while a playbook runs.
pub struct AnsibleRunner {
    playbook_root: PathBuf,
    program: String,
    verbosity: u8,
}

impl AnsibleRunner {
    #[must_use]
    pub fn new(playbook_root: PathBuf) -> Self {
        Self {
            playbook_root,
            program: "ansible-playbook".into(),
            verbosity: 0,
        }
    }

    /// Forward `level` `-v` flags to ansible-playbook, capped at 4.
    #[must_use]
    pub fn with_verbosity(mut self, level: u8) -> Self {
        self.verbosity = level.min(MAX_VERBOSITY);
        self
    }

    /// Override the executable to invoke. Lets tests substitute a stub for
    /// ansible-playbook.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn playbook_path(&self, playbook: &str) -> PathBuf {
        self.playbook_root.join(format!("{playbook}.yml"))
    }

    fn verbosity_flag(&self) -> Option<String> {
        if self.verbosity == 0 {
            None
        } else {
            Some(format!("-{}", "v".repeat(usize::from(self.verbosity))))
        }
    }
}

impl PlaybookRunner for AnsibleRunner {
    fn run(&self, playbook: &str, variables: &serde_json::Value) -> Result<(), AnsibleError> {
        let path = self.playbook_path(playbook);
        if !path.exists() {
            return Err(AnsibleError::PlaybookNotFound(path.display().to_string()));
        }

        let extra_vars = serde_json::to_string(variables)?;

        let mut command = Command::new(&self.program);
        if let Some(flag) = self.verbosity_flag() {
            command.arg(flag);
        }
        command.arg(&path).arg("--extra-vars").arg(&extra_vars);

        info!("Running playbook: {playbook}");
        debug!("Playbook variables: {extra_vars}");

        let status = command.status().map_err(|e| AnsibleError::Spawn {
            program: self.program.clone(),
            source: e,
        })?;

        if !status.success() {
            return Err(AnsibleError::PlaybookFailed {
                playbook: playbook.to_string(),
                status,
            });
        }

        Ok(())
    }
}
