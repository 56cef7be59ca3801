use crate::machine::RECORD_FILE;
use crate::{CoreError, RegisteredMachine, VagrantMachine};
use std::path::PathBuf;

/// Explicit configuration context: the stagehand home directory plus the
/// registry, artifact, and playbook paths under it.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub home: PathBuf,
}

impl Configuration {
    /// Build a configuration rooted at the platform state directory.
    ///
    /// # Errors
    /// Returns `CoreError` if no platform state directory can be determined.
    pub fn new() -> Result<Self, CoreError> {
        let home = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .ok_or_else(|| CoreError::Directory("state directory not found".into()))?
            .join("stagehand");
        Ok(Self { home })
    }

    /// Build a configuration rooted at an explicit directory.
    #[must_use]
    pub fn with_home(home: PathBuf) -> Self {
        Self { home }
    }

    /// Registry of machine records, one subdirectory per machine.
    #[must_use]
    pub fn vagrant_dir(&self) -> PathBuf {
        self.home.join("vagrant")
    }

    /// Directory that packaged box images and their metadata land in.
    #[must_use]
    pub fn vagrant_box_directory(&self) -> PathBuf {
        self.home.join("boxes")
    }

    #[must_use]
    pub fn playbook_directory(&self) -> PathBuf {
        self.home.join("playbooks")
    }

    /// Create the home directory tree if it does not exist.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if any directory creation fails.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.vagrant_dir())?;
        std::fs::create_dir_all(self.vagrant_box_directory())?;
        std::fs::create_dir_all(self.playbook_directory())?;
        Ok(())
    }

    /// Enumerate the registered Vagrant machines, sorted by name.
    /// Registry entries without a record file are skipped.
    ///
    /// # Errors
    /// Returns `CoreError` if the registry cannot be read or any record is
    /// invalid.
    pub fn registered_vagrant_machines(&self) -> Result<Vec<RegisteredMachine>, CoreError> {
        let registry = self.vagrant_dir();
        if !registry.exists() {
            return Ok(Vec::new());
        }

        let mut machines = Vec::new();
        for entry in std::fs::read_dir(&registry)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            let directory = entry.path();
            if !directory.join(RECORD_FILE).exists() {
                continue;
            }

            let machine = VagrantMachine::load(&directory)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            machines.push(RegisteredMachine {
                name,
                directory,
                machine,
            });
        }

        machines.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(machines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stage;

    fn register(config: &Configuration, name: &str, stage: Stage) {
        let dir = config.vagrant_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        VagrantMachine {
            hostname: format!("{name}.local"),
            stage,
        }
        .save(&dir)
        .unwrap();
    }

    #[test]
    fn test_directory_layout() {
        let config = Configuration::with_home(PathBuf::from("/tmp/stagehand-home"));
        assert!(config.vagrant_dir().ends_with("vagrant"));
        assert!(config.vagrant_box_directory().ends_with("boxes"));
        assert!(config.playbook_directory().ends_with("playbooks"));
    }

    #[test]
    fn test_missing_registry_is_empty() {
        let home = tempfile::tempdir().unwrap();
        let config = Configuration::with_home(home.path().join("nonexistent"));
        assert!(config.registered_vagrant_machines().unwrap().is_empty());
    }

    #[test]
    fn test_machines_sorted_by_name() {
        let home = tempfile::tempdir().unwrap();
        let config = Configuration::with_home(home.path().to_path_buf());
        register(&config, "bravo", Stage::Base);
        register(&config, "alpha", Stage::Bare);

        let machines = config.registered_vagrant_machines().unwrap();
        let names: Vec<_> = machines.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["alpha", "bravo"]);
        assert_eq!(machines[0].machine.stage, Stage::Bare);
    }

    #[test]
    fn test_non_record_entries_skipped() {
        let home = tempfile::tempdir().unwrap();
        let config = Configuration::with_home(home.path().to_path_buf());
        register(&config, "alpha", Stage::Install);

        // A stray file and a directory without a record file.
        std::fs::write(config.vagrant_dir().join("notes.txt"), "scratch").unwrap();
        std::fs::create_dir_all(config.vagrant_dir().join("incomplete")).unwrap();

        let machines = config.registered_vagrant_machines().unwrap();
        assert_eq!(machines.len(), 1);
        assert_eq!(machines[0].name, "alpha");
    }

    #[test]
    fn test_ensure_dirs() {
        let home = tempfile::tempdir().unwrap();
        let config = Configuration::with_home(home.path().join("root"));
        config.ensure_dirs().unwrap();
        assert!(config.vagrant_dir().is_dir());
        assert!(config.vagrant_box_directory().is_dir());
        assert!(config.playbook_directory().is_dir());
    }
}
