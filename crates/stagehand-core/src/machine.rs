use crate::{CoreError, Stage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub(crate) const RECORD_FILE: &str = "machine.json";

/// One registered Vagrant machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VagrantMachine {
    pub hostname: String,
    pub stage: Stage,
}

/// On-disk form of a machine record. The stage is kept as a raw string so
/// an out-of-set value surfaces as `CoreError::UnknownStage` with the
/// offending value rather than a generic parse failure.
#[derive(Debug, Serialize, Deserialize)]
struct MachineRecord {
    hostname: String,
    stage: String,
}

impl VagrantMachine {
    /// Load the machine record stored in `dir`.
    ///
    /// # Errors
    /// Returns `CoreError` if the record cannot be read, is malformed, or
    /// names an unknown stage.
    pub fn load(dir: &Path) -> Result<Self, CoreError> {
        let path = dir.join(RECORD_FILE);
        let content = std::fs::read_to_string(&path)?;
        let record: MachineRecord =
            serde_json::from_str(&content).map_err(|e| CoreError::InvalidRecord {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            hostname: record.hostname,
            stage: record.stage.parse()?,
        })
    }

    /// Save the machine record into `dir`.
    ///
    /// # Errors
    /// Returns `CoreError` if the record cannot be serialized or written.
    pub fn save(&self, dir: &Path) -> Result<(), CoreError> {
        let path = dir.join(RECORD_FILE);
        let record = MachineRecord {
            hostname: self.hostname.clone(),
            stage: self.stage.to_string(),
        };
        let content =
            serde_json::to_string_pretty(&record).map_err(|e| CoreError::InvalidRecord {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

/// A machine record together with the registry directory backing it.
#[derive(Debug, Clone)]
pub struct RegisteredMachine {
    pub name: String,
    pub directory: PathBuf,
    pub machine: VagrantMachine,
}

impl RegisteredMachine {
    /// Commit the current record state back to the registry.
    ///
    /// # Errors
    /// Returns `CoreError` if the record cannot be written.
    pub fn write(&self) -> Result<(), CoreError> {
        self.machine.save(&self.directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let machine = VagrantMachine {
            hostname: "devel.local".into(),
            stage: Stage::Base,
        };

        machine.save(dir.path()).unwrap();
        let loaded = VagrantMachine::load(dir.path()).unwrap();
        assert_eq!(loaded, machine);
    }

    #[test]
    fn test_load_unknown_stage() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(RECORD_FILE),
            r#"{"hostname": "devel.local", "stage": "golden"}"#,
        )
        .unwrap();

        let err = VagrantMachine::load(dir.path()).unwrap_err();
        match err {
            CoreError::UnknownStage(value) => assert_eq!(value, "golden"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_malformed_record() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(RECORD_FILE), "not json").unwrap();

        let err = VagrantMachine::load(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRecord { .. }));
    }

    #[test]
    fn test_registered_machine_write() {
        let dir = tempfile::tempdir().unwrap();
        let mut registered = RegisteredMachine {
            name: "devel".into(),
            directory: dir.path().to_path_buf(),
            machine: VagrantMachine {
                hostname: "devel.local".into(),
                stage: Stage::Bare,
            },
        };

        registered.machine.stage = Stage::Base;
        registered.write().unwrap();

        let loaded = VagrantMachine::load(dir.path()).unwrap();
        assert_eq!(loaded.stage, Stage::Base);
    }
}
