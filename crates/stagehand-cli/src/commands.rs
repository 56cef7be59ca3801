use anyhow::{Context, Result};
use clap::ValueEnum;
use serde_json::json;
use stagehand_ansible::PlaybookRunner;
use stagehand_core::{Configuration, Stage};

/// Playbook invoked for every machine being packaged.
const PACKAGE_PLAYBOOK: &str = "package/vagrant";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
    None,
}

impl VersionBump {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VersionBump::Major => "major",
            VersionBump::Minor => "minor",
            VersionBump::Patch => "patch",
            VersionBump::None => "none",
        }
    }
}

pub struct PackageVagrantOptions {
    pub update_current_stage: bool,
    pub serve_local_file: bool,
    pub bump_version: VersionBump,
}

/// Stage a machine should be packaged as, plus whether the terminal stage
/// is being reused because nothing follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Target {
    stage: Stage,
    reused_terminal: bool,
}

fn resolve_target(current: Stage, update_current_stage: bool) -> Target {
    if update_current_stage {
        return Target {
            stage: current,
            reused_terminal: false,
        };
    }

    match current.successor() {
        Some(next) => Target {
            stage: next,
            reused_terminal: false,
        },
        None => Target {
            stage: current,
            reused_terminal: true,
        },
    }
}

/// Package every registered machine, then advance its persisted stage.
///
/// # Errors
/// Returns an error if the registry cannot be read, a record names an
/// unknown stage, a playbook run fails, or a record cannot be persisted.
/// The first failure aborts the loop; later machines are not processed.
pub fn package_vagrant(
    configuration: &Configuration,
    runner: &dyn PlaybookRunner,
    options: &PackageVagrantOptions,
) -> Result<()> {
    if options.bump_version == VersionBump::None {
        println!(
            "Warning: the box version will not be bumped, so users of the box will not get these changes automatically."
        );
    }

    let package_dir = configuration.vagrant_box_directory();
    let package_ref = if options.serve_local_file {
        "local"
    } else {
        "remote"
    };

    for mut registered in configuration
        .registered_vagrant_machines()
        .context("Failed to enumerate registered machines")?
    {
        let target = resolve_target(registered.machine.stage, options.update_current_stage);
        if target.reused_terminal {
            println!(
                "Warning: no stage follows \"{}\"; packaging \"{}\" as its current stage instead.",
                target.stage, registered.name
            );
        }

        runner
            .run(
                PACKAGE_PLAYBOOK,
                &json!({
                    "stagehand_vagrant_target_stage": target.stage.as_str(),
                    "stagehand_vagrant_hostname": registered.machine.hostname,
                    "stagehand_vagrant_package_dir": package_dir.display().to_string(),
                    "stagehand_vagrant_package_ref": package_ref,
                    "stagehand_vagrant_package_bump_version": options.bump_version.as_str(),
                }),
            )
            .with_context(|| format!("Failed to package machine '{}'", registered.name))?;

        // The machine now backs an image packaged for the target stage, so
        // its record is re-labeled to match.
        registered.machine.stage = target.stage;
        registered.write().with_context(|| {
            format!("Failed to persist stage for machine '{}'", registered.name)
        })?;
    }

    Ok(())
}

/// Print registered machines with their hostnames and stages.
///
/// # Errors
/// Returns an error if the registry cannot be read.
pub fn machines(configuration: &Configuration) -> Result<()> {
    let machines = configuration
        .registered_vagrant_machines()
        .context("Failed to enumerate registered machines")?;

    if machines.is_empty() {
        println!(
            "No Vagrant machines registered in {}",
            configuration.vagrant_dir().display()
        );
        return Ok(());
    }

    for registered in machines {
        println!(
            "  {} - hostname {}, stage {}",
            registered.name, registered.machine.hostname, registered.machine.stage
        );
    }

    Ok(())
}
