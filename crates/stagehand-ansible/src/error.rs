use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnsibleError {
    #[error("playbook not found: {0}")]
    PlaybookNotFound(String),

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("playbook {playbook} failed with {status}")]
    PlaybookFailed {
        playbook: String,
        status: std::process::ExitStatus,
    },

    #[error("failed to encode playbook variables: {0}")]
    Variables(#[from] serde_json::Error),
}
