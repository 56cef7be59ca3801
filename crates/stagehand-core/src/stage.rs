use crate::CoreError;
use std::fmt;
use std::str::FromStr;

/// A machine's position in the image pipeline.
///
/// The set is closed and strictly ordered: `Bare < Base < Install`. The
/// wire form is the lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Bare,
    Base,
    Install,
}

impl Stage {
    /// The stage that follows this one in the pipeline, or `None` for the
    /// terminal stage.
    #[must_use]
    pub fn successor(self) -> Option<Stage> {
        match self {
            Stage::Bare => Some(Stage::Base),
            Stage::Base => Some(Stage::Install),
            Stage::Install => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Bare => "bare",
            Stage::Base => "base",
            Stage::Install => "install",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bare" => Ok(Stage::Bare),
            "base" => Ok(Stage::Base),
            "install" => Ok(Stage::Install),
            other => Err(CoreError::UnknownStage(other.to_string())),
        }
    }
}
