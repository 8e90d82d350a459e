//! Partial-failure policy

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a phase does with the rest of its batch after one entity fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnFailure {
    /// Stop the submission; later entities are not attempted
    #[default]
    Halt,
    /// Record the failure and continue with the next entity
    Skip,
}

impl FromStr for OnFailure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "halt" => Ok(OnFailure::Halt),
            "skip" => Ok(OnFailure::Skip),
            other => Err(format!("unknown failure policy '{other}' (expected halt or skip)")),
        }
    }
}

/// Failure handling for one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPolicy {
    pub variants: OnFailure,
    pub addons: OnFailure,
    /// Undo every write of the submission when a phase halts
    pub rollback_on_abort: bool,
}

impl Default for SubmissionPolicy {
    fn default() -> Self {
        Self {
            variants: OnFailure::Halt,
            addons: OnFailure::Skip,
            rollback_on_abort: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("HALT".parse::<OnFailure>(), Ok(OnFailure::Halt));
        assert_eq!(" skip".parse::<OnFailure>(), Ok(OnFailure::Skip));
        assert!("retry".parse::<OnFailure>().is_err());
    }

    #[test]
    fn test_default_policy() {
        let policy = SubmissionPolicy::default();
        assert_eq!(policy.variants, OnFailure::Halt);
        assert_eq!(policy.addons, OnFailure::Skip);
        assert!(!policy.rollback_on_abort);
    }
}
