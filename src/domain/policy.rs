use crate::error::{ReviewError, Result};

/// Default quorum when nothing else is configured.
pub const DEFAULT_MIN_APPROVALS: u32 = 3;

/// The approval quorum a review must reach to become approved.
///
/// Built once from configuration and handed to the engine by value; it is
/// never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalPolicy {
    min_count: u32,
}

impl ApprovalPolicy {
    /// Fails with `ConfigError` for a quorum of zero.
    pub fn new(min_count: u32) -> Result<Self> {
        if min_count == 0 {
            return Err(ReviewError::ConfigError(
                "minimum approval count must be at least 1".to_string(),
            ));
        }
        Ok(Self { min_count })
    }

    pub fn min_count(&self) -> u32 {
        self.min_count
    }

    pub fn is_met(&self, approval_count: u32) -> bool {
        approval_count >= self.min_count
    }
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            min_count: DEFAULT_MIN_APPROVALS,
        }
    }
}
