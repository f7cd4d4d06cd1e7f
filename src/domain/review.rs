use super::policy::ApprovalPolicy;
use super::pos::PosId;
use super::user::UserId;
use crate::error::{ReviewError, Result, Violation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub u64);

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<ReviewId> for u64 {
    fn from(id: ReviewId) -> Self {
        id.0
    }
}

/// A review of a POS written by a user.
///
/// `approval_count` and `approved` are owned by the workflow; `approved` is
/// always recomputed from the count and never set on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Assigned by the store on first persistence.
    pub id: Option<ReviewId>,
    pub pos_id: PosId,
    pub author_id: UserId,
    pub text: String,
    pub approval_count: u32,
    pub approved: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Review {
    pub fn new(pos_id: PosId, author_id: UserId, text: impl Into<String>) -> Self {
        Self {
            id: None,
            pos_id,
            author_id,
            text: text.into(),
            approval_count: 0,
            approved: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Drops any client-supplied approval state before the first insert.
    pub fn reset_approvals(&mut self) {
        self.approval_count = 0;
        self.approved = false;
    }

    /// Records one approval by `approver` and recomputes the approval status.
    ///
    /// Leaves the review untouched when the approver is its author or the
    /// count cannot grow any further.
    pub fn approve(&mut self, approver: UserId, policy: &ApprovalPolicy) -> Result<()> {
        if self.author_id == approver {
            return Err(ReviewError::ValidationError(Violation::SelfApproval));
        }
        self.approval_count = self
            .approval_count
            .checked_add(1)
            .ok_or(ReviewError::ValidationError(Violation::ApprovalLimit))?;
        self.update_approval_status(policy);
        Ok(())
    }

    /// Replaces the review text. Approval state is left as it is.
    pub fn revise(&mut self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ReviewError::ValidationError(Violation::EmptyText));
        }
        self.text = text;
        Ok(())
    }

    pub fn update_approval_status(&mut self, policy: &ApprovalPolicy) {
        self.approved = policy.is_met(self.approval_count);
    }
}
