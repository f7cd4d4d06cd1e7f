use crate::domain::policy::ApprovalPolicy;
use crate::domain::ports::{PosStoreBox, ReviewStoreBox, UserStoreBox};
use crate::domain::pos::{Pos, PosId};
use crate::domain::review::{Review, ReviewId};
use crate::domain::user::{User, UserId};
use crate::error::{Entity, Result, ReviewError, Violation};
use tracing::{debug, info};

/// The review workflow: creation, filtering and peer approval.
///
/// `ReviewEngine` owns the storage backends and the approval policy. Every
/// operation re-checks its preconditions against the current store state, in a
/// fixed order, and reports the first one that fails. Nothing is written when a
/// precondition fails.
pub struct ReviewEngine {
    review_store: ReviewStoreBox,
    user_store: UserStoreBox,
    pos_store: PosStoreBox,
    policy: ApprovalPolicy,
}

impl ReviewEngine {
    /// Creates a new `ReviewEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `review_store` - The store for reviews.
    /// * `user_store` - Resolves the users approving reviews.
    /// * `pos_store` - Resolves the reviewed points of sale.
    /// * `policy` - The approval quorum, fixed for the engine's lifetime.
    pub fn new(
        review_store: ReviewStoreBox,
        user_store: UserStoreBox,
        pos_store: PosStoreBox,
        policy: ApprovalPolicy,
    ) -> Self {
        Self {
            review_store,
            user_store,
            pos_store,
            policy,
        }
    }

    pub fn policy(&self) -> ApprovalPolicy {
        self.policy
    }

    /// Persists a new review.
    ///
    /// Fails with `NotFound` if the POS does not exist and with a duplicate-review
    /// validation error if the author already reviewed it. Approval state in the
    /// input is discarded: new reviews always start pending with no approvals.
    pub async fn create(&self, mut review: Review) -> Result<Review> {
        info!(
            pos = %review.pos_id,
            author = %review.author_id,
            "Preparing to create review"
        );

        let pos = self.require_pos(review.pos_id).await?;

        let existing = self
            .review_store
            .find_by_pos_and_author(pos.id, review.author_id)
            .await?;
        if !existing.is_empty() {
            return Err(ReviewError::ValidationError(Violation::DuplicateReview));
        }

        if review.text.trim().is_empty() {
            return Err(ReviewError::ValidationError(Violation::EmptyText));
        }

        review.id = None;
        review.created_at = None;
        review.updated_at = None;
        review.reset_approvals();

        let created = self.review_store.upsert(review).await?;
        info!(review = ?created.id, pos = %created.pos_id, "Created review");
        Ok(created)
    }

    /// Lists the reviews of a POS whose approval status equals `approved`.
    pub async fn filter(&self, pos_id: PosId, approved: bool) -> Result<Vec<Review>> {
        let pos = self.require_pos(pos_id).await?;
        self.review_store
            .find_by_pos_and_approval(pos.id, approved)
            .await
    }

    /// Records one approval of a review by a user.
    ///
    /// Checks run in this order: the user must be given and exist, the review
    /// id must be given, the review must exist, and the user must not be its
    /// author. The increment is applied to the stored version of the review
    /// inside the store's atomic update. Repeated approvals by the same user
    /// are counted every time.
    pub async fn approve(
        &self,
        review_id: Option<ReviewId>,
        user_id: Option<UserId>,
    ) -> Result<Review> {
        info!(
            review = ?review_id,
            user = ?user_id,
            "Processing approval request"
        );

        let approver = self.require_approver(user_id).await?;
        let review_id = review_id.ok_or(ReviewError::NotFound {
            entity: Entity::Review,
            id: None,
        })?;

        let policy = self.policy;
        let updated = self
            .review_store
            .update(
                review_id,
                Box::new(move |review: &mut Review| review.approve(approver.id, &policy)),
            )
            .await?;

        debug!(
            review = %review_id,
            approval_count = updated.approval_count,
            min_count = policy.min_count(),
            approved = updated.approved,
            "Updated approval status"
        );
        Ok(updated)
    }

    /// Replaces the text of an existing review.
    ///
    /// Only the text changes; the POS, the author and the approval state stay
    /// as stored. Fails with `NotFound` for an unknown review and rejects empty
    /// text without writing.
    pub async fn update(&self, id: ReviewId, text: impl Into<String>) -> Result<Review> {
        let text = text.into();
        info!(review = %id, "Updating review text");

        let updated = self
            .review_store
            .update(id, Box::new(move |review: &mut Review| review.revise(text)))
            .await?;

        debug!(review = %id, updated_at = ?updated.updated_at, "Updated review");
        Ok(updated)
    }

    pub async fn get_by_id(&self, id: ReviewId) -> Result<Review> {
        self.review_store
            .get(id)
            .await?
            .ok_or_else(|| ReviewError::not_found(Entity::Review, id))
    }

    pub async fn get_all(&self) -> Result<Vec<Review>> {
        self.review_store.get_all().await
    }

    /// Removes a review. Its author may review the POS again afterwards.
    pub async fn delete(&self, id: ReviewId) -> Result<()> {
        match self.review_store.delete(id).await? {
            Some(_) => {
                info!(review = %id, "Deleted review");
                Ok(())
            }
            None => Err(ReviewError::not_found(Entity::Review, id)),
        }
    }

    pub async fn register_pos(&self, pos: Pos) -> Result<()> {
        info!(pos = %pos.id, name = %pos.name, "Registering POS");
        self.pos_store.store(pos).await
    }

    pub async fn register_user(&self, user: User) -> Result<()> {
        info!(user = %user.id, login = %user.login_name, "Registering user");
        self.user_store.store(user).await
    }

    async fn require_pos(&self, id: PosId) -> Result<Pos> {
        self.pos_store
            .get(id)
            .await?
            .ok_or_else(|| ReviewError::not_found(Entity::Pos, id))
    }

    async fn require_approver(&self, id: Option<UserId>) -> Result<User> {
        let Some(id) = id else {
            return Err(ReviewError::ValidationError(Violation::InvalidUser));
        };
        self.user_store
            .get(id)
            .await?
            .ok_or(ReviewError::ValidationError(Violation::InvalidUser))
    }
}
