use crate::domain::ports::{PosStore, ReviewMutation, ReviewStore, UserStore};
use crate::domain::pos::{Pos, PosId};
use crate::domain::review::{Review, ReviewId};
use crate::domain::user::{User, UserId};
use crate::error::{Entity, Result, ReviewError, Violation};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct ReviewTable {
    last_id: u64,
    rows: BTreeMap<ReviewId, Review>,
}

/// A thread-safe in-memory store for reviews.
///
/// Rows are kept in id order, which is the natural order of every listing.
/// All writes, including `update`, hold the table's write lock for the whole
/// read-modify-write, so concurrent approvals of one review are serialized.
#[derive(Default, Clone)]
pub struct InMemoryReviewStore {
    table: Arc<RwLock<ReviewTable>>,
}

impl InMemoryReviewStore {
    /// Creates a new, empty in-memory review store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn get(&self, id: ReviewId) -> Result<Option<Review>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Review>> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn find_by_pos_and_author(
        &self,
        pos_id: PosId,
        author_id: UserId,
    ) -> Result<Vec<Review>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|r| r.pos_id == pos_id && r.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn find_by_pos_and_approval(
        &self,
        pos_id: PosId,
        approved: bool,
    ) -> Result<Vec<Review>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|r| r.pos_id == pos_id && r.approved == approved)
            .cloned()
            .collect())
    }

    async fn upsert(&self, mut review: Review) -> Result<Review> {
        let mut table = self.table.write().await;
        let now = Utc::now();

        match review.id {
            None => {
                if table
                    .rows
                    .values()
                    .any(|r| r.pos_id == review.pos_id && r.author_id == review.author_id)
                {
                    return Err(ReviewError::ValidationError(Violation::DuplicateReview));
                }
                table.last_id += 1;
                let id = ReviewId(table.last_id);
                review.id = Some(id);
                review.created_at = Some(now);
                review.updated_at = Some(now);
                table.rows.insert(id, review.clone());
            }
            Some(id) => {
                let existing = table
                    .rows
                    .get_mut(&id)
                    .ok_or_else(|| ReviewError::not_found(Entity::Review, id))?;
                // POS, author and approvals are fixed by the store once the review exists
                review.pos_id = existing.pos_id;
                review.author_id = existing.author_id;
                review.approval_count = existing.approval_count;
                review.approved = existing.approved;
                review.created_at = existing.created_at;
                review.updated_at = Some(now);
                *existing = review.clone();
            }
        }

        Ok(review)
    }

    async fn update(&self, id: ReviewId, mutation: ReviewMutation<'_>) -> Result<Review> {
        let mut table = self.table.write().await;
        let row = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| ReviewError::not_found(Entity::Review, id))?;

        let mut next = row.clone();
        mutation(&mut next)?;
        next.id = Some(id);
        next.pos_id = row.pos_id;
        next.author_id = row.author_id;
        next.created_at = row.created_at;
        next.updated_at = Some(Utc::now());
        *row = next.clone();

        Ok(next)
    }

    async fn delete(&self, id: ReviewId) -> Result<Option<Review>> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id))
    }
}

/// A thread-safe in-memory store for users.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn store(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        users.insert(user.id, user);
        Ok(())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }
}

/// A thread-safe in-memory store for points of sale.
#[derive(Default, Clone)]
pub struct InMemoryPosStore {
    pos: Arc<RwLock<HashMap<PosId, Pos>>>,
}

impl InMemoryPosStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PosStore for InMemoryPosStore {
    async fn store(&self, pos: Pos) -> Result<()> {
        let mut entries = self.pos.write().await;
        entries.insert(pos.id, pos);
        Ok(())
    }

    async fn get(&self, id: PosId) -> Result<Option<Pos>> {
        let entries = self.pos.read().await;
        Ok(entries.get(&id).cloned())
    }
}
