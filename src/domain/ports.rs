//! Outbound ports the review workflow depends on.
//!
//! Lookups return `Ok(None)` for missing records; turning that into a
//! `NotFound` is up to the caller.

use super::pos::{Pos, PosId};
use super::review::{Review, ReviewId};
use super::user::{User, UserId};
use crate::error::Result;
use async_trait::async_trait;

/// A change applied to the stored version of a review.
///
/// Returning an error aborts the update without writing anything.
pub type ReviewMutation<'a> = Box<dyn FnOnce(&mut Review) -> Result<()> + Send + 'a>;

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn get(&self, id: ReviewId) -> Result<Option<Review>>;
    async fn get_all(&self) -> Result<Vec<Review>>;
    async fn find_by_pos_and_author(
        &self,
        pos_id: PosId,
        author_id: UserId,
    ) -> Result<Vec<Review>>;
    async fn find_by_pos_and_approval(
        &self,
        pos_id: PosId,
        approved: bool,
    ) -> Result<Vec<Review>>;

    /// Inserts a review without an id, or overwrites the stored one.
    ///
    /// Inserts assign the id and both timestamps and reject a second review
    /// for the same POS and author. Updates keep `created_at`.
    async fn upsert(&self, review: Review) -> Result<Review>;

    /// Atomically reads the current version, applies `mutation` and writes it back.
    ///
    /// Concurrent updates of the same review are serialized, so none is lost.
    async fn update(&self, id: ReviewId, mutation: ReviewMutation<'_>) -> Result<Review>;

    async fn delete(&self, id: ReviewId) -> Result<Option<Review>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn store(&self, user: User) -> Result<()>;
    async fn get(&self, id: UserId) -> Result<Option<User>>;
}

#[async_trait]
pub trait PosStore: Send + Sync {
    async fn store(&self, pos: Pos) -> Result<()>;
    async fn get(&self, id: PosId) -> Result<Option<Pos>>;
}

pub type ReviewStoreBox = Box<dyn ReviewStore>;
pub type UserStoreBox = Box<dyn UserStore>;
pub type PosStoreBox = Box<dyn PosStore>;
