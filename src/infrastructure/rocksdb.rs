use crate::domain::ports::{PosStore, ReviewMutation, ReviewStore, UserStore};
use crate::domain::pos::{Pos, PosId};
use crate::domain::review::{Review, ReviewId};
use crate::domain::user::{User, UserId};
use crate::error::{Entity, Result, ReviewError, Violation};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing reviews.
pub const CF_REVIEWS: &str = "reviews";
/// Column Family for storing users.
pub const CF_USERS: &str = "users";
/// Column Family for storing points of sale.
pub const CF_POS: &str = "pos";
/// Column Family for bookkeeping such as the review id sequence.
pub const CF_META: &str = "meta";

const REVIEW_SEQ_KEY: &[u8] = b"review_seq";

/// A persistent store implementation using RocksDB.
///
/// Reviews, users and POS live in separate Column Families, keyed by their
/// big-endian id so iteration yields id order. Review writes are serialized
/// through `write_lock`, which makes `update` an atomic read-modify-write and
/// keeps the uniqueness check of `upsert` race free.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that all required column families exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_REVIEWS, CF_USERS, CF_POS, CF_META]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &'static str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            ReviewError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &'static str, id: u64) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_pinned_cf(cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, cf_name: &'static str, id: u64, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        self.db.put_cf(cf, id.to_be_bytes(), encode(value)?)?;
        Ok(())
    }

    fn scan_reviews(&self, keep: impl Fn(&Review) -> bool) -> Result<Vec<Review>> {
        let cf = self.cf(CF_REVIEWS)?;
        let mut reviews = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let review: Review = decode(&value)?;
            if keep(&review) {
                reviews.push(review);
            }
        }
        Ok(reviews)
    }

    fn last_review_id(&self) -> Result<u64> {
        let meta = self.cf(CF_META)?;
        match self.db.get_pinned_cf(meta, REVIEW_SEQ_KEY)? {
            Some(bytes) => {
                let raw = <[u8; 8]>::try_from(&bytes[..])
                    .map_err(|e| ReviewError::InternalError(Box::new(e)))?;
                Ok(u64::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| ReviewError::InternalError(Box::new(e)))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| ReviewError::InternalError(Box::new(e)))
}

#[async_trait]
impl ReviewStore for RocksDBStore {
    async fn get(&self, id: ReviewId) -> Result<Option<Review>> {
        self.read(CF_REVIEWS, id.0)
    }

    async fn get_all(&self) -> Result<Vec<Review>> {
        self.scan_reviews(|_| true)
    }

    async fn find_by_pos_and_author(
        &self,
        pos_id: PosId,
        author_id: UserId,
    ) -> Result<Vec<Review>> {
        self.scan_reviews(|r| r.pos_id == pos_id && r.author_id == author_id)
    }

    async fn find_by_pos_and_approval(
        &self,
        pos_id: PosId,
        approved: bool,
    ) -> Result<Vec<Review>> {
        self.scan_reviews(|r| r.pos_id == pos_id && r.approved == approved)
    }

    async fn upsert(&self, mut review: Review) -> Result<Review> {
        let _guard = self.write_lock.lock().await;
        let now = Utc::now();

        match review.id {
            None => {
                let pos_id = review.pos_id;
                let author_id = review.author_id;
                if !self
                    .scan_reviews(|r| r.pos_id == pos_id && r.author_id == author_id)?
                    .is_empty()
                {
                    return Err(ReviewError::ValidationError(Violation::DuplicateReview));
                }

                let id = ReviewId(self.last_review_id()? + 1);
                review.id = Some(id);
                review.created_at = Some(now);
                review.updated_at = Some(now);

                // Sequence and row land together or not at all
                let mut batch = WriteBatch::default();
                batch.put_cf(self.cf(CF_META)?, REVIEW_SEQ_KEY, id.0.to_be_bytes());
                batch.put_cf(self.cf(CF_REVIEWS)?, id.0.to_be_bytes(), encode(&review)?);
                self.db.write(batch)?;
            }
            Some(id) => {
                let existing: Review = self
                    .read(CF_REVIEWS, id.0)?
                    .ok_or_else(|| ReviewError::not_found(Entity::Review, id))?;
                review.pos_id = existing.pos_id;
                review.author_id = existing.author_id;
                review.approval_count = existing.approval_count;
                review.approved = existing.approved;
                review.created_at = existing.created_at;
                review.updated_at = Some(now);
                self.write(CF_REVIEWS, id.0, &review)?;
            }
        }

        Ok(review)
    }

    async fn update(&self, id: ReviewId, mutation: ReviewMutation<'_>) -> Result<Review> {
        let _guard = self.write_lock.lock().await;
        let current: Review = self
            .read(CF_REVIEWS, id.0)?
            .ok_or_else(|| ReviewError::not_found(Entity::Review, id))?;

        let mut next = current.clone();
        mutation(&mut next)?;
        next.id = Some(id);
        next.pos_id = current.pos_id;
        next.author_id = current.author_id;
        next.created_at = current.created_at;
        next.updated_at = Some(Utc::now());
        self.write(CF_REVIEWS, id.0, &next)?;

        Ok(next)
    }

    async fn delete(&self, id: ReviewId) -> Result<Option<Review>> {
        let _guard = self.write_lock.lock().await;
        let existing: Option<Review> = self.read(CF_REVIEWS, id.0)?;
        if existing.is_some() {
            self.db.delete_cf(self.cf(CF_REVIEWS)?, id.0.to_be_bytes())?;
        }
        Ok(existing)
    }
}

#[async_trait]
impl UserStore for RocksDBStore {
    async fn store(&self, user: User) -> Result<()> {
        self.write(CF_USERS, user.id.0, &user)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>> {
        self.read(CF_USERS, id.0)
    }
}

#[async_trait]
impl PosStore for RocksDBStore {
    async fn store(&self, pos: Pos) -> Result<()> {
        self.write(CF_POS, pos.id.0, &pos)
    }

    async fn get(&self, id: PosId) -> Result<Option<Pos>> {
        self.read(CF_POS, id.0)
    }
}
