#![allow(dead_code)]

use posreview::application::engine::ReviewEngine;
use posreview::domain::policy::ApprovalPolicy;
use posreview::domain::pos::Pos;
use posreview::domain::user::User;
use posreview::infrastructure::in_memory::{
    InMemoryPosStore, InMemoryReviewStore, InMemoryUserStore,
};
use std::io::{Error, Write};
use tempfile::NamedTempFile;

pub const HEADER: &str = "op, pos, author, user, review, text";

/// Writes a command batch with the standard header to a temp file.
pub fn command_file(rows: &[&str]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "{HEADER}")?;
    for row in rows {
        writeln!(file, "{row}")?;
    }
    file.flush()?;
    Ok(file)
}

/// One POS, one author and `approvers` further users, then a single review
/// approved by every approver in turn.
pub fn approval_batch(approvers: u64) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "{HEADER}")?;
    writeln!(file, "pos, 1, , , , Mensa")?;
    writeln!(file, "user, , , 1, , author")?;
    writeln!(file, "create, 1, 1, , , Reliable lunch spot")?;
    for user in 2..approvers + 2 {
        writeln!(file, "user, , , {user}, , user{user}")?;
        writeln!(file, "approve, , , {user}, 1,")?;
    }
    file.flush()?;
    Ok(file)
}

/// An in-memory engine with POS 7 and 8 and users 1 through `users`.
pub async fn seeded_engine(min_count: u32, users: u64) -> ReviewEngine {
    let engine = ReviewEngine::new(
        Box::new(InMemoryReviewStore::new()),
        Box::new(InMemoryUserStore::new()),
        Box::new(InMemoryPosStore::new()),
        ApprovalPolicy::new(min_count).unwrap(),
    );
    engine.register_pos(Pos::new(7, "Mensa")).await.unwrap();
    engine
        .register_pos(Pos::new(8, "Cafe Botanik"))
        .await
        .unwrap();
    for id in 1..=users {
        engine
            .register_user(User::new(id, format!("user{id}")))
            .await
            .unwrap();
    }
    engine
}
