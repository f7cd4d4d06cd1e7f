//! Domain model: reviews, the entities they reference, the approval policy
//! and the storage ports.

pub mod policy;
pub mod ports;
pub mod pos;
pub mod review;
pub mod user;
