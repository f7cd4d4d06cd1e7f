//! Application layer containing the review workflow.
//!
//! This module defines the `ReviewEngine`, the single entry point for creating,
//! listing and approving reviews. It holds no state of its own besides the
//! approval policy; all shared state lives behind the storage ports.

pub mod engine;
