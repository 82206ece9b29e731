//! AWS-oriented adapters and handlers for moving a game folder between buckets.
//!
//! This crate owns runtime integration details (the Lambda handler, the S3
//! adapter, logging and environment configuration). Contract and key layout
//! primitives live in `folder_move_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod logging;
