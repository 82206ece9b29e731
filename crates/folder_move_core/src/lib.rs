//! Shared folder-move domain primitives.
//!
//! This crate owns the request/response contract, request validation and the
//! key layout of a game folder. It intentionally excludes AWS SDK and Lambda
//! runtime concerns.

pub mod contract;
pub mod storage_keys;
