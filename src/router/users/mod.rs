//! Profile-related HTTP API: read, partial update, soft delete.

pub mod delete;
pub mod get;
pub mod patch;
