//! The `services` module provides a high-level API for interacting with the database.
//! It encapsulates the query logic and data access patterns, allowing the rest of
//! the application (HTTP handlers, caches) to work with domain models without
//! needing to know about the underlying schema or queries.
//!
//! Every public function takes the owning `user_id` and conjoins it into its
//! predicate; there is no query path that is not owner-scoped.

pub mod category_service;
pub mod task_service;
pub mod user_service;
