//! SeaORM entities mapping to database tables, one module per table.

pub mod category;
pub mod task;
pub mod user;
