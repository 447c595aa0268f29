pub mod auth_service;
pub mod category_cache;
