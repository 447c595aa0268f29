pub mod category_routes;
pub mod task_routes;
pub mod user_routes;
