pub mod config;
pub mod dates;
pub mod db;
pub mod services;
pub mod web;
