pub mod database;
pub mod services;
pub mod store;
