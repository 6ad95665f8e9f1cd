pub mod db;
pub mod engine;
pub mod handlers;
pub mod models;
pub mod result;
pub mod shuffle;
pub mod store;
