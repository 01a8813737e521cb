pub mod archive;
pub mod auth;
pub mod database;
pub mod pdf;
