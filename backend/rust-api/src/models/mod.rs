pub mod auth;
pub mod problems;
