// src/lib.rs

pub mod db;
pub mod health;
pub mod platforms;
pub mod repositories;
pub mod services;
pub mod tasks;

pub use db::Database;
pub use streamguard_common::error::Error;
