// streamguard-core/src/services/mod.rs

pub mod discord;
pub mod notification;
