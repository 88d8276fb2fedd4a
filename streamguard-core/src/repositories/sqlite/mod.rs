// src/repositories/sqlite/mod.rs

pub mod settings;

pub use self::settings::SqliteSettingsRepository;
