// File: streamguard-core/tests/test_utils/helpers.rs

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use streamguard_common::models::observation::{LiveStatus, Observation};
use streamguard_common::models::platform::Platform;
use streamguard_common::traits::platform_traits::{Notifier, StatusClient};
use streamguard_core::repositories::SqliteSettingsRepository;
use streamguard_core::{Database, Error};

/// Fresh, migrated in-memory database.
pub async fn setup_test_database() -> Result<Database, Error> {
    let db = Database::new(":memory:").await?;
    db.migrate().await?;
    Ok(db)
}

pub async fn setup_settings_repo() -> Result<SqliteSettingsRepository, Error> {
    let db = setup_test_database().await?;
    Ok(SqliteSettingsRepository::new(db.pool().clone()))
}

pub fn twitch_live(name: &str, title: &str, category: &str) -> Observation {
    Observation::Live(LiveStatus {
        display_name: name.to_string(),
        title: Some(title.to_string()),
        category: Some(category.to_string()),
        url: format!("https://www.twitch.tv/{name}"),
        items: Vec::new(),
    })
}

#[derive(Clone)]
enum Scripted {
    Status(Observation),
    Fail,
}

/// Status client whose answers are set by the test between ticks.
pub struct FakeStatusClient {
    platform: Platform,
    answers: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<String>>,
}

impl FakeStatusClient {
    pub fn new(platform: Platform) -> Arc<Self> {
        Arc::new(Self {
            platform,
            answers: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn set(&self, entity: &str, observation: Observation) {
        self.answers.lock().insert(entity.to_string(), Scripted::Status(observation));
    }

    pub fn set_offline(&self, entity: &str) {
        self.set(entity, Observation::Offline);
    }

    pub fn set_failing(&self, entity: &str) {
        self.answers.lock().insert(entity.to_string(), Scripted::Fail);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl StatusClient for FakeStatusClient {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn get_status(&self, entity_name: &str) -> Result<Observation, Error> {
        self.calls.lock().push(entity_name.to_string());
        match self.answers.lock().get(entity_name).cloned() {
            Some(Scripted::Status(obs)) => Ok(obs),
            Some(Scripted::Fail) => Err(Error::StatusFetch(format!("scripted failure for {entity_name}"))),
            None => Ok(Observation::Offline),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub destination: String,
    pub message: String,
    pub mention: Option<String>,
}

/// Notifier that records every message; optionally fails every send.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, destination: &str, message: &str, mention: Option<&str>) -> Result<(), Error> {
        self.sent.lock().push(SentMessage {
            destination: destination.to_string(),
            message: message.to_string(),
            mention: mention.map(str::to_string),
        });
        if self.fail {
            return Err(Error::Delivery("channel unavailable".into()));
        }
        Ok(())
    }
}
