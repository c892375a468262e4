//! Analytics consent storage for the onboarding flow.
//!
//! The user's choice is persisted in the settings table and exposed as an
//! observable state, mirroring the onboarding consent screen's view model.

use crate::db::Database;
use crate::events::{Publisher, Subscription};
use anyhow::Result;
use std::sync::Mutex;
use tracing::info;

/// Where the consent text points users for the full policy
pub const PRIVACY_POLICY_URL: &str = "https://nekome.app/privacy";

const ANALYTICS_KEY: &str = "analytics_enabled";

/// Persisted analytics opt-in state
pub struct ConsentStore {
    db: Mutex<Database>,
    publisher: Publisher<bool>,
}

impl ConsentStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Mutex::new(db),
            publisher: Publisher::new(),
        }
    }

    /// The stored choice; None when the user has not been asked yet
    pub fn analytics_enabled(&self) -> Result<Option<bool>> {
        let db = self.db.lock().unwrap_or_else(|e| e.into_inner());
        Ok(db
            .get_setting(ANALYTICS_KEY)?
            .map(|value| value == "true"))
    }

    /// Persist the user's choice and notify observers
    pub fn save_analytics_choice(&self, enabled: bool) -> Result<()> {
        {
            let mut db = self.db.lock().unwrap_or_else(|e| e.into_inner());
            db.set_setting(ANALYTICS_KEY, if enabled { "true" } else { "false" })?;
        }

        info!(enabled = enabled, "Analytics choice saved");
        self.publisher.publish(&enabled);
        Ok(())
    }

    /// Observe changes to the consent state
    pub fn observe(&self, callback: impl Fn(&bool) + Send + 'static) -> Subscription {
        self.publisher.subscribe(callback)
    }
}
