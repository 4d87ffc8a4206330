//! Saved calculations, custom fee presets and alert settings.
//!
//! Each collection is one JSON document under a fixed key in a
//! [`KeyValueStore`]. Lists are kept newest first and capped; a corrupt
//! document is dropped on read instead of failing the caller.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{DEFAULT_HISTORY_LIMIT, DEFAULT_PRESET_LIMIT};
use crate::domain::{FeePreset, MarginInput, Platform};
use crate::engine::{compute, AlertSettings};
use crate::store::{KeyValueStore, StoreError};

pub const CALCULATIONS_KEY: &str = "seller-margin-calculations";
pub const PRESETS_KEY: &str = "seller-margin-presets";
pub const ALERT_SETTINGS_KEY: &str = "seller-margin-alert-settings";

/// Serialized history larger than this is trimmed and reported as full.
pub const MAX_HISTORY_BYTES: usize = 4 * 1024 * 1024;
/// Entries kept after an oversize history is trimmed.
pub const TRIMMED_HISTORY_LEN: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationSummary {
    pub net_payout: f64,
    pub net_margin_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCalculation {
    pub id: String,
    pub name: String,
    pub platform: Platform,
    pub input_data: MarginInput,
    /// Unix milliseconds.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<CalculationSummary>,
}

impl SavedCalculation {
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomPreset {
    pub id: String,
    pub name: String,
    pub base_fee_rate: f64,
    pub linkage_fee_rate: f64,
    pub shipping_fee_rate: f64,
    #[serde(default)]
    pub platform_fee_rate: f64,
    #[serde(default)]
    pub payment_fee_rate: f64,
    #[serde(default)]
    pub extra_fee_rate: f64,
    /// Unix milliseconds.
    pub timestamp: i64,
}

impl CustomPreset {
    pub fn fee_preset(&self) -> FeePreset {
        FeePreset::new(
            self.base_fee_rate,
            self.linkage_fee_rate,
            self.shipping_fee_rate,
        )
    }
}

fn new_id(prefix: &str, timestamp: i64) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, timestamp, &suffix[..9])
}

/// Keep only objects carrying a string `id` and an integer `timestamp`.
fn valid_entries<T: DeserializeOwned>(items: Vec<serde_json::Value>) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| {
            item.get("id").map_or(false, |v| v.is_string())
                && item.get("timestamp").map_or(false, |v| v.is_i64())
        })
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

#[derive(Debug, Clone)]
pub struct HistoryManager {
    store: Arc<dyn KeyValueStore>,
    history_limit: usize,
    preset_limit: usize,
}

impl HistoryManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            history_limit: DEFAULT_HISTORY_LIMIT,
            preset_limit: DEFAULT_PRESET_LIMIT,
        }
    }

    pub fn with_limits(mut self, history_limit: usize, preset_limit: usize) -> Self {
        self.history_limit = history_limit.max(1);
        self.preset_limit = preset_limit.max(1);
        self
    }

    async fn load_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        let Some(data) = self.store.get(key).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<serde_json::Value>(&data) {
            Ok(serde_json::Value::Array(items)) => Ok(valid_entries(items)),
            Ok(_) => {
                debug!(key, "stored value is not a list");
                Ok(Vec::new())
            }
            Err(e) => {
                warn!(key, error = %e, "dropping corrupt stored data");
                self.store.delete(key).await?;
                Ok(Vec::new())
            }
        }
    }

    /// Save a calculation at the head of the history and return its id.
    ///
    /// # Errors
    /// [`StoreError::StorageFull`] when the serialized history is too large;
    /// the history is trimmed to the most recent entries before returning.
    pub async fn save_calculation(
        &self,
        name: &str,
        platform: Platform,
        input: &MarginInput,
    ) -> Result<String, StoreError> {
        let timestamp = Utc::now().timestamp_millis();
        let result = compute(input);
        let saved = SavedCalculation {
            id: new_id("calc", timestamp),
            name: name.to_string(),
            platform,
            input_data: input.clone(),
            timestamp,
            result: Some(CalculationSummary {
                net_payout: result.net_payout,
                net_margin_rate: result.net_margin_rate,
            }),
        };
        let id = saved.id.clone();

        let mut entries: Vec<SavedCalculation> = self.load_list(CALCULATIONS_KEY).await?;
        entries.insert(0, saved);
        entries.truncate(self.history_limit);

        let data = serde_json::to_string(&entries)?;
        if data.len() > MAX_HISTORY_BYTES {
            entries.truncate(TRIMMED_HISTORY_LEN);
            self.store
                .set(CALCULATIONS_KEY, &serde_json::to_string(&entries)?)
                .await?;
            warn!(bytes = data.len(), kept = entries.len(), "history trimmed");
            return Err(StoreError::StorageFull(format!(
                "history exceeded {} bytes; kept the {} most recent entries",
                MAX_HISTORY_BYTES,
                entries.len()
            )));
        }

        self.store.set(CALCULATIONS_KEY, &data).await?;
        info!(id = %id, platform = %platform, "calculation saved");
        Ok(id)
    }

    /// Saved calculations, newest first.
    pub async fn calculations(&self) -> Result<Vec<SavedCalculation>, StoreError> {
        self.load_list(CALCULATIONS_KEY).await
    }

    pub async fn calculation(&self, id: &str) -> Result<SavedCalculation, StoreError> {
        self.calculations()
            .await?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Remove a calculation. Unknown ids are ignored.
    pub async fn delete_calculation(&self, id: &str) -> Result<(), StoreError> {
        let mut entries: Vec<SavedCalculation> = self.load_list(CALCULATIONS_KEY).await?;
        entries.retain(|c| c.id != id);
        self.store
            .set(CALCULATIONS_KEY, &serde_json::to_string(&entries)?)
            .await?;
        debug!(id, "calculation deleted");
        Ok(())
    }

    pub async fn clear_calculations(&self) -> Result<(), StoreError> {
        self.store.delete(CALCULATIONS_KEY).await?;
        info!("history cleared");
        Ok(())
    }

    /// Save a named set of fee rates and return its id.
    pub async fn save_preset(&self, name: &str, rates: FeePreset) -> Result<String, StoreError> {
        let timestamp = Utc::now().timestamp_millis();
        let preset = CustomPreset {
            id: new_id("preset", timestamp),
            name: name.to_string(),
            base_fee_rate: rates.base_fee_rate,
            linkage_fee_rate: rates.linkage_fee_rate,
            shipping_fee_rate: rates.shipping_fee_rate,
            platform_fee_rate: rates.base_fee_rate,
            payment_fee_rate: rates.linkage_fee_rate,
            extra_fee_rate: 0.0,
            timestamp,
        };
        let id = preset.id.clone();

        let mut presets: Vec<CustomPreset> = self.load_list(PRESETS_KEY).await?;
        presets.insert(0, preset);
        presets.truncate(self.preset_limit);
        self.store
            .set(PRESETS_KEY, &serde_json::to_string(&presets)?)
            .await?;
        info!(id = %id, name, "preset saved");
        Ok(id)
    }

    pub async fn presets(&self) -> Result<Vec<CustomPreset>, StoreError> {
        self.load_list(PRESETS_KEY).await
    }

    pub async fn delete_preset(&self, id: &str) -> Result<(), StoreError> {
        let mut presets: Vec<CustomPreset> = self.load_list(PRESETS_KEY).await?;
        presets.retain(|p| p.id != id);
        self.store
            .set(PRESETS_KEY, &serde_json::to_string(&presets)?)
            .await?;
        debug!(id, "preset deleted");
        Ok(())
    }

    /// Stored alert settings, or `fallback` when none are stored or the
    /// stored value is malformed.
    pub async fn alert_settings(&self, fallback: AlertSettings) -> Result<AlertSettings, StoreError> {
        let Some(data) = self.store.get(ALERT_SETTINGS_KEY).await? else {
            return Ok(fallback);
        };
        match serde_json::from_str(&data) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!(error = %e, "ignoring invalid alert settings");
                Ok(fallback)
            }
        }
    }

    pub async fn save_alert_settings(&self, settings: &AlertSettings) -> Result<(), StoreError> {
        self.store
            .set(ALERT_SETTINGS_KEY, &serde_json::to_string(settings)?)
            .await?;
        debug!(?settings, "alert settings saved");
        Ok(())
    }
}
