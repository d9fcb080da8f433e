pub mod model;
pub mod transformers;

pub use model::*;
pub use transformers::*;

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// The four pre-fit scalers and the store-type encoder, loaded once at
/// startup and shared read-only for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformerSet {
    pub competition_distance_scaler: FittedScaler,
    pub competition_time_month_scaler: FittedScaler,
    pub promo_time_week_scaler: FittedScaler,
    pub year_scaler: FittedScaler,
    pub store_type_encoder: LabelEncoder,
}

impl TransformerSet {
    /// Reads the five artifact files from the parameter directory.
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            competition_distance_scaler: load_json(&dir.join("competition_distance_scaler.json"))?,
            competition_time_month_scaler: load_json(
                &dir.join("competition_time_month_scaler.json"),
            )?,
            promo_time_week_scaler: load_json(&dir.join("promo_time_week_scaler.json"))?,
            year_scaler: load_json(&dir.join("year_scaler.json"))?,
            store_type_encoder: load_json(&dir.join("store_type_encoder.json"))?,
        })
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read artifact file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse artifact file: {}", path.display()))
}
