use std::f64::consts::PI;

use crate::artifacts::TransformerSet;
use crate::models::{EngineeredRecord, PreparedRecord};
use crate::pipeline::error::PipelineError;

/// Third pipeline stage: rescaling through the pre-fit transformers,
/// categorical encoding and cyclical encoding of the periodic calendar
/// fields. Transformers are applied strictly read-only.
pub struct FeaturePreparer<'a> {
    transformers: &'a TransformerSet,
}

impl<'a> FeaturePreparer<'a> {
    pub fn new(transformers: &'a TransformerSet) -> Self {
        Self { transformers }
    }

    pub fn transform(
        &self,
        records: &[EngineeredRecord],
    ) -> Result<Vec<PreparedRecord>, PipelineError> {
        records.iter().map(|r| self.prepare_record(r)).collect()
    }

    fn prepare_record(&self, record: &EngineeredRecord) -> Result<PreparedRecord, PipelineError> {
        let t = self.transformers;

        let store_type = t.store_type_encoder.transform(&record.store_type).ok_or_else(|| {
            PipelineError::Schema(format!(
                "store_type '{}' is not in the fitted encoder vocabulary",
                record.store_type
            ))
        })?;

        let (day_of_week_sin, day_of_week_cos) = cyclical(f64::from(record.day_of_week), 7.0);
        let (month_sin, month_cos) = cyclical(f64::from(record.month), 12.0);
        let (day_sin, day_cos) = cyclical(f64::from(record.day), 30.0);
        let (week_of_year_sin, week_of_year_cos) = cyclical(f64::from(record.week_of_year), 52.0);

        Ok(PreparedRecord {
            store: f64::from(record.store),
            promo: f64::from(record.promo),
            store_type,
            assortment: assortment_ordinal(&record.assortment)?,
            competition_distance: t
                .competition_distance_scaler
                .transform(record.competition_distance),
            competition_open_since_month: f64::from(record.competition_open_since_month),
            competition_open_since_year: f64::from(record.competition_open_since_year),
            promo2: f64::from(record.promo2),
            promo2_since_week: f64::from(record.promo2_since_week),
            promo2_since_year: f64::from(record.promo2_since_year),
            competition_time_month: t
                .competition_time_month_scaler
                .transform(record.competition_time_month as f64),
            promo_time_week: t
                .promo_time_week_scaler
                .transform(record.promo_time_week as f64),
            year: t.year_scaler.transform(f64::from(record.year)),
            state_holiday_public_holiday: record.state_holiday == "public_holiday",
            state_holiday_easter_holiday: record.state_holiday == "easter_holiday",
            state_holiday_christmas: record.state_holiday == "christmas",
            state_holiday_regular_day: record.state_holiday == "regular_day",
            day_of_week_sin,
            day_of_week_cos,
            month_sin,
            month_cos,
            day_sin,
            day_cos,
            week_of_year_sin,
            week_of_year_cos,
        })
    }
}

/// Sine/cosine pair for a periodic value: `sin(v·2π/p)`, `cos(v·2π/p)`.
/// No modulo is applied; the period constant alone wraps the metric.
pub fn cyclical(value: f64, period: f64) -> (f64, f64) {
    let angle = value * (2.0 * PI / period);
    (angle.sin(), angle.cos())
}

/// Fixed ordinal table from the training pipeline.
fn assortment_ordinal(label: &str) -> Result<f64, PipelineError> {
    match label {
        "basic" => Ok(1.0),
        "extra" => Ok(2.0),
        "extended" => Ok(3.0),
        other => Err(PipelineError::Schema(format!(
            "assortment label '{other}' is not in the ordinal table"
        ))),
    }
}
