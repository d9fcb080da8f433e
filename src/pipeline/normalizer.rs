use chrono::{Datelike, NaiveDate};

use crate::models::{NormalizedRecord, RawStoreRecord};
use crate::pipeline::error::PipelineError;

/// Sentinel distance for "no known competitor nearby", far beyond any
/// realistic competitor.
pub const NO_COMPETITION_DISTANCE: f64 = 200_000.0;

/// Sentinel interval for "store never runs recurring promos".
pub const PROMO_INTERVAL_NONE: &str = "0";

// Fev and Out are the upstream system's own abbreviations for February and
// October; promo intervals are matched against these exact strings.
const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Out", "Nov", "Dec",
];

/// First pipeline stage: canonical field naming, date parsing, imputation
/// of competition/promotion fields and the derived `is_promo` flag.
pub struct Normalizer;

impl Normalizer {
    pub fn clean(&self, records: &[RawStoreRecord]) -> Result<Vec<NormalizedRecord>, PipelineError> {
        records.iter().map(clean_record).collect()
    }
}

fn clean_record(raw: &RawStoreRecord) -> Result<NormalizedRecord, PipelineError> {
    let date = parse_date(&raw.date)?;

    let competition_distance = raw
        .competition_distance
        .filter(|distance| !distance.is_nan())
        .unwrap_or(NO_COMPETITION_DISTANCE);

    // Missing competition fields assume the competitor opened on the
    // record's own date; missing promo2 fields anchor to the record's week.
    let competition_open_since_month = impute_u32(raw.competition_open_since_month, date.month());
    let competition_open_since_year = impute_i32(raw.competition_open_since_year, date.year());
    let promo2_since_week = impute_u32(raw.promo2_since_week, date.iso_week().week());
    let promo2_since_year = impute_i32(raw.promo2_since_year, date.year());

    let promo_interval = raw
        .promo_interval
        .as_deref()
        .filter(|interval| !interval.is_empty())
        .unwrap_or(PROMO_INTERVAL_NONE)
        .to_string();
    let is_promo = derive_is_promo(&promo_interval, date.month());

    Ok(NormalizedRecord {
        store: raw.store,
        day_of_week: raw.day_of_week,
        date,
        open: raw.open.filter(|open| !open.is_nan()).map(|open| open as i64),
        promo: raw.promo,
        state_holiday: raw.state_holiday.clone(),
        school_holiday: raw.school_holiday,
        store_type: raw.store_type.clone(),
        assortment: raw.assortment.clone(),
        competition_distance,
        competition_open_since_month,
        competition_open_since_year,
        promo2: raw.promo2,
        promo2_since_week,
        promo2_since_year,
        promo_interval,
        is_promo,
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, PipelineError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| PipelineError::MalformedInput(format!("unparsable date '{raw}': {e}")))
}

fn impute_u32(value: Option<f64>, fallback: u32) -> u32 {
    match value {
        Some(v) if !v.is_nan() => v as u32,
        _ => fallback,
    }
}

fn impute_i32(value: Option<f64>, fallback: i32) -> i32 {
    match value {
        Some(v) if !v.is_nan() => v as i32,
        _ => fallback,
    }
}

pub(crate) fn month_abbreviation(month: u32) -> &'static str {
    MONTH_ABBREVIATIONS[month as usize - 1]
}

/// 0 for the sentinel interval; otherwise 1 iff the record month's
/// abbreviation appears verbatim in the comma-separated interval.
fn derive_is_promo(promo_interval: &str, month: u32) -> u8 {
    if promo_interval == PROMO_INTERVAL_NONE {
        return 0;
    }
    let abbreviation = month_abbreviation(month);
    if promo_interval.split(',').any(|entry| entry == abbreviation) {
        1
    } else {
        0
    }
}
