use chrono::NaiveDate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// A raw store/calendar record as submitted by clients, keyed by the
/// upstream system's PascalCase field names. Fields that may be absent or
/// null in the wire format are `Option`s; the Normalizer imputes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStoreRecord {
    #[serde(rename = "Store")]
    pub store: u32,
    #[serde(rename = "DayOfWeek")]
    pub day_of_week: u32,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Open", default)]
    pub open: Option<f64>,
    #[serde(rename = "Promo")]
    pub promo: u32,
    #[serde(rename = "StateHoliday")]
    pub state_holiday: String,
    #[serde(rename = "SchoolHoliday")]
    pub school_holiday: u32,
    #[serde(rename = "StoreType")]
    pub store_type: String,
    #[serde(rename = "Assortment")]
    pub assortment: String,
    #[serde(rename = "CompetitionDistance", default)]
    pub competition_distance: Option<f64>,
    #[serde(rename = "CompetitionOpenSinceMonth", default)]
    pub competition_open_since_month: Option<f64>,
    #[serde(rename = "CompetitionOpenSinceYear", default)]
    pub competition_open_since_year: Option<f64>,
    #[serde(rename = "Promo2")]
    pub promo2: u32,
    #[serde(rename = "Promo2SinceWeek", default)]
    pub promo2_since_week: Option<f64>,
    #[serde(rename = "Promo2SinceYear", default)]
    pub promo2_since_year: Option<f64>,
    #[serde(rename = "PromoInterval", default)]
    pub promo_interval: Option<String>,
}

/// Normalizer output: canonical snake_case fields, parsed date, all
/// imputations applied, month/year/week fields integer-typed.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub store: u32,
    pub day_of_week: u32,
    pub date: NaiveDate,
    pub open: Option<i64>,
    pub promo: u32,
    pub state_holiday: String,
    pub school_holiday: u32,
    pub store_type: String,
    pub assortment: String,
    pub competition_distance: f64,
    pub competition_open_since_month: u32,
    pub competition_open_since_year: i32,
    pub promo2: u32,
    pub promo2_since_week: u32,
    pub promo2_since_year: i32,
    pub promo_interval: String,
    pub is_promo: u8,
}

impl NormalizedRecord {
    /// The closed-store predicate: a record survives feature engineering
    /// iff `open` is absent or equal to 1.
    pub fn is_open(&self) -> bool {
        self.open.is_none_or(|open| open == 1)
    }
}

/// Feature Engineer output: calendar parts, elapsed-time features and
/// recoded categorical labels. `open` and `promo_interval` are gone from
/// the record at this stage.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineeredRecord {
    pub store: u32,
    pub day_of_week: u32,
    pub date: NaiveDate,
    pub promo: u32,
    pub state_holiday: String,
    pub school_holiday: u32,
    pub store_type: String,
    pub assortment: String,
    pub competition_distance: f64,
    pub competition_open_since_month: u32,
    pub competition_open_since_year: i32,
    pub promo2: u32,
    pub promo2_since_week: u32,
    pub promo2_since_year: i32,
    pub is_promo: u8,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub week_of_year: u32,
    pub year_week: String,
    pub competition_since: NaiveDate,
    pub competition_time_month: i64,
    pub promo_since: NaiveDate,
    pub promo_time_week: i64,
}

/// Feature Preparer output: scaled continuous features, encoded
/// categoricals, one-hot state-holiday flags and cyclical pairs. The
/// one-hot flags and the scaled `year` are part of the prepared row but
/// are excluded by the projection to the model schema.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRecord {
    pub store: f64,
    pub promo: f64,
    pub store_type: f64,
    pub assortment: f64,
    pub competition_distance: f64,
    pub competition_open_since_month: f64,
    pub competition_open_since_year: f64,
    pub promo2: f64,
    pub promo2_since_week: f64,
    pub promo2_since_year: f64,
    pub competition_time_month: f64,
    pub promo_time_week: f64,
    pub year: f64,
    pub state_holiday_public_holiday: bool,
    pub state_holiday_easter_holiday: bool,
    pub state_holiday_christmas: bool,
    pub state_holiday_regular_day: bool,
    pub day_of_week_sin: f64,
    pub day_of_week_cos: f64,
    pub month_sin: f64,
    pub month_cos: f64,
    pub day_sin: f64,
    pub day_cos: f64,
    pub week_of_year_sin: f64,
    pub week_of_year_cos: f64,
}

impl PreparedRecord {
    /// Projects the prepared row down to the model's training schema.
    pub fn feature_vector(&self) -> FeatureVector {
        FeatureVector {
            store: self.store,
            promo: self.promo,
            store_type: self.store_type,
            assortment: self.assortment,
            competition_distance: self.competition_distance,
            competition_open_since_month: self.competition_open_since_month,
            competition_open_since_year: self.competition_open_since_year,
            promo2: self.promo2,
            promo2_since_week: self.promo2_since_week,
            promo2_since_year: self.promo2_since_year,
            competition_time_month: self.competition_time_month,
            promo_time_week: self.promo_time_week,
            day_of_week_sin: self.day_of_week_sin,
            day_of_week_cos: self.day_of_week_cos,
            month_sin: self.month_sin,
            month_cos: self.month_cos,
            day_sin: self.day_sin,
            day_cos: self.day_cos,
            week_of_year_sin: self.week_of_year_sin,
            week_of_year_cos: self.week_of_year_cos,
        }
    }
}

/// The exact ordered column set the model was trained on.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub store: f64,
    pub promo: f64,
    pub store_type: f64,
    pub assortment: f64,
    pub competition_distance: f64,
    pub competition_open_since_month: f64,
    pub competition_open_since_year: f64,
    pub promo2: f64,
    pub promo2_since_week: f64,
    pub promo2_since_year: f64,
    pub competition_time_month: f64,
    pub promo_time_week: f64,
    pub day_of_week_sin: f64,
    pub day_of_week_cos: f64,
    pub month_sin: f64,
    pub month_cos: f64,
    pub day_sin: f64,
    pub day_cos: f64,
    pub week_of_year_sin: f64,
    pub week_of_year_cos: f64,
}

impl FeatureVector {
    /// Training column order; the model artifact must match it exactly.
    pub const COLUMNS: [&'static str; 20] = [
        "store",
        "promo",
        "store_type",
        "assortment",
        "competition_distance",
        "competition_open_since_month",
        "competition_open_since_year",
        "promo2",
        "promo2_since_week",
        "promo2_since_year",
        "competition_time_month",
        "promo_time_week",
        "day_of_week_sin",
        "day_of_week_cos",
        "month_sin",
        "month_cos",
        "day_sin",
        "day_cos",
        "week_of_year_sin",
        "week_of_year_cos",
    ];

    pub fn to_row(&self) -> [f64; 20] {
        [
            self.store,
            self.promo,
            self.store_type,
            self.assortment,
            self.competition_distance,
            self.competition_open_since_month,
            self.competition_open_since_year,
            self.promo2,
            self.promo2_since_week,
            self.promo2_since_year,
            self.competition_time_month,
            self.promo_time_week,
            self.day_of_week_sin,
            self.day_of_week_cos,
            self.month_sin,
            self.month_cos,
            self.day_sin,
            self.day_cos,
            self.week_of_year_sin,
            self.week_of_year_cos,
        ]
    }

    /// Stacks feature vectors into the row-major matrix the model consumes.
    pub fn matrix(rows: &[FeatureVector]) -> Array2<f64> {
        let mut matrix = Array2::zeros((rows.len(), Self::COLUMNS.len()));
        for (i, row) in rows.iter().enumerate() {
            for (j, value) in row.to_row().into_iter().enumerate() {
                matrix[[i, j]] = value;
            }
        }
        matrix
    }
}

/// A response record: the client's original record echoed back with the
/// prediction attached in sales units.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRecord {
    #[serde(flatten)]
    pub record: RawStoreRecord,
    pub prediction: f64,
}
