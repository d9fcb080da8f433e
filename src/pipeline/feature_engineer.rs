use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{EngineeredRecord, NormalizedRecord};
use crate::pipeline::error::PipelineError;

/// Second pipeline stage: calendar decomposition, elapsed-time features,
/// categorical recoding and the closed-store filter.
pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Derives features per row and drops closed-store rows; the output
    /// may therefore be shorter than the input.
    pub fn transform(
        &self,
        records: &[NormalizedRecord],
    ) -> Result<Vec<EngineeredRecord>, PipelineError> {
        records
            .iter()
            .filter(|record| record.is_open())
            .map(engineer_record)
            .collect()
    }
}

fn engineer_record(record: &NormalizedRecord) -> Result<EngineeredRecord, PipelineError> {
    let iso = record.date.iso_week();

    let competition_since = competition_open_date(
        record.competition_open_since_year,
        record.competition_open_since_month,
    )?;
    let competition_time_month = (record.date - competition_since).num_days().div_euclid(30);

    let promo_since = promo_week_start(record.promo2_since_year, record.promo2_since_week)?;
    let promo_time_week = (record.date - promo_since).num_days().div_euclid(7);

    Ok(EngineeredRecord {
        store: record.store,
        day_of_week: record.day_of_week,
        date: record.date,
        promo: record.promo,
        state_holiday: recode_state_holiday(&record.state_holiday).to_string(),
        school_holiday: record.school_holiday,
        store_type: record.store_type.clone(),
        assortment: recode_assortment(&record.assortment).to_string(),
        competition_distance: record.competition_distance,
        competition_open_since_month: record.competition_open_since_month,
        competition_open_since_year: record.competition_open_since_year,
        promo2: record.promo2,
        promo2_since_week: record.promo2_since_week,
        promo2_since_year: record.promo2_since_year,
        is_promo: record.is_promo,
        year: record.date.year(),
        month: record.date.month(),
        day: record.date.day(),
        week_of_year: iso.week(),
        year_week: format!("{}-{:02}", iso.year(), iso.week()),
        competition_since,
        competition_time_month,
        promo_since,
        promo_time_week,
    })
}

/// First day of the month the competitor opened in.
fn competition_open_date(year: i32, month: u32) -> Result<NaiveDate, PipelineError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        PipelineError::MalformedInput(format!(
            "competition open {year}-{month:02} is not a calendar month"
        ))
    })
}

/// Start of the promo week: the Monday of the given week under the
/// Monday-first week-of-year convention (week 1 begins at the year's first
/// Monday), shifted back by one further week. The one-week-back anchor is
/// part of the trained feature definition and must not be "fixed".
fn promo_week_start(year: i32, week: u32) -> Result<NaiveDate, PipelineError> {
    let jan_first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| {
        PipelineError::MalformedInput(format!("promo2 since year {year} is out of range"))
    })?;
    let days_until_monday = (7 - jan_first.weekday().num_days_from_monday()) % 7;
    let first_monday = jan_first + Duration::days(i64::from(days_until_monday));
    Ok(first_monday + Duration::weeks(i64::from(week) - 1) - Duration::days(7))
}

fn recode_assortment(code: &str) -> &'static str {
    match code {
        "a" => "basic",
        "b" => "extra",
        _ => "extended",
    }
}

fn recode_state_holiday(code: &str) -> &'static str {
    match code {
        "a" => "public_holiday",
        "b" => "easter_holiday",
        "c" => "christmas",
        _ => "regular_day",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized_record() -> NormalizedRecord {
        NormalizedRecord {
            store: 1,
            day_of_week: 5,
            date: NaiveDate::from_ymd_opt(2015, 7, 31).unwrap(),
            open: Some(1),
            promo: 1,
            state_holiday: "0".to_string(),
            school_holiday: 0,
            store_type: "a".to_string(),
            assortment: "a".to_string(),
            competition_distance: 1270.0,
            competition_open_since_month: 9,
            competition_open_since_year: 2008,
            promo2: 0,
            promo2_since_week: 31,
            promo2_since_year: 2015,
            promo_interval: "0".to_string(),
            is_promo: 0,
        }
    }

    #[test]
    fn test_calendar_parts_come_from_the_date() {
        let engineered = FeatureEngineer.transform(&[normalized_record()]).unwrap();
        let record = &engineered[0];
        assert_eq!(record.year, 2015);
        assert_eq!(record.month, 7);
        assert_eq!(record.day, 31);
        assert_eq!(record.week_of_year, 31);
        assert_eq!(record.year_week, "2015-31");
    }

    #[test]
    fn test_competition_elapsed_months() {
        let engineered = FeatureEngineer.transform(&[normalized_record()]).unwrap();
        let record = &engineered[0];
        assert_eq!(
            record.competition_since,
            NaiveDate::from_ymd_opt(2008, 9, 1).unwrap()
        );
        // 2524 days between 2008-09-01 and 2015-07-31, floor-divided by 30.
        assert_eq!(record.competition_time_month, 84);
    }

    #[test]
    fn test_competition_in_the_future_floors_negative() {
        let mut record = normalized_record();
        record.competition_open_since_month = 8;
        record.competition_open_since_year = 2015;
        let engineered = FeatureEngineer.transform(&[record]).unwrap();
        // -1 day to 2015-08-01; floor division keeps the negative sign.
        assert_eq!(engineered[0].competition_time_month, -1);
    }

    #[test]
    fn test_promo_week_start_is_monday_minus_one_week() {
        // Week 31 of 2015 under the Monday-first convention starts on
        // 2015-08-03; the promo anchor is one week earlier.
        let engineered = FeatureEngineer.transform(&[normalized_record()]).unwrap();
        let record = &engineered[0];
        assert_eq!(
            record.promo_since,
            NaiveDate::from_ymd_opt(2015, 7, 27).unwrap()
        );
        assert_eq!(record.promo_time_week, 0);
    }

    #[test]
    fn test_promo_week_start_when_january_first_is_monday() {
        // 2018-01-01 is a Monday, so week 1 starts on it.
        assert_eq!(
            promo_week_start(2018, 1).unwrap(),
            NaiveDate::from_ymd_opt(2017, 12, 25).unwrap()
        );
    }

    #[test]
    fn test_categorical_recodes() {
        let mut basic = normalized_record();
        basic.assortment = "a".to_string();
        basic.state_holiday = "b".to_string();
        let engineered = FeatureEngineer.transform(&[basic]).unwrap();
        assert_eq!(engineered[0].assortment, "basic");
        assert_eq!(engineered[0].state_holiday, "easter_holiday");

        let mut other = normalized_record();
        other.assortment = "c".to_string();
        other.state_holiday = "0".to_string();
        let engineered = FeatureEngineer.transform(&[other]).unwrap();
        assert_eq!(engineered[0].assortment, "extended");
        assert_eq!(engineered[0].state_holiday, "regular_day");
    }

    #[test]
    fn test_closed_store_rows_are_dropped() {
        let mut closed = normalized_record();
        closed.open = Some(0);
        let mut missing_open = normalized_record();
        missing_open.open = None;

        let engineered = FeatureEngineer
            .transform(&[normalized_record(), closed, missing_open])
            .unwrap();
        // The closed row is gone; the missing-open row survives.
        assert_eq!(engineered.len(), 2);
    }

    #[test]
    fn test_invalid_competition_month_is_malformed_input() {
        let mut record = normalized_record();
        record.competition_open_since_month = 13;
        let result = FeatureEngineer.transform(&[record]);
        assert!(matches!(result, Err(PipelineError::MalformedInput(_))));
    }
}
