use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, info_span, warn};
use uuid::Uuid;

use super::AppState;
use crate::models::RawStoreRecord;
use crate::pipeline::PipelineError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// POST /sales/predict: a single record object or a record array in,
/// predictions joined onto the originals out. An empty body is a defined
/// no-op answered with `{}`.
pub async fn predict(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("predict", %request_id);
    let _guard = span.enter();

    if body.iter().all(u8::is_ascii_whitespace) {
        return Json(serde_json::json!({})).into_response();
    }

    let records = match parse_records(&body) {
        Ok(records) => records,
        Err(e) => {
            warn!("Rejected request body: {}", e);
            return error_response(&e);
        }
    };

    info!("Scoring {} records", records.len());
    match state.pipeline.predict(&records) {
        Ok(predictions) => Json(predictions).into_response(),
        Err(e) => {
            warn!("Prediction failed: {}", e);
            error_response(&e)
        }
    }
}

/// Accepts either a single JSON object (one record) or a homogeneous
/// array of objects.
pub(crate) fn parse_records(body: &[u8]) -> Result<Vec<RawStoreRecord>, PipelineError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| PipelineError::MalformedInput(format!("invalid JSON body: {e}")))?;

    match value {
        Value::Object(_) => Ok(vec![record_from_value(value)?]),
        Value::Array(items) => items.into_iter().map(record_from_value).collect(),
        other => Err(PipelineError::MalformedInput(format!(
            "expected a record object or an array of records, got {}",
            value_kind(&other)
        ))),
    }
}

fn record_from_value(value: Value) -> Result<RawStoreRecord, PipelineError> {
    serde_json::from_value(value).map_err(|e| {
        PipelineError::MalformedInput(format!("record does not match the expected schema: {e}"))
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn error_response(error: &PipelineError) -> Response {
    let status = match error {
        PipelineError::MalformedInput(_) => StatusCode::BAD_REQUEST,
        PipelineError::Schema(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{FittedScaler, LabelEncoder, SalesModel, TransformerSet};
    use crate::pipeline::SalesPipeline;
    use ndarray::{Array1, Array2};
    use serde_json::json;
    use std::sync::Arc;

    struct ConstantLogModel {
        sales: f64,
    }

    impl SalesModel for ConstantLogModel {
        fn predict(&self, features: &Array2<f64>) -> Result<Array1<f64>, PipelineError> {
            Ok(Array1::from_elem(features.nrows(), self.sales.ln_1p()))
        }
    }

    fn app_state() -> AppState {
        let transformers = TransformerSet {
            competition_distance_scaler: FittedScaler::Robust {
                center: 2330.0,
                scale: 6170.0,
            },
            competition_time_month_scaler: FittedScaler::Robust {
                center: 57.0,
                scale: 97.0,
            },
            promo_time_week_scaler: FittedScaler::MinMax {
                data_min: -20.0,
                data_max: 289.0,
            },
            year_scaler: FittedScaler::MinMax {
                data_min: 2013.0,
                data_max: 2015.0,
            },
            store_type_encoder: LabelEncoder::new(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string(),
                "d".to_string(),
            ]),
        };
        AppState {
            pipeline: Arc::new(SalesPipeline::new(
                Arc::new(transformers),
                Arc::new(ConstantLogModel { sales: 4750.0 }),
            )),
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn record_value() -> Value {
        json!({
            "Store": 1,
            "DayOfWeek": 5,
            "Date": "2015-07-31",
            "Open": 1,
            "Promo": 1,
            "StateHoliday": "0",
            "SchoolHoliday": 0,
            "StoreType": "a",
            "Assortment": "a",
            "CompetitionDistance": 1270.0,
            "CompetitionOpenSinceMonth": 9,
            "CompetitionOpenSinceYear": 2008,
            "Promo2": 0,
            "Promo2SinceWeek": null,
            "Promo2SinceYear": null,
            "PromoInterval": ""
        })
    }

    #[test]
    fn test_single_object_becomes_one_record() {
        let body = serde_json::to_vec(&record_value()).unwrap();
        let records = parse_records(&body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].store, 1);
    }

    #[test]
    fn test_array_becomes_record_batch() {
        let body = serde_json::to_vec(&json!([record_value(), record_value()])).unwrap();
        let records = parse_records(&body).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_invalid_json_is_malformed_input() {
        let result = parse_records(b"{not json");
        assert!(matches!(result, Err(PipelineError::MalformedInput(_))));
    }

    #[test]
    fn test_scalar_body_is_malformed_input() {
        let result = parse_records(b"42");
        assert!(matches!(result, Err(PipelineError::MalformedInput(_))));
    }

    #[test]
    fn test_record_missing_required_field_is_malformed_input() {
        let mut value = record_value();
        value.as_object_mut().unwrap().remove("Store");
        let body = serde_json::to_vec(&value).unwrap();
        let result = parse_records(&body);
        assert!(matches!(result, Err(PipelineError::MalformedInput(_))));
    }

    #[tokio::test]
    async fn test_empty_body_is_a_no_op_returning_empty_object() {
        let response = predict(State(app_state()), Bytes::new()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({}));

        let blank = predict(State(app_state()), Bytes::from_static(b"  \n")).await;
        assert_eq!(body_json(blank).await, json!({}));
    }

    #[tokio::test]
    async fn test_predict_handler_returns_predictions_for_a_record() {
        let body = Bytes::from(serde_json::to_vec(&record_value()).unwrap());
        let response = predict(State(app_state()), body).await;
        assert_eq!(response.status(), StatusCode::OK);

        let payload = body_json(response).await;
        assert_eq!(payload.as_array().unwrap().len(), 1);
        assert_eq!(payload[0]["Store"], 1);
        assert!((payload[0]["prediction"].as_f64().unwrap() - 4750.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_predict_handler_rejects_bad_json_with_400() {
        let response = predict(State(app_state()), Bytes::from_static(b"{oops")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = body_json(response).await;
        assert!(payload["error"].as_str().unwrap().contains("malformed input"));
    }

    #[test]
    fn test_error_statuses_follow_the_taxonomy() {
        let bad_request = error_response(&PipelineError::MalformedInput("x".into()));
        assert_eq!(bad_request.status(), StatusCode::BAD_REQUEST);

        let unprocessable = error_response(&PipelineError::Schema("x".into()));
        assert_eq!(unprocessable.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let server_error = error_response(&PipelineError::Inference("x".into()));
        assert_eq!(server_error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
