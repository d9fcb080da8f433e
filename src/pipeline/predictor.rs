use crate::artifacts::SalesModel;
use crate::models::{
    FeatureVector, NormalizedRecord, PredictionRecord, PreparedRecord, RawStoreRecord,
};
use crate::pipeline::error::PipelineError;

/// Final pipeline stage: model invocation, inverse of the log1p target
/// transform, and the join of predictions back onto the records the
/// client sent.
pub struct Predictor<'a> {
    model: &'a dyn SalesModel,
}

impl<'a> Predictor<'a> {
    pub fn new(model: &'a dyn SalesModel) -> Self {
        Self { model }
    }

    /// `prepared` must hold exactly one row per open record, in request
    /// order; closed-store records get no prediction and are absent from
    /// the response.
    pub fn predict(
        &self,
        originals: &[RawStoreRecord],
        normalized: &[NormalizedRecord],
        prepared: &[PreparedRecord],
    ) -> Result<Vec<PredictionRecord>, PipelineError> {
        let survivors: Vec<&RawStoreRecord> = originals
            .iter()
            .zip(normalized)
            .filter(|(_, normalized_record)| normalized_record.is_open())
            .map(|(original, _)| original)
            .collect();

        if survivors.len() != prepared.len() {
            return Err(PipelineError::Inference(format!(
                "{} prepared rows for {} open records",
                prepared.len(),
                survivors.len()
            )));
        }
        if prepared.is_empty() {
            return Ok(Vec::new());
        }

        let vectors: Vec<FeatureVector> =
            prepared.iter().map(PreparedRecord::feature_vector).collect();
        let features = FeatureVector::matrix(&vectors);
        let predictions = self.model.predict(&features)?;
        if predictions.len() != survivors.len() {
            return Err(PipelineError::Inference(format!(
                "model returned {} predictions for {} rows",
                predictions.len(),
                survivors.len()
            )));
        }

        // The model was trained on log1p sales; expm1 restores sales units.
        let sales = predictions.mapv(f64::exp_m1);

        Ok(survivors
            .into_iter()
            .zip(sales)
            .map(|(record, prediction)| PredictionRecord {
                record: record.clone(),
                prediction,
            })
            .collect())
    }
}
