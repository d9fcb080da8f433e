pub mod error;
pub mod feature_engineer;
pub mod feature_preparer;
pub mod normalizer;
pub mod predictor;

pub use error::PipelineError;
pub use feature_engineer::FeatureEngineer;
pub use feature_preparer::FeaturePreparer;
pub use normalizer::Normalizer;
pub use predictor::Predictor;

use std::sync::Arc;

use tracing::debug;

use crate::artifacts::{SalesModel, TransformerSet};
use crate::models::{PredictionRecord, RawStoreRecord};

/// The full inference pipeline over one request batch: normalize →
/// engineer → prepare → predict. Stages are pure; the shared transformers
/// and model are read-only for the process lifetime.
pub struct SalesPipeline {
    transformers: Arc<TransformerSet>,
    model: Arc<dyn SalesModel>,
}

impl SalesPipeline {
    pub fn new(transformers: Arc<TransformerSet>, model: Arc<dyn SalesModel>) -> Self {
        Self {
            transformers,
            model,
        }
    }

    pub fn predict(
        &self,
        records: &[RawStoreRecord],
    ) -> Result<Vec<PredictionRecord>, PipelineError> {
        let normalized = Normalizer.clean(records)?;
        let engineered = FeatureEngineer.transform(&normalized)?;
        debug!(
            "Engineered {} of {} records (closed stores dropped)",
            engineered.len(),
            records.len()
        );
        let prepared = FeaturePreparer::new(&self.transformers).transform(&engineered)?;
        Predictor::new(self.model.as_ref()).predict(records, &normalized, &prepared)
    }
}
