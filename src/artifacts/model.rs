use std::path::Path;

use anyhow::{Context, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::models::FeatureVector;
use crate::pipeline::error::PipelineError;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Trained regression model seam. The pipeline only ever calls `predict`;
/// fitting happens in the training pipeline, outside this repository.
pub trait SalesModel: Send + Sync {
    /// One prediction per feature-matrix row, on the model's trained
    /// target scale (log1p sales).
    fn predict(&self, features: &Array2<f64>) -> Result<Array1<f64>, PipelineError>;
}

/// On-disk model artifact: the fitted forest together with the column
/// order it was trained on.
#[derive(Serialize, Deserialize)]
pub struct ModelArtifact {
    pub columns: Vec<String>,
    pub forest: Forest,
}

/// The production model: a random-forest regressor restored from its
/// serialized artifact.
pub struct ForestModel {
    forest: Forest,
}

impl ForestModel {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model artifact: {}", path.display()))?;
        let artifact: ModelArtifact = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse model artifact: {}", path.display()))?;
        Ok(Self::from_artifact(artifact)?)
    }

    /// Rejects artifacts whose training columns disagree with the feature
    /// schema this build prepares.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, PipelineError> {
        let columns_match = artifact.columns.len() == FeatureVector::COLUMNS.len()
            && artifact
                .columns
                .iter()
                .zip(FeatureVector::COLUMNS)
                .all(|(artifact_column, expected)| artifact_column == expected);
        if !columns_match {
            return Err(PipelineError::Schema(format!(
                "model artifact was trained on columns {:?}, expected {:?}",
                artifact.columns,
                FeatureVector::COLUMNS
            )));
        }
        Ok(Self {
            forest: artifact.forest,
        })
    }
}

impl SalesModel for ForestModel {
    fn predict(&self, features: &Array2<f64>) -> Result<Array1<f64>, PipelineError> {
        let rows: Vec<Vec<f64>> = features
            .rows()
            .into_iter()
            .map(|row| row.to_vec())
            .collect();
        let matrix = DenseMatrix::from_2d_vec(&rows);
        let predictions = self
            .forest
            .predict(&matrix)
            .map_err(|e| PipelineError::Inference(e.to_string()))?;
        Ok(Array1::from_vec(predictions))
    }
}
