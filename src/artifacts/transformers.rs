use serde::{Deserialize, Serialize};

/// A fitted numeric transformation, applied at inference with the exact
/// parameters learned at training time. There is deliberately no `fit`
/// here: inference data must never move the parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedScaler {
    /// `(value - center) / scale`, with center/scale fitted as the
    /// training median and interquartile range.
    Robust { center: f64, scale: f64 },
    /// `(value - data_min) / (data_max - data_min)` over the training range.
    MinMax { data_min: f64, data_max: f64 },
}

impl FittedScaler {
    pub fn transform(&self, value: f64) -> f64 {
        match *self {
            FittedScaler::Robust { center, scale } => {
                if scale == 0.0 {
                    0.0
                } else {
                    (value - center) / scale
                }
            }
            FittedScaler::MinMax { data_min, data_max } => {
                let range = data_max - data_min;
                if range == 0.0 {
                    0.0
                } else {
                    (value - data_min) / range
                }
            }
        }
    }
}

/// Fitted mapping from a category label to its numeric code. Codes are
/// positions in the fitted class list, so the artifact order is the
/// training order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// `None` for a label outside the fitted vocabulary; callers decide
    /// how to surface that.
    pub fn transform(&self, label: &str) -> Option<f64> {
        self.classes
            .iter()
            .position(|class| class == label)
            .map(|index| index as f64)
    }
}
