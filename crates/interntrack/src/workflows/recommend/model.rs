use super::features::{FeatureVector, FEATURE_DIM};

/// Fixed training budget; the scorer must finish inside a request, so there
/// is no convergence loop.
const EPOCHS: usize = 200;
const LEARNING_RATE: f32 = 0.1;

/// A labeled (features, outcome) row from the user's tracked history.
/// Label 1.0 means the application reached `Applied` or later.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub features: FeatureVector,
    pub label: f32,
}

/// Raised when the history cannot support a fit; callers fall back to the
/// heuristic score rather than surfacing this.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("not enough labeled history ({0} examples)")]
    TooFewExamples(usize),
    #[error("history labels are single-class")]
    SingleClass,
    #[error("training diverged to non-finite weights")]
    Degenerate,
}

/// Single-neuron logistic regression over the six pair features.
///
/// Trained by full-batch gradient descent with zero initialization and a
/// fixed epoch count, so identical history always yields identical weights.
/// Prediction is a sigmoid, guaranteed inside [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    weights: [f32; FEATURE_DIM],
    bias: f32,
}

impl LogisticModel {
    /// Fit a model from labeled history rows.
    ///
    /// Requires at least `min_examples` rows including one positive and one
    /// negative label; a one-class history has no gradient signal and would
    /// only learn its own bias.
    pub fn fit(examples: &[TrainingExample], min_examples: usize) -> Result<Self, TrainingError> {
        if examples.len() < min_examples {
            return Err(TrainingError::TooFewExamples(examples.len()));
        }
        let positives = examples.iter().filter(|row| row.label > 0.5).count();
        if positives == examples.len() || positives == 0 {
            return Err(TrainingError::SingleClass);
        }

        let mut model = Self {
            weights: [0.0; FEATURE_DIM],
            bias: 0.0,
        };
        let scale = LEARNING_RATE / examples.len() as f32;

        for _ in 0..EPOCHS {
            let mut weight_grad = [0.0f32; FEATURE_DIM];
            let mut bias_grad = 0.0f32;

            for row in examples {
                let error = model.predict(&row.features) - row.label;
                for (grad, feature) in weight_grad.iter_mut().zip(row.features.iter()) {
                    *grad += error * feature;
                }
                bias_grad += error;
            }

            for (weight, grad) in model.weights.iter_mut().zip(weight_grad.iter()) {
                *weight -= scale * grad;
            }
            model.bias -= scale * bias_grad;
        }

        if model.weights.iter().any(|w| !w.is_finite()) || !model.bias.is_finite() {
            return Err(TrainingError::Degenerate);
        }

        Ok(model)
    }

    pub fn predict(&self, features: &FeatureVector) -> f32 {
        let logit: f32 = self
            .weights
            .iter()
            .zip(features.iter())
            .map(|(weight, feature)| weight * feature)
            .sum::<f32>()
            + self.bias;
        sigmoid(logit)
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
