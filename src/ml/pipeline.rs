//! Standard scaling followed by multinomial logistic regression.
//!
//! Both steps are fitted and applied as one unit so callers never see
//! unscaled features reach the classifier.

use linfa::DatasetBase;
use linfa::traits::{Fit, Predict, Transformer};
use linfa_logistic::{MultiFittedLogisticRegression, MultiLogisticRegression};
use linfa_preprocessing::linear_scaling::LinearScaler;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default iteration cap for the logistic regression solver.
pub const DEFAULT_MAX_ITER: u64 = 1000;
/// Default L2 penalty strength.
pub const DEFAULT_ALPHA: f64 = 1.0;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("scaler failed: {0}")]
    Scaler(#[from] linfa_preprocessing::PreprocessingError),
    #[error("logistic regression failed: {0}")]
    Classifier(#[from] linfa_logistic::error::Error),
    #[error("training needs at least 2 classes, found {0}")]
    TooFewClasses(usize),
    #[error("training set is empty")]
    EmptyTrainingSet,
    #[error("features have {features} rows but labels have {labels}")]
    LengthMismatch { features: usize, labels: usize },
    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
    #[error("feature {index} is not a finite number")]
    NonFinite { index: usize },
    #[error("invalid pipeline: {0}")]
    Invalid(String),
}

/// Unfitted pipeline hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineParams {
    pub max_iter: u64,
    pub alpha: f64,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            max_iter: DEFAULT_MAX_ITER,
            alpha: DEFAULT_ALPHA,
        }
    }
}

/// Build the scaler + classifier pipeline with the given iteration cap.
pub fn build_pipeline(max_iter: u64) -> PipelineParams {
    PipelineParams {
        max_iter,
        ..PipelineParams::default()
    }
}

impl PipelineParams {
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Fit the scaler on `x`, then the classifier on the scaled rows.
    pub fn fit(&self, x: &Array2<f64>, y: &Array1<usize>) -> Result<FittedPipeline, PipelineError> {
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyTrainingSet);
        }
        if x.nrows() != y.len() {
            return Err(PipelineError::LengthMismatch {
                features: x.nrows(),
                labels: y.len(),
            });
        }
        let mut classes: Vec<usize> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        if classes.len() < 2 {
            return Err(PipelineError::TooFewClasses(classes.len()));
        }

        let train = DatasetBase::new(x.to_owned(), y.to_owned());
        let scaler = LinearScaler::standard().fit(&train)?;
        let scaled = scaler.transform(x.to_owned());
        let scaled_train = DatasetBase::new(scaled, y.to_owned());
        let classifier = MultiLogisticRegression::default()
            .max_iterations(self.max_iter)
            .alpha(self.alpha)
            .fit(&scaled_train)?;

        Ok(FittedPipeline {
            scaler,
            classifier,
            n_features: x.ncols(),
            classes,
        })
    }
}

/// Fitted scaler and classifier, applied together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPipeline {
    scaler: LinearScaler<f64>,
    classifier: MultiFittedLogisticRegression<f64, usize>,
    n_features: usize,
    classes: Vec<usize>,
}

impl FittedPipeline {
    /// Number of input features the pipeline was fitted on.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Sorted class labels seen during training.
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    /// Check internal dimensions after deserialization.
    pub fn validate(&self) -> Result<(), String> {
        if self.n_features == 0 {
            return Err("n_features must be > 0".to_string());
        }
        if self.classes.len() < 2 {
            return Err("pipeline must contain at least 2 classes".to_string());
        }
        if self.scaler.offsets().len() != self.n_features {
            return Err(format!(
                "scaler has {} offsets but n_features is {}",
                self.scaler.offsets().len(),
                self.n_features
            ));
        }
        if self.classifier.params().nrows() != self.n_features {
            return Err(format!(
                "classifier has {} weight rows but n_features is {}",
                self.classifier.params().nrows(),
                self.n_features
            ));
        }
        Ok(())
    }

    /// Scale and classify a batch of rows.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>, PipelineError> {
        if x.ncols() != self.n_features {
            return Err(PipelineError::FeatureCount {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }
        let scaled = self.scaler.transform(x.to_owned());
        Ok(self.classifier.predict(&scaled))
    }

    /// Predict a single sample, reshaped to one row.
    pub fn predict_one(&self, features: &[f64]) -> Result<usize, PipelineError> {
        if features.len() != self.n_features {
            return Err(PipelineError::FeatureCount {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        if let Some(index) = features.iter().position(|value| !value.is_finite()) {
            return Err(PipelineError::NonFinite { index });
        }
        let row = Array2::from_shape_vec((1, features.len()), features.to_vec())
            .map_err(|err| PipelineError::Invalid(err.to_string()))?;
        let predicted = self.predict(&row)?;
        predicted
            .first()
            .copied()
            .ok_or_else(|| PipelineError::Invalid("empty prediction".to_string()))
    }
}
