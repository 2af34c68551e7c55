//! Built-in datasets and the train/test split.

use ndarray::{Array1, Array2, Axis};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default fraction of rows held out for evaluation.
pub const DEFAULT_TEST_SIZE: f64 = 0.2;
/// Default seed for the split shuffle.
pub const DEFAULT_RANDOM_STATE: u64 = 42;

#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("test_size must be in (0, 1), got {0}")]
    InvalidTestSize(f64),
    #[error("features have {features} rows but labels have {labels}")]
    LengthMismatch { features: usize, labels: usize },
    #[error("split of {rows} rows with test_size {test_size} leaves an empty partition")]
    EmptyPartition { rows: usize, test_size: f64 },
}

/// Fixed datasets compiled into the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinDataset {
    /// Fisher's iris flowers: 150 rows, 4 features, 3 classes.
    #[default]
    Iris,
    /// Red wine quality: 1599 rows, 11 features, quality score classes.
    WineQuality,
}

impl BuiltinDataset {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltinDataset::Iris => "iris",
            BuiltinDataset::WineQuality => "wine_quality",
        }
    }
}

impl std::fmt::Display for BuiltinDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Train/test partitions of a dataset.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<usize>,
    pub y_test: Array1<usize>,
}

/// Load the full feature matrix and label vector of a built-in dataset.
pub fn get_data(dataset: BuiltinDataset) -> (Array2<f64>, Array1<usize>) {
    let loaded = match dataset {
        BuiltinDataset::Iris => linfa_datasets::iris(),
        BuiltinDataset::WineQuality => linfa_datasets::winequality(),
    };
    (loaded.records, loaded.targets)
}

/// Shuffle rows with a seeded generator and hold out `ceil(test_size * n)` of them.
pub fn split_data(
    x: &Array2<f64>,
    y: &Array1<usize>,
    test_size: f64,
    random_state: u64,
) -> Result<TrainTestSplit, DataError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(DataError::InvalidTestSize(test_size));
    }
    let rows = x.nrows();
    if rows != y.len() {
        return Err(DataError::LengthMismatch {
            features: rows,
            labels: y.len(),
        });
    }
    let n_test = (test_size * rows as f64).ceil() as usize;
    if n_test == 0 || n_test >= rows {
        return Err(DataError::EmptyPartition { rows, test_size });
    }

    let mut indices: Vec<usize> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(random_state);
    indices.shuffle(&mut rng);
    let (test_idx, train_idx) = indices.split_at(n_test);

    Ok(TrainTestSplit {
        x_train: x.select(Axis(0), train_idx),
        x_test: x.select(Axis(0), test_idx),
        y_train: y.select(Axis(0), train_idx),
        y_test: y.select(Axis(0), test_idx),
    })
}
