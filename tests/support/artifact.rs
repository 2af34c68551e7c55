use std::path::{Path, PathBuf};

use logipipe::data::{self, BuiltinDataset};
use logipipe::ml::{FittedPipeline, PipelineArtifact, build_pipeline, save_artifact};

/// Fit the pipeline on the iris training split.
pub fn fit_iris() -> FittedPipeline {
    let (x, y) = data::get_data(BuiltinDataset::Iris);
    let split = data::split_data(&x, &y, 0.2, 42).expect("split iris");
    build_pipeline(200)
        .fit(&split.x_train, &split.y_train)
        .expect("fit iris pipeline")
}

/// Fit on iris and save the artifact as `<dir>/models/model.json`.
pub fn write_iris_artifact(dir: &Path) -> PathBuf {
    let path = dir.join("models").join("model.json");
    save_artifact(&PipelineArtifact::new(BuiltinDataset::Iris, fit_iris()), &path)
        .expect("save artifact");
    path
}
