//! Artifact persistence: model, scaler and encoder, one bincode file each

use crate::config::ArtifactsConfig;
use crate::models::booster::GradientBoostedClassifier;
use crate::preprocessing::{LabelEncoder, StandardScaler};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Everything the scoring side needs, produced once by training
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifacts {
    pub model: GradientBoostedClassifier,
    pub scaler: StandardScaler,
    pub encoder: LabelEncoder,
}

impl ModelArtifacts {
    /// Write all three artifacts, creating the directory if needed
    pub fn save(&self, paths: &ArtifactsConfig) -> Result<()> {
        fs::create_dir_all(&paths.dir).with_context(|| {
            format!("Failed to create artifact directory {}", paths.dir.display())
        })?;

        write_artifact(&paths.model_path(), "model", &self.model)?;
        write_artifact(&paths.scaler_path(), "scaler", &self.scaler)?;
        write_artifact(&paths.encoder_path(), "label encoder", &self.encoder)?;

        info!(dir = %paths.dir.display(), "Model, scaler and encoder saved");
        Ok(())
    }

    /// Read all three artifacts; fails if any is missing or unreadable
    pub fn load(paths: &ArtifactsConfig) -> Result<Self> {
        let model: GradientBoostedClassifier = read_artifact(&paths.model_path(), "model")?;
        let scaler: StandardScaler = read_artifact(&paths.scaler_path(), "scaler")?;
        let encoder: LabelEncoder = read_artifact(&paths.encoder_path(), "label encoder")?;

        anyhow::ensure!(
            scaler.n_features() == model.n_features(),
            "Scaler expects {} features but model expects {}",
            scaler.n_features(),
            model.n_features()
        );

        info!(
            trees = model.n_trees(),
            features = model.n_features(),
            types = ?encoder.classes(),
            "Artifacts loaded"
        );

        Ok(Self {
            model,
            scaler,
            encoder,
        })
    }
}

fn write_artifact<T: Serialize>(path: &Path, what: &str, value: &T) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create {} file {}", what, path.display()))?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, value)
        .with_context(|| format!("Failed to serialize {} to {}", what, path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    info!(artifact = what, path = %path.display(), "Artifact written");
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open {} file {}", what, path.display()))?;
    let value = bincode::deserialize_from(BufReader::new(file))
        .with_context(|| format!("Failed to deserialize {} from {}", what, path.display()))?;
    info!(artifact = what, path = %path.display(), "Artifact read");
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booster::BoosterParams;
    use ndarray::array;

    fn artifacts() -> ModelArtifacts {
        let x = array![[0.0, 1.0], [1.0, 0.0], [0.0, 2.0], [1.0, 3.0]];
        let y = [0, 1, 0, 1];
        let params = BoosterParams {
            n_estimators: 3,
            ..BoosterParams::default()
        };
        ModelArtifacts {
            model: GradientBoostedClassifier::fit(&x, &y, params).unwrap(),
            scaler: StandardScaler::fit(&x).unwrap(),
            encoder: LabelEncoder::fit(["PAYMENT", "TRANSFER"]).unwrap(),
        }
    }

    fn paths(dir: &Path) -> ArtifactsConfig {
        ArtifactsConfig {
            dir: dir.join("pickles"),
            ..ArtifactsConfig::default()
        }
    }

    #[test]
    fn test_save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = paths(tmp.path());
        let original = artifacts();

        original.save(&paths).unwrap();
        assert!(paths.model_path().exists());
        assert!(paths.scaler_path().exists());
        assert!(paths.encoder_path().exists());

        let loaded = ModelArtifacts::load(&paths).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_missing_artifact_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = paths(tmp.path());
        artifacts().save(&paths).unwrap();
        fs::remove_file(paths.scaler_path()).unwrap();

        let err = ModelArtifacts::load(&paths).unwrap_err();
        assert!(err.to_string().contains("scaler"));
    }

    #[test]
    fn test_corrupt_artifact_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = paths(tmp.path());
        artifacts().save(&paths).unwrap();
        fs::write(paths.model_path(), b"not a model").unwrap();

        let err = ModelArtifacts::load(&paths).unwrap_err();
        assert!(err.to_string().contains("model"));
    }
}
