//! Model artifacts and the inference seam used by the HTTP handlers.
//!
//! A [`SpamModel`] pairs a text [`Transformer`] with a [`Classifier`].
//! Both are loaded once before the server binds and are read-only after
//! that, so handlers share them through `web::Data` without locking.

mod linear;
mod onnx;
mod tfidf;

use std::fs;
use std::path::Path;

use ndarray::Array1;
use serde::de::DeserializeOwned;

use crate::error::{ArtifactError, InferenceError};
use crate::models::{Label, Prediction};

pub use linear::{ClassifierArtifact, LinearClassifier, NaiveBayesClassifier};
pub use onnx::OnnxClassifier;
pub use tfidf::{Norm, TfidfArtifact, TfidfVectorizer};

pub type FeatureVector = Array1<f32>;

/// Converts raw text into a fixed-width feature vector.
pub trait Transformer: Send + Sync {
    fn transform(&self, text: &str) -> Result<FeatureVector, InferenceError>;

    fn n_features(&self) -> usize;

    /// Number of terms the text is split into before vectorizing, when the
    /// transformer works on discrete terms.
    fn term_count(&self, _text: &str) -> Option<usize> {
        None
    }
}

/// Maps a feature vector onto a numeric class.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<i64, InferenceError>;

    /// Input width, when the artifact declares one.
    fn n_features(&self) -> Option<usize>;
}

pub struct SpamModel {
    transformer: Box<dyn Transformer>,
    classifier: Box<dyn Classifier>,
}

impl SpamModel {
    pub fn new(transformer: Box<dyn Transformer>, classifier: Box<dyn Classifier>) -> Self {
        Self {
            transformer,
            classifier,
        }
    }

    /// Loads both artifacts and checks that their widths agree.
    pub fn load(vectorizer: &Path, classifier: &Path) -> Result<Self, ArtifactError> {
        let transformer = load_transformer(vectorizer)?;
        let n_features = transformer.n_features();
        let classifier_model = load_classifier(classifier, n_features)?;

        if let Some(width) = classifier_model.n_features() {
            if width != n_features {
                return Err(ArtifactError::Invalid {
                    path: classifier.to_path_buf(),
                    message: format!(
                        "classifier expects {width} features but the vectorizer produces {n_features}"
                    ),
                });
            }
        }

        tracing::info!(
            vectorizer = %vectorizer.display(),
            classifier = %classifier.display(),
            n_features,
            "model artifacts loaded"
        );

        Ok(Self::new(transformer, classifier_model))
    }

    pub fn classify(&self, text: &str) -> Result<Prediction, InferenceError> {
        let features = self.transformer.transform(text)?;
        let class = self.classifier.predict(&features)?;
        let label = Label::from_class(class)?;

        tracing::debug!(
            terms = self.transformer.term_count(text),
            active_features = features.iter().filter(|v| **v != 0.0).count(),
            class,
            %label,
            "classified message"
        );

        Ok(Prediction { class, label })
    }

    pub fn n_features(&self) -> usize {
        self.transformer.n_features()
    }
}

pub fn load_transformer(path: &Path) -> Result<Box<dyn Transformer>, ArtifactError> {
    match extension(path).as_deref() {
        Some("json") => {
            let artifact: TfidfArtifact = read_json(path)?;
            Ok(Box::new(TfidfVectorizer::from_artifact(artifact, path)?))
        }
        _ => Err(ArtifactError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

pub fn load_classifier(
    path: &Path,
    n_features: usize,
) -> Result<Box<dyn Classifier>, ArtifactError> {
    match extension(path).as_deref() {
        Some("json") => {
            let artifact: ClassifierArtifact = read_json(path)?;
            linear::from_artifact(artifact, path)
        }
        Some("onnx") => Ok(Box::new(OnnxClassifier::from_path(path, n_features)?)),
        _ => Err(ArtifactError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Index of the first maximum value.
pub(crate) fn argmax(values: impl IntoIterator<Item = f32>) -> Option<usize> {
    values
        .into_iter()
        .enumerate()
        .fold(None, |best, (index, value)| match best {
            Some((_, top)) if top >= value => best,
            _ => Some((index, value)),
        })
        .map(|(index, _)| index)
}
