use std::path::Path;

use ndarray::{Array1, Array2};
use serde::Deserialize;

use super::{argmax, Classifier, FeatureVector};
use crate::error::{ArtifactError, InferenceError};

/// Exported classifier parameters, tagged by model family.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    /// Binary linear decision function (logistic regression, linear SVM).
    Linear {
        coef: Vec<f32>,
        intercept: f32,
        #[serde(default = "default_classes")]
        classes: Vec<i64>,
    },
    MultinomialNb {
        class_log_prior: Vec<f32>,
        feature_log_prob: Vec<Vec<f32>>,
        #[serde(default = "default_classes")]
        classes: Vec<i64>,
    },
}

fn default_classes() -> Vec<i64> {
    vec![0, 1]
}

pub(super) fn from_artifact(
    artifact: ClassifierArtifact,
    path: &Path,
) -> Result<Box<dyn Classifier>, ArtifactError> {
    let invalid = |message: String| ArtifactError::Invalid {
        path: path.to_path_buf(),
        message,
    };

    match artifact {
        ClassifierArtifact::Linear {
            coef,
            intercept,
            classes,
        } => {
            let classes: [i64; 2] = classes.try_into().map_err(|classes: Vec<i64>| {
                invalid(format!(
                    "linear classifier needs 2 classes, got {}",
                    classes.len()
                ))
            })?;
            if coef.is_empty() {
                return Err(invalid("coef is empty".to_string()));
            }
            Ok(Box::new(LinearClassifier::new(
                Array1::from(coef),
                intercept,
                classes,
            )))
        }
        ClassifierArtifact::MultinomialNb {
            class_log_prior,
            feature_log_prob,
            classes,
        } => {
            let n_classes = class_log_prior.len();
            if n_classes < 2 || classes.len() != n_classes || feature_log_prob.len() != n_classes {
                return Err(invalid(format!(
                    "inconsistent class counts: {} priors, {} likelihood rows, {} classes",
                    n_classes,
                    feature_log_prob.len(),
                    classes.len()
                )));
            }

            let n_features = feature_log_prob[0].len();
            if n_features == 0 || feature_log_prob.iter().any(|row| row.len() != n_features) {
                return Err(invalid(
                    "feature_log_prob rows must be non-empty and equally long".to_string(),
                ));
            }

            let flat: Vec<f32> = feature_log_prob.into_iter().flatten().collect();
            let feature_log_prob = Array2::from_shape_vec((n_classes, n_features), flat)
                .map_err(|e| invalid(e.to_string()))?;

            Ok(Box::new(NaiveBayesClassifier::new(
                Array1::from(class_log_prior),
                feature_log_prob,
                classes,
            )))
        }
    }
}

fn check_width(expected: usize, features: &FeatureVector) -> Result<(), InferenceError> {
    if features.len() != expected {
        return Err(InferenceError::DimensionMismatch {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}

#[derive(Debug)]
pub struct LinearClassifier {
    coef: Array1<f32>,
    intercept: f32,
    classes: [i64; 2],
}

impl LinearClassifier {
    pub fn new(coef: Array1<f32>, intercept: f32, classes: [i64; 2]) -> Self {
        Self {
            coef,
            intercept,
            classes,
        }
    }

    pub fn decision_function(&self, features: &FeatureVector) -> Result<f32, InferenceError> {
        check_width(self.coef.len(), features)?;
        Ok(self.coef.dot(features) + self.intercept)
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<i64, InferenceError> {
        let score = self.decision_function(features)?;
        Ok(if score > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        })
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coef.len())
    }
}

#[derive(Debug)]
pub struct NaiveBayesClassifier {
    class_log_prior: Array1<f32>,
    /// One row per class.
    feature_log_prob: Array2<f32>,
    classes: Vec<i64>,
}

impl NaiveBayesClassifier {
    pub fn new(
        class_log_prior: Array1<f32>,
        feature_log_prob: Array2<f32>,
        classes: Vec<i64>,
    ) -> Self {
        Self {
            class_log_prior,
            feature_log_prob,
            classes,
        }
    }

    pub fn joint_log_likelihood(
        &self,
        features: &FeatureVector,
    ) -> Result<Array1<f32>, InferenceError> {
        check_width(self.feature_log_prob.ncols(), features)?;
        Ok(self.feature_log_prob.dot(features) + &self.class_log_prior)
    }
}

impl Classifier for NaiveBayesClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<i64, InferenceError> {
        let jll = self.joint_log_likelihood(features)?;
        argmax(jll.iter().copied())
            .and_then(|index| self.classes.get(index).copied())
            .ok_or_else(|| InferenceError::Runtime("no class scores produced".to_string()))
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.feature_log_prob.ncols())
    }
}
