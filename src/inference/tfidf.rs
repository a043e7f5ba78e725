use std::collections::{HashMap, HashSet};
use std::path::Path;

use ndarray::Array1;
use regex::Regex;
use serde::Deserialize;

use super::{FeatureVector, Transformer};
use crate::error::{ArtifactError, InferenceError};

const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// Exported state of a fitted TF-IDF vectorizer.
#[derive(Debug, Clone, Deserialize)]
pub struct TfidfArtifact {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f32>,
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub binary: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

fn default_lowercase() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

#[derive(Debug)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Array1<f32>,
    lowercase: bool,
    token_pattern: Regex,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    sublinear_tf: bool,
    binary: bool,
    norm: Option<Norm>,
}

impl TfidfVectorizer {
    pub fn from_artifact(artifact: TfidfArtifact, path: &Path) -> Result<Self, ArtifactError> {
        let invalid = |message: String| ArtifactError::Invalid {
            path: path.to_path_buf(),
            message,
        };

        if artifact.idf.is_empty() {
            return Err(invalid("idf vector is empty".to_string()));
        }

        if let Some((term, &column)) = artifact
            .vocabulary
            .iter()
            .find(|(_, column)| **column >= artifact.idf.len())
        {
            return Err(invalid(format!(
                "term `{term}` maps to column {column}, but idf has {} entries",
                artifact.idf.len()
            )));
        }

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(invalid(format!("invalid ngram_range ({min_n}, {max_n})")));
        }

        let token_pattern =
            Regex::new(&artifact.token_pattern).map_err(|source| ArtifactError::TokenPattern {
                pattern: artifact.token_pattern.clone(),
                source,
            })?;

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: Array1::from(artifact.idf),
            lowercase: artifact.lowercase,
            token_pattern,
            ngram_range: artifact.ngram_range,
            stop_words: artifact.stop_words.into_iter().collect(),
            sublinear_tf: artifact.sublinear_tf,
            binary: artifact.binary,
            norm: artifact.norm,
        })
    }

    /// Splits text into the terms the vocabulary is keyed by.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        // A capture group in the pattern selects the token, as in the exporter.
        let tokens: Vec<&str> = if self.token_pattern.captures_len() > 1 {
            self.token_pattern
                .captures_iter(&text)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
                .collect()
        } else {
            self.token_pattern
                .find_iter(&text)
                .map(|m| m.as_str())
                .collect()
        };

        let tokens: Vec<&str> = tokens
            .into_iter()
            .filter(|token| !self.stop_words.contains(*token))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            terms.extend(tokens.windows(n).map(|window| window.join(" ")));
        }
        terms
    }
}

impl Transformer for TfidfVectorizer {
    fn transform(&self, text: &str) -> Result<FeatureVector, InferenceError> {
        let mut tf = Array1::<f32>::zeros(self.idf.len());
        for term in self.analyze(text) {
            if let Some(&column) = self.vocabulary.get(&term) {
                tf[column] += 1.0;
            }
        }

        if self.binary {
            tf.mapv_inplace(|count| if count > 0.0 { 1.0 } else { 0.0 });
        }
        if self.sublinear_tf {
            tf.mapv_inplace(|count| if count > 0.0 { 1.0 + count.ln() } else { 0.0 });
        }

        let mut features = tf * &self.idf;
        normalize(&mut features, self.norm);
        Ok(features)
    }

    fn n_features(&self) -> usize {
        self.idf.len()
    }

    fn term_count(&self, text: &str) -> Option<usize> {
        Some(self.analyze(text).len())
    }
}

fn normalize(features: &mut FeatureVector, norm: Option<Norm>) {
    let length = match norm {
        Some(Norm::L2) => features.iter().map(|v| v * v).sum::<f32>().sqrt(),
        Some(Norm::L1) => features.iter().map(|v| v.abs()).sum::<f32>(),
        None => return,
    };

    if length > 0.0 {
        features.mapv_inplace(|v| v / length);
    }
}
