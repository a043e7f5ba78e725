use std::fmt;

use serde::Deserialize;

use crate::error::InferenceError;

/// Form body posted to `/predict`.
#[derive(Debug, Deserialize, Clone)]
pub struct PredictForm {
    pub email_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Spam,
    Ham,
}

impl Label {
    /// Maps the classifier's numeric class onto a label. Only the two
    /// trained classes are accepted.
    pub fn from_class(class: i64) -> Result<Self, InferenceError> {
        match class {
            1 => Ok(Label::Spam),
            0 => Ok(Label::Ham),
            other => Err(InferenceError::UnknownClass(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Spam => "Spam",
            Label::Ham => "Ham",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    pub class: i64,
    pub label: Label,
}
