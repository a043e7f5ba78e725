use std::path::Path;

use tract_onnx::prelude::*;

use super::{argmax, Classifier, FeatureVector};
use crate::error::{ArtifactError, InferenceError};

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Classifier exported to ONNX, executed with tract.
///
/// The graph takes a `[1, n_features]` f32 input. Output 0 is either an
/// int64 label tensor or a float score tensor whose argmax is the class.
pub struct OnnxClassifier {
    plan: OnnxPlan,
    n_features: usize,
}

impl OnnxClassifier {
    pub fn from_path(path: &Path, n_features: usize) -> Result<Self, ArtifactError> {
        if !path.is_file() {
            return Err(ArtifactError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "model file not found"),
            });
        }

        let onnx_error = |e: TractError| ArtifactError::Onnx {
            path: path.to_path_buf(),
            message: format!("{e:#}"),
        };

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(onnx_error)?
            .with_input_fact(0, f32::fact([1, n_features]).into())
            .map_err(onnx_error)?
            .into_optimized()
            .map_err(onnx_error)?
            .into_runnable()
            .map_err(onnx_error)?;

        Ok(Self { plan, n_features })
    }
}

fn runtime_error(e: impl std::fmt::Display) -> InferenceError {
    InferenceError::Runtime(e.to_string())
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<i64, InferenceError> {
        if features.len() != self.n_features {
            return Err(InferenceError::DimensionMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let tensor = tract_ndarray::Array2::from_shape_vec((1, self.n_features), features.to_vec())
            .map_err(runtime_error)?
            .into_tensor();

        let outputs = self.plan.run(tvec!(tensor.into())).map_err(runtime_error)?;
        let output = outputs
            .first()
            .ok_or_else(|| runtime_error("model produced no outputs"))?;

        if output.datum_type() == i64::datum_type() {
            let labels = output.to_array_view::<i64>().map_err(runtime_error)?;
            return labels
                .iter()
                .next()
                .copied()
                .ok_or_else(|| runtime_error("label tensor is empty"));
        }

        let scores = output.cast_to::<f32>().map_err(runtime_error)?;
        let scores = scores.to_array_view::<f32>().map_err(runtime_error)?;
        argmax(scores.iter().copied())
            .map(|index| index as i64)
            .ok_or_else(|| runtime_error("score tensor is empty"))
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use ndarray::array;
    use prost::Message;
    use tempfile::Builder;
    use tract_onnx::pb;

    use super::*;

    fn int_attr(name: &str, value: i64) -> pb::AttributeProto {
        pb::AttributeProto {
            name: name.to_string(),
            r#type: pb::attribute_proto::AttributeType::Int as i32,
            i: value,
            ..Default::default()
        }
    }

    fn float_input(name: &str, dims: &[i64]) -> pb::ValueInfoProto {
        let dim = dims
            .iter()
            .map(|&d| pb::tensor_shape_proto::Dimension {
                value: Some(pb::tensor_shape_proto::dimension::Value::DimValue(d)),
                ..Default::default()
            })
            .collect();

        pb::ValueInfoProto {
            name: name.to_string(),
            r#type: Some(pb::TypeProto {
                value: Some(pb::type_proto::Value::TensorType(pb::type_proto::Tensor {
                    elem_type: pb::tensor_proto::DataType::Float as i32,
                    shape: Some(pb::TensorShapeProto { dim }),
                })),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// `input[1, 2] x weights[2, 2]` gives one score per class. With
    /// `label_output` an ArgMax node turns the scores into an int64 label.
    fn write_scoring_graph(path: &Path, label_output: bool) {
        let mut nodes = vec![pb::NodeProto {
            op_type: "MatMul".to_string(),
            input: vec!["input".to_string(), "weights".to_string()],
            output: vec!["scores".to_string()],
            ..Default::default()
        }];
        let mut output = "scores";
        if label_output {
            nodes.push(pb::NodeProto {
                op_type: "ArgMax".to_string(),
                input: vec!["scores".to_string()],
                output: vec!["label".to_string()],
                attribute: vec![int_attr("axis", 1), int_attr("keepdims", 0)],
                ..Default::default()
            });
            output = "label";
        }

        let graph = pb::GraphProto {
            name: "spam".to_string(),
            node: nodes,
            initializer: vec![pb::TensorProto {
                name: "weights".to_string(),
                dims: vec![2, 2],
                data_type: pb::tensor_proto::DataType::Float as i32,
                // feature 0 scores class 1, feature 1 scores class 0
                float_data: vec![0.0, 1.0, 1.0, 0.0],
                ..Default::default()
            }],
            input: vec![float_input("input", &[1, 2])],
            output: vec![pb::ValueInfoProto {
                name: output.to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let model = pb::ModelProto {
            ir_version: 7,
            opset_import: vec![pb::OperatorSetIdProto {
                domain: String::new(),
                version: 13,
            }],
            graph: Some(graph),
            ..Default::default()
        };
        std::fs::write(path, model.encode_to_vec()).unwrap();
    }

    #[test]
    fn float_scores_are_reduced_with_argmax() {
        let dir = Builder::new().prefix("onnx_model").tempdir().unwrap();
        let path = dir.path().join("scores.onnx");
        write_scoring_graph(&path, false);

        let clf = OnnxClassifier::from_path(&path, 2).unwrap();
        assert_eq!(clf.n_features(), Some(2));
        assert_eq!(clf.predict(&array![1.0, 0.0]).unwrap(), 1);
        assert_eq!(clf.predict(&array![0.0, 1.0]).unwrap(), 0);
    }

    #[test]
    fn int64_label_output_is_used_directly() {
        let dir = Builder::new().prefix("onnx_model").tempdir().unwrap();
        let path = dir.path().join("labels.onnx");
        write_scoring_graph(&path, true);

        let clf = OnnxClassifier::from_path(&path, 2).unwrap();
        assert_eq!(clf.predict(&array![1.0, 0.0]).unwrap(), 1);
        assert_eq!(clf.predict(&array![0.0, 1.0]).unwrap(), 0);
    }

    #[test]
    fn wrong_feature_width_is_rejected() {
        let dir = Builder::new().prefix("onnx_model").tempdir().unwrap();
        let path = dir.path().join("scores.onnx");
        write_scoring_graph(&path, false);

        let clf = OnnxClassifier::from_path(&path, 2).unwrap();
        assert!(matches!(
            clf.predict(&array![1.0, 0.0, 0.0]),
            Err(InferenceError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn missing_model_file_is_an_io_error() {
        let dir = Builder::new().prefix("onnx_model").tempdir().unwrap();
        let err = OnnxClassifier::from_path(&dir.path().join("spam_classifier.onnx"), 4)
            .err()
            .unwrap();
        assert!(matches!(err, ArtifactError::Io { .. }), "{err}");
    }

    #[test]
    fn corrupt_model_file_is_rejected() {
        let mut file = Builder::new().suffix(".onnx").tempfile().unwrap();
        file.write_all(b"definitely not a protobuf graph").unwrap();

        let err = OnnxClassifier::from_path(file.path(), 4).err().unwrap();
        assert!(matches!(err, ArtifactError::Onnx { .. }), "{err}");
    }
}
