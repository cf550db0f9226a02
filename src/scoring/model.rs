//! Feed-forward network scoring.
//!
//! Loads dense layer weights exported from a trained predictor and runs
//! inference over the same normalized feature vector the weighted sum uses.
//! Training happens elsewhere; this module only evaluates.
//!
//! File format:
//! ```json
//! {
//!   "layers": [
//!     { "weights": [[0.1, 0.2, 0.3, 0.4], ...], "biases": [0.0, ...], "activation": "relu" },
//!     { "weights": [[0.5, ...]], "biases": [0.0], "activation": "sigmoid" }
//!   ]
//! }
//! ```
//! `weights[j]` holds the input weights of output neuron `j`.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

use super::engine::ScoringStrategy;
use super::factors::Features;

/// Number of model inputs: one per metric
pub const INPUT_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Sigmoid,
    Linear,
}

impl Activation {
    fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Linear => x,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| {
                let z: f64 = row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + bias;
                self.activation.apply(z)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedForwardModel {
    pub layers: Vec<DenseLayer>,
}

impl FeedForwardModel {
    /// Build a model from layers, checking that shapes chain from 4 inputs to 1 output.
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self> {
        let model = Self { layers };
        model.check_shape()?;
        Ok(model)
    }

    /// Load and shape-check a model file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open model file at {}", path.display()))?;
        let model: FeedForwardModel = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse model file at {}", path.display()))?;
        model
            .check_shape()
            .with_context(|| format!("Invalid model in {}", path.display()))?;
        Ok(model)
    }

    fn check_shape(&self) -> Result<()> {
        if self.layers.is_empty() {
            bail!("model has no layers");
        }

        let mut width = INPUT_WIDTH;
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.weights.is_empty() {
                bail!("layer {} has no neurons", i);
            }
            if layer.biases.len() != layer.weights.len() {
                bail!(
                    "layer {} has {} weight rows but {} biases",
                    i,
                    layer.weights.len(),
                    layer.biases.len()
                );
            }
            for (j, row) in layer.weights.iter().enumerate() {
                if row.len() != width {
                    bail!(
                        "layer {} neuron {} expects {} inputs, previous layer provides {}",
                        i,
                        j,
                        row.len(),
                        width
                    );
                }
                if row.iter().any(|w| !w.is_finite()) {
                    bail!("layer {} neuron {} has a non-finite weight", i, j);
                }
            }
            if layer.biases.iter().any(|b| !b.is_finite()) {
                bail!("layer {} has a non-finite bias", i);
            }
            width = layer.weights.len();
        }

        if width != 1 {
            bail!("final layer must have exactly 1 output, found {}", width);
        }
        Ok(())
    }

    /// Raw network output for one feature vector
    pub fn forward(&self, features: &Features) -> f64 {
        let mut activations = features.to_array().to_vec();
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }
        activations.first().copied().unwrap_or(0.0)
    }
}

impl ScoringStrategy for FeedForwardModel {
    fn name(&self) -> &str {
        "model"
    }

    /// Network output clipped to [0, 1]
    fn predict(&self, features: &Features) -> f64 {
        let raw = self.forward(features);
        if raw.is_nan() {
            return 0.0;
        }
        raw.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{rank, Domains};
    use crate::supplier::SupplierRecord;
    use std::env;

    fn linear_model(weights: [f64; 4]) -> FeedForwardModel {
        FeedForwardModel::new(vec![DenseLayer {
            weights: vec![weights.to_vec()],
            biases: vec![0.0],
            activation: Activation::Linear,
        }])
        .unwrap()
    }

    fn features(cost: f64, co2: f64, delivery_time: f64, ethical_score: f64) -> Features {
        Features {
            cost,
            co2,
            delivery_time,
            ethical_score,
        }
    }

    #[test]
    fn test_linear_model_matches_weighted_sum() {
        let model = linear_model([0.3, 0.25, 0.25, 0.2]);
        let f = features(1.0, 0.5, 0.0, 0.8);
        let expected = 0.3 + 0.125 + 0.0 + 0.16;
        assert!((model.predict(&f) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_hidden_layer_relu() {
        // Hidden: h0 = relu(cost - co2), h1 = relu(co2 - cost); output = h0 + h1 = |cost - co2|
        let model = FeedForwardModel::new(vec![
            DenseLayer {
                weights: vec![vec![1.0, -1.0, 0.0, 0.0], vec![-1.0, 1.0, 0.0, 0.0]],
                biases: vec![0.0, 0.0],
                activation: Activation::Relu,
            },
            DenseLayer {
                weights: vec![vec![1.0, 1.0]],
                biases: vec![0.0],
                activation: Activation::Linear,
            },
        ])
        .unwrap();
        assert!((model.forward(&features(0.2, 0.7, 0.0, 0.0)) - 0.5).abs() < 1e-12);
        assert!((model.forward(&features(0.9, 0.1, 0.0, 0.0)) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_sigmoid_output() {
        let model = FeedForwardModel::new(vec![DenseLayer {
            weights: vec![vec![0.0; 4]],
            biases: vec![0.0],
            activation: Activation::Sigmoid,
        }])
        .unwrap();
        assert_eq!(model.predict(&features(0.3, 0.3, 0.3, 0.3)), 0.5);
    }

    #[test]
    fn test_prediction_clipped() {
        let model = linear_model([5.0, 5.0, 5.0, 5.0]);
        assert_eq!(model.predict(&features(1.0, 1.0, 1.0, 1.0)), 1.0);

        let negative = linear_model([-5.0, 0.0, 0.0, 0.0]);
        assert_eq!(negative.predict(&features(1.0, 0.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_rejects_wrong_input_width() {
        let result = FeedForwardModel::new(vec![DenseLayer {
            weights: vec![vec![1.0, 1.0, 1.0]],
            biases: vec![0.0],
            activation: Activation::Linear,
        }]);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("expects 3 inputs"), "got: {}", err);
    }

    #[test]
    fn test_rejects_multiple_outputs() {
        let result = FeedForwardModel::new(vec![DenseLayer {
            weights: vec![vec![1.0; 4], vec![1.0; 4]],
            biases: vec![0.0, 0.0],
            activation: Activation::Linear,
        }]);
        assert!(result.unwrap_err().to_string().contains("exactly 1 output"));
    }

    #[test]
    fn test_rejects_bias_mismatch() {
        let result = FeedForwardModel::new(vec![DenseLayer {
            weights: vec![vec![1.0; 4]],
            biases: vec![],
            activation: Activation::Linear,
        }]);
        assert!(result.unwrap_err().to_string().contains("biases"));
    }

    #[test]
    fn test_rejects_empty_model() {
        assert!(FeedForwardModel::new(vec![]).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = env::temp_dir().join("supplier_rank_test_model.json");
        let json = r#"{
            "layers": [
                { "weights": [[0.0, 0.0, 0.0, 1.0]], "biases": [0.0], "activation": "linear" }
            ]
        }"#;
        std::fs::write(&path, json).unwrap();

        let model = FeedForwardModel::load(&path).unwrap();
        assert_eq!(model.layers.len(), 1);
        assert_eq!(model.layers[0].activation, Activation::Linear);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let path = env::temp_dir().join("supplier_rank_test_model_missing.json");
        let _ = std::fs::remove_file(&path);
        let err = FeedForwardModel::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to open model file"));
    }

    #[test]
    fn test_model_as_ranking_strategy() {
        // Ethics-only network: the most ethical supplier wins
        let model = linear_model([0.0, 0.0, 0.0, 1.0]);
        let batch = vec![
            SupplierRecord::new("Cheap", 100.0, 50.0, 1, 10.0),
            SupplierRecord::new("Fair", 4000.0, 190.0, 50, 95.0),
        ];
        let results = rank(&batch, &model, &Domains::default()).unwrap();
        assert_eq!(results[0].supplier.name, "Fair");
        assert!((results[0].predicted_score - 0.95).abs() < 1e-12);
    }
}
