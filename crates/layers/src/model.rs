//! Complete sequence model: embedding → recurrent cell → output
//!
//! Every input step passes through the embedding dense stack before it is fed
//! to the cell. After the last step the output dense stack turns the final
//! hidden state into logits, which the [`OutputType`] turns into a single
//! prediction.

use fixedrnn_fixed_point::Activation;
use fixedrnn_matrix::Matrix;

use crate::config::{ModelConfig, OutputType};
use crate::dense::DenseLayer;
use crate::error::{LayerError, Result};
use crate::rnn::{rnn, RnnCell};
use crate::weights::ModelWeights;

/// Result of one [`SequenceModel::predict`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceResult {
    /// Class index, `0`/`1`, or the raw fixed-point regression value
    pub prediction: i16,
    /// Output of the last output layer
    pub logits: Matrix,
    /// Final hidden state
    pub state: Matrix,
}

/// A quantized model ready for inference
#[derive(Debug, Clone)]
pub struct SequenceModel {
    config: ModelConfig,
    embedding: Vec<DenseLayer>,
    cell: RnnCell,
    output: Vec<DenseLayer>,
}

impl SequenceModel {
    /// Quantize `weights` at the configured precision and check that the
    /// layer sizes chain together.
    pub fn from_parts(config: ModelConfig, weights: &ModelWeights) -> Result<Self> {
        config.validate()?;
        let precision = config.precision_bits();

        let cell_type = config.cell_type;
        if weights.cell.cell_type() != cell_type {
            return Err(LayerError::Config(format!(
                "config cell_type is {} but weights contain a {} cell",
                cell_type,
                weights.cell.cell_type()
            )));
        }

        let embedding = weights
            .embedding
            .iter()
            .enumerate()
            .map(|(i, w)| w.to_layer(&format!("embedding.{}", i), precision))
            .collect::<Result<Vec<_>>>()?;
        let cell = weights.cell.to_cell(precision)?;
        let mut output = weights
            .output
            .iter()
            .enumerate()
            .map(|(i, w)| w.to_layer(&format!("output.{}", i), precision))
            .collect::<Result<Vec<_>>>()?;

        // The last output layer always produces raw logits
        if let Some(last) = output.pop() {
            output.push(last.with_activation(Activation::Linear));
        }

        check_chain("embedding", config.input_size, &embedding, cell.input_size())?;
        if cell.hidden_size() != config.state_size {
            return Err(LayerError::Config(format!(
                "state_size is {} but the cell has {} hidden units",
                config.state_size,
                cell.hidden_size()
            )));
        }
        let output_size = output.last().map_or(cell.hidden_size(), DenseLayer::out_features);
        check_chain("output", cell.hidden_size(), &output, output_size)?;

        tracing::debug!(
            name = %config.name,
            cell = %cell_type,
            precision = precision,
            embedding_layers = embedding.len(),
            output_layers = output.len(),
            "Loaded sequence model"
        );

        Ok(Self {
            config,
            embedding,
            cell,
            output,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn cell(&self) -> &RnnCell {
        &self.cell
    }

    /// Number of logits produced
    pub fn output_size(&self) -> usize {
        self.output
            .last()
            .map_or(self.cell.hidden_size(), DenseLayer::out_features)
    }

    /// Quantize real-valued steps into `input_size × 1` columns
    pub fn quantize_inputs(&self, steps: &[Vec<f64>]) -> Result<Vec<Matrix>> {
        let precision = self.config.precision_bits();
        steps
            .iter()
            .map(|step| {
                if step.len() != self.config.input_size {
                    return Err(LayerError::InvalidShape {
                        name: "input".to_string(),
                        expected: (self.config.input_size, 1),
                        got: (step.len(), 1),
                    });
                }
                Ok(Matrix::from_f64(step, step.len(), 1, precision)?)
            })
            .collect()
    }

    /// Run the full graph over a sequence of `input_size × 1` columns
    pub fn predict(&self, inputs: &[Matrix]) -> Result<InferenceResult> {
        if inputs.is_empty() {
            return Err(LayerError::EmptySequence);
        }
        if let Some(expected) = self.config.seq_length {
            if inputs.len() != expected {
                return Err(LayerError::SequenceLength {
                    expected,
                    got: inputs.len(),
                });
            }
        }

        let precision = self.config.precision_bits();
        let embedded = inputs
            .iter()
            .map(|x| forward_stack(&self.embedding, x, precision))
            .collect::<Result<Vec<_>>>()?;

        let mut state = Matrix::zeros(self.cell.hidden_size(), 1);
        rnn(&embedded, &self.cell, &mut state, precision)?;

        let logits = forward_stack(&self.output, &state, precision)?;
        let prediction = self.prediction(&logits)?;

        tracing::debug!(
            steps = inputs.len(),
            prediction = prediction,
            "Sequence prediction"
        );

        Ok(InferenceResult {
            prediction,
            logits,
            state,
        })
    }

    fn prediction(&self, logits: &Matrix) -> Result<i16> {
        let first = logits.as_slice().first().copied().ok_or_else(|| {
            LayerError::Config("model produces no outputs".to_string())
        })?;

        Ok(match self.config.output_type {
            OutputType::Regression => first,
            OutputType::BinaryClassification => i16::from(first > 0),
            OutputType::MultiClassification => {
                // Non-empty, so argmax is Some
                logits.argmax().unwrap_or(0) as i16
            }
        })
    }
}

fn forward_stack(layers: &[DenseLayer], input: &Matrix, precision: u8) -> Result<Matrix> {
    let mut x = input.clone();
    for layer in layers {
        x = layer.forward(&x, precision)?;
    }
    Ok(x)
}

/// Check that `layers` map `input` features to `output` features
fn check_chain(stack: &str, input: usize, layers: &[DenseLayer], output: usize) -> Result<()> {
    let mut features = input;
    for (i, layer) in layers.iter().enumerate() {
        if layer.in_features() != features {
            return Err(LayerError::InvalidShape {
                name: format!("{}.{}", stack, i),
                expected: (layer.out_features(), features),
                got: layer.kernel.shape(),
            });
        }
        features = layer.out_features();
    }
    if features != output {
        return Err(LayerError::Config(format!(
            "{} stack produces {} features, expected {}",
            stack, features, output
        )));
    }
    Ok(())
}
