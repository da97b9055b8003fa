//! Model weights as exported by training
//!
//! Weights are stored as JSON with real-valued (`f64`) entries. Matrices are
//! lists of rows; biases are flat lists. Everything is quantized to the
//! model precision (truncating) when a [`SequenceModel`](crate::SequenceModel)
//! is built.
//!
//! ```json
//! {
//!   "embedding": [{"kernel": [[0.1, 0.2]], "bias": [0.0], "activation": "tanh"}],
//!   "cell": {"type": "tf_gru", "gates_kernel": [...], "gates_bias": [...],
//!            "candidates_kernel": [...], "candidates_bias": [...]},
//!   "output": [{"kernel": [[0.5]], "bias": [0.0]}]
//! }
//! ```

use std::path::Path;

use fixedrnn_fixed_point::Activation;
use fixedrnn_matrix::Matrix;
use serde::{Deserialize, Serialize};

use crate::dense::DenseLayer;
use crate::error::{expect_shape, LayerError, Result};
use crate::gru::{GruCell, GruGate};
use crate::rnn::{CellType, RnnCell};
use crate::tf_gru::TfGruCell;

/// Quantize a list of rows into a matrix
fn matrix_from_rows(name: &str, rows: &[Vec<f64>], precision: u8) -> Result<Matrix> {
    let cols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|row| row.len() != cols) {
        return Err(LayerError::InvalidShape {
            name: name.to_string(),
            expected: (rows.len(), cols),
            got: (rows.len(), bad.len()),
        });
    }
    let data: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(Matrix::from_f64(&data, rows.len(), cols, precision)?)
}

/// Quantize a flat list into a column
fn column(values: &[f64], precision: u8) -> Result<Matrix> {
    Ok(Matrix::from_f64(values, values.len(), 1, precision)?)
}

/// One dense layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseWeights {
    /// [out_features][in_features]
    pub kernel: Vec<Vec<f64>>,
    #[serde(default)]
    pub bias: Option<Vec<f64>>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseWeights {
    pub fn to_layer(&self, name: &str, precision: u8) -> Result<DenseLayer> {
        let kernel = matrix_from_rows(name, &self.kernel, precision)?;
        let bias = match &self.bias {
            Some(b) => {
                let bias = column(b, precision)?;
                expect_shape(name, &bias, (kernel.rows(), 1))?;
                Some(bias)
            }
            None => None,
        };
        Ok(DenseLayer::new(kernel, bias, self.activation))
    }
}

/// Weights of a [`GruCell`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GruWeights {
    pub u_update: Vec<Vec<f64>>,
    pub u_reset: Vec<Vec<f64>>,
    pub u_candidate: Vec<Vec<f64>>,
    pub w_update: Vec<Vec<f64>>,
    pub w_reset: Vec<Vec<f64>>,
    pub w_candidate: Vec<Vec<f64>>,
    pub b_update: Vec<f64>,
    pub b_reset: Vec<f64>,
    pub b_candidate: Vec<f64>,
}

impl GruWeights {
    pub fn to_cell(&self, precision: u8) -> Result<GruCell> {
        GruCell::new(
            gru_gate("update", &self.u_update, &self.w_update, &self.b_update, precision)?,
            gru_gate("reset", &self.u_reset, &self.w_reset, &self.b_reset, precision)?,
            gru_gate(
                "candidate",
                &self.u_candidate,
                &self.w_candidate,
                &self.b_candidate,
                precision,
            )?,
        )
    }
}

fn gru_gate(
    name: &str,
    u: &[Vec<f64>],
    w: &[Vec<f64>],
    b: &[f64],
    precision: u8,
) -> Result<GruGate> {
    Ok(GruGate::new(
        matrix_from_rows(&format!("u_{}", name), u, precision)?,
        matrix_from_rows(&format!("w_{}", name), w, precision)?,
        column(b, precision)?,
    ))
}

/// Weights of a [`TfGruCell`], named as in the TensorFlow export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfGruWeights {
    /// [2·hidden][input + hidden], reset rows first
    pub gates_kernel: Vec<Vec<f64>>,
    pub gates_bias: Vec<f64>,
    /// [hidden][input + hidden]
    pub candidates_kernel: Vec<Vec<f64>>,
    pub candidates_bias: Vec<f64>,
}

impl TfGruWeights {
    pub fn to_cell(&self, precision: u8) -> Result<TfGruCell> {
        TfGruCell::new(
            matrix_from_rows("gates_kernel", &self.gates_kernel, precision)?,
            column(&self.gates_bias, precision)?,
            matrix_from_rows("candidates_kernel", &self.candidates_kernel, precision)?,
            column(&self.candidates_bias, precision)?,
        )
    }
}

/// Recurrent cell weights, tagged by cell type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellWeights {
    Gru(GruWeights),
    TfGru(TfGruWeights),
}

impl CellWeights {
    pub fn cell_type(&self) -> CellType {
        match self {
            CellWeights::Gru(_) => CellType::Gru,
            CellWeights::TfGru(_) => CellType::TfGru,
        }
    }

    pub fn to_cell(&self, precision: u8) -> Result<RnnCell> {
        Ok(match self {
            CellWeights::Gru(w) => RnnCell::Gru(w.to_cell(precision)?),
            CellWeights::TfGru(w) => RnnCell::TfGru(w.to_cell(precision)?),
        })
    }
}

/// All weights of a sequence model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelWeights {
    /// Applied to every input step before the cell
    #[serde(default)]
    pub embedding: Vec<DenseWeights>,
    pub cell: CellWeights,
    /// Applied to the final state
    #[serde(default)]
    pub output: Vec<DenseWeights>,
}

impl ModelWeights {
    /// Load weights from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let weights: Self = serde_json::from_str(&content)?;
        Ok(weights)
    }
}
