//! Many-to-one sequence driver

use std::str::FromStr;

use fixedrnn_fixed_point::check_precision;
use fixedrnn_matrix::Matrix;
use serde::{Deserialize, Serialize};

use crate::error::{LayerError, Result};
use crate::gru::GruCell;
use crate::tf_gru::TfGruCell;

/// Recurrent cell kind, serialized as `"gru"` or `"tf_gru"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CellType {
    Gru,
    TfGru,
}

impl CellType {
    pub fn name(self) -> &'static str {
        match self {
            CellType::Gru => "gru",
            CellType::TfGru => "tf_gru",
        }
    }
}

impl FromStr for CellType {
    type Err = LayerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gru" => Ok(CellType::Gru),
            "tf_gru" => Ok(CellType::TfGru),
            _ => Err(LayerError::UnknownCellType(s.to_string())),
        }
    }
}

impl TryFrom<String> for CellType {
    type Error = LayerError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<CellType> for String {
    fn from(cell_type: CellType) -> String {
        cell_type.name().to_string()
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A recurrent cell of either kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RnnCell {
    Gru(GruCell),
    TfGru(TfGruCell),
}

impl RnnCell {
    pub fn cell_type(&self) -> CellType {
        match self {
            RnnCell::Gru(_) => CellType::Gru,
            RnnCell::TfGru(_) => CellType::TfGru,
        }
    }

    pub fn input_size(&self) -> usize {
        match self {
            RnnCell::Gru(cell) => cell.input_size(),
            RnnCell::TfGru(cell) => cell.input_size(),
        }
    }

    pub fn hidden_size(&self) -> usize {
        match self {
            RnnCell::Gru(cell) => cell.hidden_size(),
            RnnCell::TfGru(cell) => cell.hidden_size(),
        }
    }

    /// Random cell of the given kind (for testing and the demo command)
    pub fn random_seeded(
        cell_type: CellType,
        input_size: usize,
        hidden_size: usize,
        precision: u8,
        seed: u64,
    ) -> Self {
        match cell_type {
            CellType::Gru => {
                RnnCell::Gru(GruCell::random_seeded(input_size, hidden_size, precision, seed))
            }
            CellType::TfGru => {
                RnnCell::TfGru(TfGruCell::random_seeded(input_size, hidden_size, precision, seed))
            }
        }
    }

    /// One time step
    pub fn step(&self, input: &Matrix, state: &Matrix, precision: u8) -> Result<Matrix> {
        match self {
            RnnCell::Gru(cell) => cell.step(input, state, precision),
            RnnCell::TfGru(cell) => cell.step(input, state, precision),
        }
    }
}

impl From<GruCell> for RnnCell {
    fn from(cell: GruCell) -> Self {
        RnnCell::Gru(cell)
    }
}

impl From<TfGruCell> for RnnCell {
    fn from(cell: TfGruCell) -> Self {
        RnnCell::TfGru(cell)
    }
}

/// Run `cell` over `inputs`, leaving the final hidden state in `state`.
///
/// `state` is zeroed first, so its previous contents never leak into the
/// run. On error `state` holds whatever the last completed step produced and
/// must not be used as a summary.
pub fn rnn(inputs: &[Matrix], cell: &RnnCell, state: &mut Matrix, precision: u8) -> Result<()> {
    check_precision(precision)?;
    state.fill(0);

    for (t, input) in inputs.iter().enumerate() {
        *state = cell.step(input, state, precision)?;
        tracing::trace!(step = t, state = ?state.as_slice(), "RNN step");
    }

    tracing::debug!(
        cell = %cell.cell_type(),
        steps = inputs.len(),
        hidden = cell.hidden_size(),
        "RNN run complete"
    );
    Ok(())
}

/// Run `cell` over `inputs` from a fresh zero state and return the summary.
pub fn run(inputs: &[Matrix], cell: &RnnCell, precision: u8) -> Result<Matrix> {
    let mut state = Matrix::zeros(cell.hidden_size(), 1);
    rnn(inputs, cell, &mut state, precision)?;
    Ok(state)
}
