//! Fused GRU cell in the TensorFlow weight layout
//!
//! Both gates share one kernel applied to the stacked column `[x; h]`:
//!
//! ```text
//! [r; z] = sigmoid(W_gates·[x; h] + b_gates)
//! c      = tanh(W_cand·[x; r ⊙ h] + b_cand)
//! h'     = z ⊙ h + (1 - z) ⊙ c
//! ```
//!
//! The first `hidden` rows of the gate block are the reset gate and the next
//! `hidden` rows the update gate. Trained weights depend on this order.

use fixedrnn_fixed_point::{sigmoid, tanh};
use fixedrnn_matrix::Matrix;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::error::{expect_shape, LayerError, Result};
use crate::gate::apply_gate;
use crate::gru::random_matrix;

/// The two halves of an activated gate block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSplit {
    /// Rows `[0, hidden)`
    pub reset: Matrix,
    /// Rows `[hidden, 2·hidden)`
    pub update: Matrix,
}

impl GateSplit {
    /// Split a `(2·hidden) × 1` gate block into reset and update gates
    pub fn from_gates(gates: &Matrix, hidden_size: usize) -> Result<Self> {
        expect_shape("gates", gates, (2 * hidden_size, gates.cols()))?;
        Ok(Self {
            reset: Self::reset_rows(gates, hidden_size)?,
            update: Self::update_rows(gates, hidden_size)?,
        })
    }

    fn reset_rows(gates: &Matrix, hidden_size: usize) -> Result<Matrix> {
        Ok(gates.rows_range(0, hidden_size)?)
    }

    fn update_rows(gates: &Matrix, hidden_size: usize) -> Result<Matrix> {
        Ok(gates.rows_range(hidden_size, 2 * hidden_size)?)
    }
}

/// A fused GRU cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TfGruCell {
    /// Gate kernel [2·hidden × (input + hidden)], reset rows first
    pub w_gates: Matrix,
    /// Gate bias [2·hidden × 1]
    pub b_gates: Matrix,
    /// Candidate kernel [hidden × (input + hidden)]
    pub w_candidates: Matrix,
    /// Candidate bias [hidden × 1]
    pub b_candidates: Matrix,
    input_size: usize,
    hidden_size: usize,
}

impl TfGruCell {
    /// Build a cell; sizes are derived from the candidate kernel and bias.
    pub fn new(
        w_gates: Matrix,
        b_gates: Matrix,
        w_candidates: Matrix,
        b_candidates: Matrix,
    ) -> Result<Self> {
        let hidden_size = b_candidates.rows();
        let input_size = w_candidates
            .cols()
            .checked_sub(hidden_size)
            .ok_or_else(|| LayerError::InvalidShape {
                name: "w_candidates".to_string(),
                expected: (hidden_size, hidden_size),
                got: w_candidates.shape(),
            })?;
        let stacked = input_size + hidden_size;

        expect_shape("b_candidates", &b_candidates, (hidden_size, 1))?;
        expect_shape("w_candidates", &w_candidates, (hidden_size, stacked))?;
        expect_shape("w_gates", &w_gates, (2 * hidden_size, stacked))?;
        expect_shape("b_gates", &b_gates, (2 * hidden_size, 1))?;

        Ok(Self {
            w_gates,
            b_gates,
            w_candidates,
            b_candidates,
            input_size,
            hidden_size,
        })
    }

    /// Random cell with weights uniform in [-0.5, 0.5) (for testing).
    /// `precision` must be in `1..=MAX_PRECISION`.
    pub fn random_seeded(input_size: usize, hidden_size: usize, precision: u8, seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let stacked = input_size + hidden_size;
        Self {
            w_gates: random_matrix(2 * hidden_size, stacked, precision, &mut rng),
            b_gates: random_matrix(2 * hidden_size, 1, precision, &mut rng),
            w_candidates: random_matrix(hidden_size, stacked, precision, &mut rng),
            b_candidates: random_matrix(hidden_size, 1, precision, &mut rng),
            input_size,
            hidden_size,
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Activated gates for one step, split into reset and update halves
    pub fn gates(&self, input: &Matrix, state: &Matrix, precision: u8) -> Result<GateSplit> {
        let stacked = Matrix::stack(input, state)?;
        let mut gates = self.w_gates.multiply(&stacked, precision)?;
        gates.add_assign(&self.b_gates)?;
        gates.map_in_place(sigmoid, precision)?;
        GateSplit::from_gates(&gates, self.hidden_size)
    }

    /// Advance the state by one time step
    pub fn step(&self, input: &Matrix, state: &Matrix, precision: u8) -> Result<Matrix> {
        let GateSplit { mut reset, update } = self.gates(input, state, precision)?;

        reset.hadamard_assign(state, precision)?;
        let stacked = Matrix::stack(input, &reset)?;

        let mut candidate = self.w_candidates.multiply(&stacked, precision)?;
        candidate.add_assign(&self.b_candidates)?;
        candidate.map_in_place(tanh, precision)?;

        apply_gate(&update, state, &candidate, precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixedrnn_fixed_point::ops;

    const P: u8 = 8;

    fn column(values: &[f64]) -> Matrix {
        Matrix::from_f64(values, values.len(), 1, P).unwrap()
    }

    fn constant(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix::from_f64(&vec![value; rows * cols], rows, cols, P).unwrap()
    }

    #[test]
    fn test_gate_split_order() {
        let gates = Matrix::column(vec![1, 2, 3, 4]);
        let split = GateSplit::from_gates(&gates, 2).unwrap();
        assert_eq!(split.reset.as_slice(), &[1, 2]);
        assert_eq!(split.update.as_slice(), &[3, 4]);

        assert!(GateSplit::from_gates(&gates, 3).is_err());
    }

    #[test]
    fn test_new_derives_sizes() {
        let cell = TfGruCell::new(
            Matrix::zeros(4, 5),
            Matrix::zeros(4, 1),
            Matrix::zeros(2, 5),
            Matrix::zeros(2, 1),
        )
        .unwrap();
        assert_eq!(cell.input_size(), 3);
        assert_eq!(cell.hidden_size(), 2);

        let err = TfGruCell::new(
            Matrix::zeros(3, 5),
            Matrix::zeros(4, 1),
            Matrix::zeros(2, 5),
            Matrix::zeros(2, 1),
        )
        .unwrap_err();
        assert!(matches!(err, LayerError::InvalidShape { ref name, .. } if name == "w_gates"));
    }

    /// Zero kernels; the gate bias alone sets reset (first half) and update
    /// (second half).
    fn biased_cell(reset_bias: f64, update_bias: f64) -> TfGruCell {
        let hidden = 2;
        let input = 1;
        // Candidate reads only the (reset-masked) state: [0 | 1 1]
        let mut w_candidates = Matrix::zeros(hidden, input + hidden);
        for r in 0..hidden {
            for c in input..input + hidden {
                w_candidates.set(r, c, ops::one(P));
            }
        }
        TfGruCell::new(
            constant(2 * hidden, input + hidden, 0.0),
            column(&[reset_bias, reset_bias, update_bias, update_bias]),
            w_candidates,
            constant(hidden, 1, 0.0),
        )
        .unwrap()
    }

    #[test]
    fn test_update_half_controls_blend() {
        let state = column(&[0.5, -0.25]);
        let input = column(&[1.0]);

        // Update saturated open: state passes through regardless of reset
        let keep = biased_cell(-8.0, 8.0);
        assert_eq!(keep.step(&input, &state, P).unwrap(), state);

        // Swapping the halves closes the update gate and masks the state
        let swapped = biased_cell(8.0, -8.0);
        let next = swapped.step(&input, &state, P).unwrap();
        let expected = fixedrnn_fixed_point::tanh(ops::from_f64(0.25, P), P).unwrap();
        assert_eq!(next.as_slice(), &[expected; 2]);
    }

    #[test]
    fn test_reset_half_masks_state() {
        let state = column(&[0.5, -0.25]);
        let input = column(&[1.0]);

        // Update closed, reset closed: candidate sees a zero state
        let cell = biased_cell(-8.0, -8.0);
        assert_eq!(cell.step(&input, &state, P).unwrap(), Matrix::zeros(2, 1));
    }

    #[test]
    fn test_gates_accessor() {
        let cell = biased_cell(-8.0, 8.0);
        let split = cell.gates(&column(&[0.0]), &column(&[0.0, 0.0]), P).unwrap();
        assert_eq!(split.reset, Matrix::zeros(2, 1));
        assert_eq!(split.update.as_slice(), &[ops::one(P); 2]);
    }

    #[test]
    fn test_random_seeded_shapes() {
        let cell = TfGruCell::random_seeded(3, 4, P, 11);
        assert_eq!(cell.w_gates.shape(), (8, 7));
        assert_eq!(cell.w_candidates.shape(), (4, 7));
        let next = cell.step(&Matrix::zeros(3, 1), &Matrix::zeros(4, 1), P).unwrap();
        assert_eq!(next.shape(), (4, 1));
    }
}
