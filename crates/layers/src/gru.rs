//! GRU cell with separate per-gate weights
//!
//! One call to [`GruCell::step`] is one time step:
//!
//! ```text
//! z  = sigmoid(W_z·h + U_z·x + b_z)        update gate
//! r  = sigmoid(W_r·h + U_r·x + b_r)        reset gate
//! c  = tanh(W_c·(r ⊙ h) + U_c·x + b_c)     candidate
//! h' = z ⊙ h + (1 - z) ⊙ c
//! ```

use fixedrnn_fixed_point::{ops, sigmoid, tanh};
use fixedrnn_matrix::Matrix;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::error::{expect_shape, Result};
use crate::gate::apply_gate;

/// Parameters of one gate: input weights `u`, recurrent weights `w`, bias `b`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GruGate {
    /// Input-to-hidden weights [hidden × input]
    pub u: Matrix,
    /// Hidden-to-hidden weights [hidden × hidden]
    pub w: Matrix,
    /// Bias [hidden × 1]
    pub b: Matrix,
}

impl GruGate {
    pub fn new(u: Matrix, w: Matrix, b: Matrix) -> Self {
        Self { u, w, b }
    }

    /// `w · hidden + u · input + b`
    fn pre_activation(&self, input: &Matrix, hidden: &Matrix, precision: u8) -> Result<Matrix> {
        let mut out = self.w.multiply(hidden, precision)?;
        out.add_assign(&self.u.multiply(input, precision)?)?;
        out.add_assign(&self.b)?;
        Ok(out)
    }

    fn validate(&self, name: &str, input_size: usize, hidden_size: usize) -> Result<()> {
        expect_shape(&format!("u_{}", name), &self.u, (hidden_size, input_size))?;
        expect_shape(&format!("w_{}", name), &self.w, (hidden_size, hidden_size))?;
        expect_shape(&format!("b_{}", name), &self.b, (hidden_size, 1))?;
        Ok(())
    }

    fn random<R: Rng>(input_size: usize, hidden_size: usize, precision: u8, rng: &mut R) -> Self {
        Self {
            u: random_matrix(hidden_size, input_size, precision, rng),
            w: random_matrix(hidden_size, hidden_size, precision, rng),
            b: random_matrix(hidden_size, 1, precision, rng),
        }
    }
}

/// A GRU cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GruCell {
    pub update: GruGate,
    pub reset: GruGate,
    pub candidate: GruGate,
    input_size: usize,
    hidden_size: usize,
}

impl GruCell {
    /// Build a cell, checking every parameter shape against the update
    /// gate's `u` matrix.
    pub fn new(update: GruGate, reset: GruGate, candidate: GruGate) -> Result<Self> {
        let (hidden_size, input_size) = update.u.shape();
        update.validate("update", input_size, hidden_size)?;
        reset.validate("reset", input_size, hidden_size)?;
        candidate.validate("candidate", input_size, hidden_size)?;

        Ok(Self {
            update,
            reset,
            candidate,
            input_size,
            hidden_size,
        })
    }

    /// Random cell with weights uniform in [-0.5, 0.5) (for testing).
    /// `precision` must be in `1..=MAX_PRECISION`.
    pub fn random_seeded(input_size: usize, hidden_size: usize, precision: u8, seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        Self {
            update: GruGate::random(input_size, hidden_size, precision, &mut rng),
            reset: GruGate::random(input_size, hidden_size, precision, &mut rng),
            candidate: GruGate::random(input_size, hidden_size, precision, &mut rng),
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

    /// Advance the state by one time step
    pub fn step(&self, input: &Matrix, state: &Matrix, precision: u8) -> Result<Matrix> {
        let mut update = self.update.pre_activation(input, state, precision)?;
        update.map_in_place(sigmoid, precision)?;

        let mut reset = self.reset.pre_activation(input, state, precision)?;
        reset.map_in_place(sigmoid, precision)?;
        reset.hadamard_assign(state, precision)?;

        let mut candidate = self.candidate.pre_activation(input, &reset, precision)?;
        candidate.map_in_place(tanh, precision)?;

        apply_gate(&update, state, &candidate, precision)
    }
}

pub(crate) fn random_matrix<R: Rng>(rows: usize, cols: usize, precision: u8, rng: &mut R) -> Matrix {
    let mut m = Matrix::zeros(rows, cols);
    for r in 0..rows {
        for c in 0..cols {
            m.set(r, c, ops::from_f64(rng.gen_range(-0.5..0.5), precision));
        }
    }
    m
}
