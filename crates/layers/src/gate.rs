//! Gated blend of two states

use fixedrnn_fixed_point::{check_precision, ops};
use fixedrnn_matrix::Matrix;

use crate::error::Result;

/// `first ⊙ gate + second ⊙ (1 - gate)`.
///
/// The convex combination both GRU variants use to mix the previous state
/// (`first`) with the candidate (`second`) under the update gate.
pub fn apply_gate(gate: &Matrix, first: &Matrix, second: &Matrix, precision: u8) -> Result<Matrix> {
    check_precision(precision)?;
    let mut opp_gate = gate
        .scalar_product(ops::from_int(-1, precision), precision)
        .scalar_add(ops::from_int(1, precision));
    opp_gate.hadamard_assign(second, precision)?;

    let mut result = first.hadamard(gate, precision)?;
    result.add_assign(&opp_gate)?;
    Ok(result)
}
