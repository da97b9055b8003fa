//! Dense (fully-connected) layer

use fixedrnn_fixed_point::Activation;
use fixedrnn_matrix::Matrix;

use crate::error::Result;

/// `activation(w · input + b)`, elementwise.
///
/// `b = None` skips the bias add. Shapes are only checked by the matrix
/// operations themselves.
pub fn dense(
    input: &Matrix,
    w: &Matrix,
    b: Option<&Matrix>,
    activation: Activation,
    precision: u8,
) -> Result<Matrix> {
    let mut result = w.multiply(input, precision)?;

    if let Some(bias) = b {
        result.add_assign(bias)?;
    }

    result.map_in_place(|x, p| activation.apply(x, p), precision)?;
    Ok(result)
}

/// A dense layer with owned parameters
#[derive(Debug, Clone)]
pub struct DenseLayer {
    /// Weight matrix [out_features × in_features]
    pub kernel: Matrix,
    /// Bias column [out_features × 1]
    pub bias: Option<Matrix>,
    pub activation: Activation,
}

impl DenseLayer {
    pub fn new(kernel: Matrix, bias: Option<Matrix>, activation: Activation) -> Self {
        Self {
            kernel,
            bias,
            activation,
        }
    }

    pub fn in_features(&self) -> usize {
        self.kernel.cols()
    }

    pub fn out_features(&self) -> usize {
        self.kernel.rows()
    }

    pub fn forward(&self, input: &Matrix, precision: u8) -> Result<Matrix> {
        dense(input, &self.kernel, self.bias.as_ref(), self.activation, precision)
    }

    /// Same layer with a different activation
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }
}
