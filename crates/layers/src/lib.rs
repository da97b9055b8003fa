//! fixedrnn Layers
//!
//! Forward-only neural network building blocks over 16-bit fixed-point
//! matrices: dense layers, the gated blend, the GRU and fused
//! (TensorFlow-layout) GRU cells, the many-to-one RNN driver and the
//! complete embedding → RNN → output inference graph.

mod config;
mod dense;
mod error;
mod gate;
mod gru;
mod model;
mod rnn;
mod tf_gru;
mod weights;

pub use config::{ModelConfig, OutputType};
pub use dense::{dense, DenseLayer};
pub use error::{LayerError, Result};
pub use gate::apply_gate;
pub use gru::{GruCell, GruGate};
pub use model::{InferenceResult, SequenceModel};
pub use rnn::{rnn, run, CellType, RnnCell};
pub use tf_gru::{GateSplit, TfGruCell};
pub use weights::{CellWeights, DenseWeights, GruWeights, ModelWeights, TfGruWeights};
