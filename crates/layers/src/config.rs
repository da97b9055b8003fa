//! Sequence model configuration

use std::path::Path;

use fixedrnn_fixed_point::Precision;
use serde::{Deserialize, Serialize};

use crate::error::{LayerError, Result};
use crate::rnn::CellType;

/// How the output logits become a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    /// Raw fixed-point value of the first logit
    Regression,
    /// `1` when the first logit is positive, else `0`
    BinaryClassification,
    /// Index of the largest logit
    #[default]
    MultiClassification,
}

/// Model configuration, stored next to the weights as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name (informational)
    #[serde(default = "default_name")]
    pub name: String,

    /// Recurrent cell kind, `"gru"` or `"tf_gru"`
    #[serde(default = "default_cell_type")]
    pub cell_type: CellType,

    /// Features per time step, before the embedding layers
    #[serde(default = "default_input_size")]
    pub input_size: usize,

    /// Hidden state size
    #[serde(default = "default_state_size")]
    pub state_size: usize,

    /// Fractional bits used for every value in the model
    #[serde(default)]
    pub precision: Precision,

    #[serde(default)]
    pub output_type: OutputType,

    /// Fixed sequence length, if the model was exported with one
    #[serde(default)]
    pub seq_length: Option<usize>,
}

fn default_name() -> String { "fixedrnn".to_string() }
fn default_cell_type() -> CellType { CellType::Gru }
fn default_input_size() -> usize { 1 }
fn default_state_size() -> usize { 16 }

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            cell_type: default_cell_type(),
            input_size: default_input_size(),
            state_size: default_state_size(),
            precision: Precision::default(),
            output_type: OutputType::default(),
            seq_length: None,
        }
    }
}

impl ModelConfig {
    /// Load config from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Precision as a raw fractional-bit count
    pub fn precision_bits(&self) -> u8 {
        self.precision.bits()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(LayerError::Config("input_size must be positive".to_string()));
        }
        if self.state_size == 0 {
            return Err(LayerError::Config("state_size must be positive".to_string()));
        }
        if self.seq_length == Some(0) {
            return Err(LayerError::Config("seq_length must be positive".to_string()));
        }
        Ok(())
    }

    /// Apply overrides from the process environment
    ///
    /// - `FIXEDRNN_PRECISION`: fractional bits
    /// - `FIXEDRNN_CELL_TYPE`: `gru` or `tf_gru`
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by environment variable name
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(precision) = lookup("FIXEDRNN_PRECISION") {
            let bits: u8 = precision.trim().parse().map_err(|_| {
                LayerError::Config(format!("FIXEDRNN_PRECISION is not a number: {}", precision))
            })?;
            self.precision = Precision::new(bits)?;
        }
        if let Some(cell_type) = lookup("FIXEDRNN_CELL_TYPE") {
            self.cell_type = cell_type.parse().map_err(|e| {
                tracing::warn!(cell_type = %cell_type, "Rejected FIXEDRNN_CELL_TYPE override");
                e
            })?;
        }
        Ok(self)
    }
}
