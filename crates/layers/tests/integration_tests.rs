//! fixedrnn Integration Tests
//!
//! Fixed-point cells are checked against a floating-point reference GRU,
//! then the sequence driver and the full model path are exercised through
//! the public API only.

use fixedrnn_fixed_point::{ops, Activation};
use fixedrnn_layers::{
    run, CellType, CellWeights, DenseWeights, GruWeights, LayerError, ModelConfig, ModelWeights,
    OutputType, RnnCell, SequenceModel, TfGruWeights,
};
use fixedrnn_matrix::Matrix;

const P: u8 = 10;
const INPUT: usize = 3;
const HIDDEN: usize = 4;
const STEPS: usize = 6;

/// Deterministic weights in [-amp, amp]
fn wave(n: usize, offset: f64, amp: f64) -> Vec<f64> {
    (0..n).map(|i| amp * (i as f64 * 1.7 + offset).sin()).collect()
}

fn rows(values: Vec<f64>, cols: usize) -> Vec<Vec<f64>> {
    values.chunks(cols).map(<[f64]>::to_vec).collect()
}

fn sequence() -> Vec<Vec<f64>> {
    (0..STEPS)
        .map(|t| {
            (0..INPUT)
                .map(|i| 0.8 * (t as f64 * 0.9 + i as f64 * 1.3 + 0.2).sin())
                .collect()
        })
        .collect()
}

fn quantized_sequence() -> Vec<Matrix> {
    sequence()
        .iter()
        .map(|x| Matrix::from_f64(x, INPUT, 1, P).unwrap())
        .collect()
}

fn gru_weights() -> GruWeights {
    GruWeights {
        u_update: rows(wave(HIDDEN * INPUT, 0.3, 0.5), INPUT),
        w_update: rows(wave(HIDDEN * HIDDEN, 1.1, 0.5), HIDDEN),
        b_update: wave(HIDDEN, 2.3, 0.25),
        u_reset: rows(wave(HIDDEN * INPUT, 1.3, 0.5), INPUT),
        w_reset: rows(wave(HIDDEN * HIDDEN, 2.1, 0.5), HIDDEN),
        b_reset: wave(HIDDEN, 3.3, 0.25),
        u_candidate: rows(wave(HIDDEN * INPUT, 2.3, 0.5), INPUT),
        w_candidate: rows(wave(HIDDEN * HIDDEN, 3.1, 0.5), HIDDEN),
        b_candidate: wave(HIDDEN, 4.3, 0.25),
    }
}

fn tf_gru_weights() -> TfGruWeights {
    let stacked = INPUT + HIDDEN;
    TfGruWeights {
        gates_kernel: rows(wave(2 * HIDDEN * stacked, 0.7, 0.5), stacked),
        gates_bias: wave(2 * HIDDEN, 1.9, 0.25),
        candidates_kernel: rows(wave(HIDDEN * stacked, 2.9, 0.5), stacked),
        candidates_bias: wave(HIDDEN, 3.7, 0.25),
    }
}

fn assert_close(fixed: &Matrix, reference: &[f64], tol: f64) {
    let got = fixed.to_f64_vec(P);
    assert_eq!(got.len(), reference.len());
    for (i, (a, b)) in got.iter().zip(reference).enumerate() {
        assert!((a - b).abs() <= tol, "element {}: fixed {} vs reference {}", i, a, b);
    }
}

// =============================================================================
// Section 1: Floating-point reference
// =============================================================================

mod reference {
    fn matvec(m: &[Vec<f64>], x: &[f64]) -> Vec<f64> {
        m.iter()
            .map(|row| row.iter().zip(x).map(|(a, b)| a * b).sum())
            .collect()
    }

    fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    fn blend(z: &[f64], h: &[f64], c: &[f64]) -> Vec<f64> {
        z.iter()
            .zip(h)
            .zip(c)
            .map(|((z, h), c)| z * h + (1.0 - z) * c)
            .collect()
    }

    pub fn gru_step(w: &super::GruWeights, x: &[f64], h: &[f64]) -> Vec<f64> {
        let pre = |u: &[Vec<f64>], wh: &[Vec<f64>], b: &[f64], hh: &[f64]| -> Vec<f64> {
            matvec(wh, hh)
                .iter()
                .zip(matvec(u, x))
                .zip(b)
                .map(|((a, b), c)| a + b + c)
                .collect()
        };
        let z: Vec<f64> = pre(&w.u_update, &w.w_update, &w.b_update, h)
            .into_iter()
            .map(sigmoid)
            .collect();
        let r: Vec<f64> = pre(&w.u_reset, &w.w_reset, &w.b_reset, h)
            .into_iter()
            .map(sigmoid)
            .collect();
        let rh: Vec<f64> = r.iter().zip(h).map(|(r, h)| r * h).collect();
        let c: Vec<f64> = pre(&w.u_candidate, &w.w_candidate, &w.b_candidate, &rh)
            .into_iter()
            .map(f64::tanh)
            .collect();
        blend(&z, h, &c)
    }

    pub fn tf_gru_step(w: &super::TfGruWeights, x: &[f64], h: &[f64]) -> Vec<f64> {
        let hidden = h.len();
        let stacked: Vec<f64> = x.iter().chain(h).copied().collect();
        let gates: Vec<f64> = matvec(&w.gates_kernel, &stacked)
            .iter()
            .zip(&w.gates_bias)
            .map(|(v, b)| sigmoid(v + b))
            .collect();
        let (r, z) = gates.split_at(hidden);

        let rh: Vec<f64> = r.iter().zip(h).map(|(r, h)| r * h).collect();
        let stacked: Vec<f64> = x.iter().chain(&rh).copied().collect();
        let c: Vec<f64> = matvec(&w.candidates_kernel, &stacked)
            .iter()
            .zip(&w.candidates_bias)
            .map(|(v, b)| (v + b).tanh())
            .collect();
        blend(z, h, &c)
    }
}

// =============================================================================
// Section 2: Cells against the reference
// =============================================================================

mod cell_tests {
    use super::*;

    #[test]
    fn test_gru_tracks_float_reference() {
        let weights = gru_weights();
        let cell = RnnCell::Gru(weights.to_cell(P).unwrap());

        let mut h = vec![0.0; HIDDEN];
        for x in sequence() {
            h = reference::gru_step(&weights, &x, &h);
        }

        let state = run(&quantized_sequence(), &cell, P).unwrap();
        assert_close(&state, &h, 0.05);
    }

    #[test]
    fn test_tf_gru_tracks_float_reference() {
        let weights = tf_gru_weights();
        let cell = RnnCell::TfGru(weights.to_cell(P).unwrap());

        let mut h = vec![0.0; HIDDEN];
        for x in sequence() {
            h = reference::tf_gru_step(&weights, &x, &h);
        }

        let state = run(&quantized_sequence(), &cell, P).unwrap();
        assert_close(&state, &h, 0.05);
    }

    #[test]
    fn test_tf_gru_gate_order_is_load_bearing() {
        let weights = tf_gru_weights();
        let mut swapped = weights.clone();
        swapped.gates_kernel.rotate_left(HIDDEN);
        swapped.gates_bias.rotate_left(HIDDEN);

        let original = run(&quantized_sequence(), &RnnCell::TfGru(weights.to_cell(P).unwrap()), P).unwrap();
        let reordered = run(&quantized_sequence(), &RnnCell::TfGru(swapped.to_cell(P).unwrap()), P).unwrap();
        assert_ne!(original, reordered);

        // The reordered weights are a different model, and still match
        // their own reference
        let mut h = vec![0.0; HIDDEN];
        for x in sequence() {
            h = reference::tf_gru_step(&swapped, &x, &h);
        }
        assert_close(&reordered, &h, 0.05);
    }

    #[test]
    fn test_state_stays_bounded() {
        // Convex blend of |h| <= 1 and |tanh| <= 1
        let one = ops::one(P);
        for cell_type in [CellType::Gru, CellType::TfGru] {
            for seed in 0..4 {
                let cell = RnnCell::random_seeded(cell_type, INPUT, HIDDEN, P, seed);
                let state = run(&quantized_sequence(), &cell, P).unwrap();
                assert!(
                    state.as_slice().iter().all(|v| (-one..=one).contains(v)),
                    "{} seed {}: {:?}",
                    cell_type,
                    seed,
                    state.as_slice()
                );
            }
        }
    }
}

// =============================================================================
// Section 3: Sequence driver
// =============================================================================

mod driver_tests {
    use super::*;

    #[test]
    fn test_empty_sequence_summary_is_zero() {
        let cell = RnnCell::Gru(gru_weights().to_cell(P).unwrap());
        assert_eq!(run(&[], &cell, P).unwrap(), Matrix::zeros(HIDDEN, 1));
    }

    #[test]
    fn test_runs_are_independent() {
        let cell = RnnCell::TfGru(tf_gru_weights().to_cell(P).unwrap());
        let first = run(&quantized_sequence(), &cell, P).unwrap();
        let second = run(&quantized_sequence(), &cell, P).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_order_matters() {
        let cell = RnnCell::Gru(gru_weights().to_cell(P).unwrap());
        let mut reversed = quantized_sequence();
        reversed.reverse();
        assert_ne!(
            run(&quantized_sequence(), &cell, P).unwrap(),
            run(&reversed, &cell, P).unwrap()
        );
    }

    #[test]
    fn test_unknown_cell_type_rejected_before_running() {
        assert!(matches!(
            "vanilla".parse::<CellType>(),
            Err(LayerError::UnknownCellType(_))
        ));
    }
}

// =============================================================================
// Section 4: Full model
// =============================================================================

mod model_tests {
    use super::*;

    fn model_weights() -> ModelWeights {
        ModelWeights {
            embedding: vec![DenseWeights {
                kernel: rows(wave(INPUT * INPUT, 0.1, 0.8), INPUT),
                bias: Some(wave(INPUT, 0.4, 0.1)),
                activation: Activation::Tanh,
            }],
            cell: CellWeights::TfGru(tf_gru_weights()),
            output: vec![
                DenseWeights {
                    kernel: rows(wave(HIDDEN * HIDDEN, 5.1, 0.8), HIDDEN),
                    bias: None,
                    activation: Activation::Sigmoid,
                },
                DenseWeights {
                    kernel: rows(wave(3 * HIDDEN, 6.1, 0.8), HIDDEN),
                    bias: Some(vec![0.0, 0.1, -0.1]),
                    activation: Activation::Sigmoid,
                },
            ],
        }
    }

    fn model_config() -> ModelConfig {
        serde_json::from_str(&format!(
            r#"{{"name": "test", "cell_type": "tf_gru", "input_size": {}, "state_size": {},
                "precision": {}, "output_type": "multi_classification"}}"#,
            INPUT, HIDDEN, P
        ))
        .unwrap()
    }

    #[test]
    fn test_predict_matches_manual_pipeline() {
        let weights = model_weights();
        let model = SequenceModel::from_parts(model_config(), &weights).unwrap();
        let inputs = model.quantize_inputs(&sequence()).unwrap();
        let result = model.predict(&inputs).unwrap();

        // Same graph assembled by hand from the public building blocks
        let embedding = weights.embedding[0].to_layer("embedding.0", P).unwrap();
        let embedded: Vec<Matrix> = inputs
            .iter()
            .map(|x| embedding.forward(x, P).unwrap())
            .collect();
        let cell = weights.cell.to_cell(P).unwrap();
        let state = run(&embedded, &cell, P).unwrap();
        let hidden = weights.output[0].to_layer("output.0", P).unwrap().forward(&state, P).unwrap();
        let logits = weights.output[1]
            .to_layer("output.1", P)
            .unwrap()
            .with_activation(Activation::Linear)
            .forward(&hidden, P)
            .unwrap();

        assert_eq!(result.state, state);
        assert_eq!(result.logits, logits);
        assert_eq!(result.prediction as usize, logits.argmax().unwrap());
        assert_eq!(model.output_size(), 3);
    }

    #[test]
    fn test_model_files_roundtrip() {
        let dir = std::env::temp_dir().join(format!("fixedrnn-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let weights_path = dir.join("weights.json");
        let config_path = dir.join("config.json");

        std::fs::write(&weights_path, serde_json::to_string(&model_weights()).unwrap()).unwrap();
        std::fs::write(&config_path, serde_json::to_string(&model_config()).unwrap()).unwrap();

        let weights = ModelWeights::from_json_file(&weights_path).unwrap();
        let config = ModelConfig::from_json_file(&config_path).unwrap();
        assert_eq!(weights, model_weights());
        assert_eq!(config, model_config());

        let model = SequenceModel::from_parts(config, &weights).unwrap();
        let inputs = model.quantize_inputs(&sequence()).unwrap();
        assert!(model.predict(&inputs).is_ok());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ModelWeights::from_json_file("/nonexistent/fixedrnn/weights.json");
        assert!(matches!(result, Err(LayerError::Io(_))));
    }

    #[test]
    fn test_binary_prediction_is_sign_of_first_logit() {
        let config = ModelConfig {
            output_type: OutputType::BinaryClassification,
            ..model_config()
        };
        let model = SequenceModel::from_parts(config, &model_weights()).unwrap();
        let inputs = model.quantize_inputs(&sequence()).unwrap();
        let result = model.predict(&inputs).unwrap();
        assert_eq!(result.prediction, i16::from(result.logits.get(0, 0) > 0));
    }

    #[test]
    fn test_gru_model_rejects_tf_gru_weights() {
        let weights = ModelWeights {
            cell: CellWeights::Gru(gru_weights()),
            ..model_weights()
        };
        assert!(matches!(
            SequenceModel::from_parts(model_config(), &weights),
            Err(LayerError::Config(_))
        ));
    }
}
