//! Feed-forward network used by the intent classifier.
//!
//! The network is a stack of fully connected layers. Every layer except the
//! last is followed by a ReLU activation and an inverted-dropout regularizer
//! that is active only during training. The last layer produces raw logits.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TazabotError};

/// Layer sizes and dropout rates of a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkArchitecture {
    /// Input dimension (vocabulary size).
    pub input_dim: usize,
    /// Hidden layer widths, in order.
    pub hidden_dims: Vec<usize>,
    /// Dropout rate after each hidden layer.
    pub dropout_rates: Vec<f32>,
    /// Output dimension (number of intents).
    pub output_dim: usize,
}

impl NetworkArchitecture {
    /// The 128 -> 64 -> 32 funnel used for intent classification.
    pub fn intent_funnel(input_dim: usize, output_dim: usize) -> Self {
        NetworkArchitecture {
            input_dim,
            hidden_dims: vec![128, 64, 32],
            dropout_rates: vec![0.5, 0.3, 0.2],
            output_dim,
        }
    }

    /// Sizes of every layer boundary, input first.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_dims.len() + 2);
        sizes.push(self.input_dim);
        sizes.extend(&self.hidden_dims);
        sizes.push(self.output_dim);
        sizes
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_dim == 0 {
            return Err(TazabotError::invalid_argument(
                "network needs at least one output",
            ));
        }
        if self.hidden_dims.len() != self.dropout_rates.len() {
            return Err(TazabotError::invalid_argument(format!(
                "{} hidden layers but {} dropout rates",
                self.hidden_dims.len(),
                self.dropout_rates.len()
            )));
        }
        if self.hidden_dims.contains(&0) {
            return Err(TazabotError::invalid_argument("hidden layer of width 0"));
        }
        if let Some(rate) = self
            .dropout_rates
            .iter()
            .find(|r| !(0.0..1.0).contains(*r))
        {
            return Err(TazabotError::invalid_argument(format!(
                "dropout rate {rate} outside [0, 1)"
            )));
        }
        Ok(())
    }
}

/// A fully connected layer. Weights are stored row-major as `[output][input]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub(crate) input_dim: usize,
    pub(crate) output_dim: usize,
    pub(crate) weights: Vec<f32>,
    pub(crate) biases: Vec<f32>,
}

impl DenseLayer {
    /// Create a layer with weights and biases drawn from `U(-1/sqrt(in), 1/sqrt(in))`.
    pub fn new<R: Rng>(input_dim: usize, output_dim: usize, rng: &mut R) -> Self {
        let bound = if input_dim == 0 {
            0.0
        } else {
            1.0 / (input_dim as f32).sqrt()
        };
        let mut sample = || {
            if bound > 0.0 {
                rng.random_range(-bound..bound)
            } else {
                0.0
            }
        };
        let weights = (0..input_dim * output_dim).map(|_| sample()).collect();
        let biases = (0..output_dim).map(|_| sample()).collect();
        DenseLayer {
            input_dim,
            output_dim,
            weights,
            biases,
        }
    }

    /// Compute `W x + b`.
    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        debug_assert_eq!(input.len(), self.input_dim);
        self.biases
            .iter()
            .enumerate()
            .map(|(o, &b)| {
                let row = &self.weights[o * self.input_dim..(o + 1) * self.input_dim];
                row.iter()
                    .zip(input)
                    .filter(|(_, x)| **x != 0.0)
                    .map(|(w, x)| w * x)
                    .sum::<f32>()
                    + b
            })
            .collect()
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    fn check_shape(&self) -> bool {
        self.weights.len() == self.input_dim * self.output_dim
            && self.biases.len() == self.output_dim
    }
}

/// Intermediate values recorded by a training forward pass.
#[derive(Debug, Clone)]
pub struct ForwardTrace {
    /// Input to each layer; `inputs[0]` is the network input.
    inputs: Vec<Vec<f32>>,
    /// Pre-activation of each hidden layer.
    pre_activations: Vec<Vec<f32>>,
    /// Dropout scale applied to each hidden unit (0 or `1/(1-p)`).
    masks: Vec<Vec<f32>>,
    /// Output logits.
    pub logits: Vec<f32>,
}

/// Accumulated parameter gradients, shaped like the network.
#[derive(Debug, Clone)]
pub struct Gradients {
    pub(crate) weights: Vec<Vec<f32>>,
    pub(crate) biases: Vec<Vec<f32>>,
}

impl Gradients {
    pub fn zeros_like(network: &FeedForwardNetwork) -> Self {
        Gradients {
            weights: network
                .layers
                .iter()
                .map(|l| vec![0.0; l.weights.len()])
                .collect(),
            biases: network
                .layers
                .iter()
                .map(|l| vec![0.0; l.biases.len()])
                .collect(),
        }
    }

    pub fn reset(&mut self) {
        for g in self.weights.iter_mut().chain(self.biases.iter_mut()) {
            g.iter_mut().for_each(|v| *v = 0.0);
        }
    }
}

/// Multi-layer perceptron with ReLU hidden layers and dropout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedForwardNetwork {
    architecture: NetworkArchitecture,
    layers: Vec<DenseLayer>,
}

impl FeedForwardNetwork {
    /// Create a randomly initialised network.
    pub fn new<R: Rng>(architecture: NetworkArchitecture, rng: &mut R) -> Result<Self> {
        architecture.validate()?;
        let sizes = architecture.layer_sizes();
        let layers = sizes
            .windows(2)
            .map(|pair| DenseLayer::new(pair[0], pair[1], rng))
            .collect();
        Ok(FeedForwardNetwork {
            architecture,
            layers,
        })
    }

    /// Check that the layers agree with the architecture.
    ///
    /// Used after deserializing parameters from disk.
    pub fn validate(&self) -> Result<()> {
        self.architecture.validate()?;
        let sizes = self.architecture.layer_sizes();
        if self.layers.len() != sizes.len() - 1 {
            return Err(TazabotError::configuration(format!(
                "expected {} layers, found {}",
                sizes.len() - 1,
                self.layers.len()
            )));
        }
        for (i, (layer, pair)) in self.layers.iter().zip(sizes.windows(2)).enumerate() {
            if layer.input_dim != pair[0] || layer.output_dim != pair[1] || !layer.check_shape() {
                return Err(TazabotError::configuration(format!(
                    "layer {i} has shape {}x{}, expected {}x{}",
                    layer.input_dim, layer.output_dim, pair[0], pair[1]
                )));
            }
        }
        Ok(())
    }

    pub fn architecture(&self) -> &NetworkArchitecture {
        &self.architecture
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [DenseLayer] {
        &mut self.layers
    }

    pub fn num_parameters(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.len() + l.biases.len())
            .sum()
    }

    /// Inference forward pass (dropout disabled). Returns logits.
    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        let last = self.layers.len() - 1;
        let mut activation = input.to_vec();
        for (i, layer) in self.layers.iter().enumerate() {
            activation = layer.forward(&activation);
            if i < last {
                relu_in_place(&mut activation);
            }
        }
        activation
    }

    /// Training forward pass with dropout, recording what backprop needs.
    pub fn forward_train<R: Rng>(&self, input: &[f32], rng: &mut R) -> ForwardTrace {
        let last = self.layers.len() - 1;
        let mut inputs = Vec::with_capacity(self.layers.len());
        let mut pre_activations = Vec::with_capacity(last);
        let mut masks = Vec::with_capacity(last);
        let mut activation = input.to_vec();

        for (i, layer) in self.layers.iter().enumerate() {
            let z = layer.forward(&activation);
            inputs.push(activation);
            if i == last {
                activation = z;
                break;
            }

            let rate = self.architecture.dropout_rates[i];
            let keep_scale = 1.0 / (1.0 - rate);
            let mask: Vec<f32> = (0..z.len())
                .map(|_| {
                    if rate > 0.0 && rng.random::<f32>() < rate {
                        0.0
                    } else {
                        keep_scale
                    }
                })
                .collect();
            activation = z
                .iter()
                .zip(&mask)
                .map(|(&v, &m)| v.max(0.0) * m)
                .collect();
            pre_activations.push(z);
            masks.push(mask);
        }

        ForwardTrace {
            inputs,
            pre_activations,
            masks,
            logits: activation,
        }
    }

    /// Back-propagate `grad_logits` through a recorded pass, adding into `grads`.
    pub fn backward(&self, trace: &ForwardTrace, grad_logits: &[f32], grads: &mut Gradients) {
        let mut delta = grad_logits.to_vec();

        for l in (0..self.layers.len()).rev() {
            let layer = &self.layers[l];
            let input = &trace.inputs[l];
            let grad_w = &mut grads.weights[l];
            let grad_b = &mut grads.biases[l];

            for (o, &d) in delta.iter().enumerate() {
                if d == 0.0 {
                    continue;
                }
                grad_b[o] += d;
                let row = &mut grad_w[o * layer.input_dim..(o + 1) * layer.input_dim];
                for (g, &x) in row.iter_mut().zip(input) {
                    if x != 0.0 {
                        *g += d * x;
                    }
                }
            }

            if l == 0 {
                break;
            }

            // Gradient w.r.t. this layer's input, then through dropout and ReLU
            // of the previous hidden layer.
            let mut prev = vec![0.0f32; layer.input_dim];
            for (o, &d) in delta.iter().enumerate() {
                if d == 0.0 {
                    continue;
                }
                let row = &layer.weights[o * layer.input_dim..(o + 1) * layer.input_dim];
                for (p, &w) in prev.iter_mut().zip(row) {
                    *p += w * d;
                }
            }
            let z = &trace.pre_activations[l - 1];
            let mask = &trace.masks[l - 1];
            for ((p, &zv), &m) in prev.iter_mut().zip(z).zip(mask) {
                if zv <= 0.0 {
                    *p = 0.0;
                } else {
                    *p *= m;
                }
            }
            delta = prev;
        }
    }
}

fn relu_in_place(values: &mut [f32]) {
    values.iter_mut().for_each(|v| *v = v.max(0.0));
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.iter().map(|&v| v / sum).collect()
}

/// Index of the largest value; the first one wins ties.
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

/// Cross-entropy of a probability distribution against a target class.
pub fn cross_entropy(probabilities: &[f32], target: usize) -> f32 {
    -probabilities[target].max(1e-12).ln()
}
