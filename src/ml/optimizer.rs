//! Adam optimizer over the parameters of a [`FeedForwardNetwork`].

use serde::{Deserialize, Serialize};

use crate::ml::network::{FeedForwardNetwork, Gradients};

/// Adam hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdamConfig {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
}

impl Default for AdamConfig {
    fn default() -> Self {
        AdamConfig {
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

impl AdamConfig {
    pub fn with_learning_rate(learning_rate: f32) -> Self {
        AdamConfig {
            learning_rate,
            ..Default::default()
        }
    }
}

/// Adam state: first and second moment estimates per parameter.
#[derive(Debug, Clone)]
pub struct Adam {
    config: AdamConfig,
    timestep: i32,
    m_weights: Vec<Vec<f32>>,
    v_weights: Vec<Vec<f32>>,
    m_biases: Vec<Vec<f32>>,
    v_biases: Vec<Vec<f32>>,
}

impl Adam {
    pub fn new(config: AdamConfig, network: &FeedForwardNetwork) -> Self {
        let zeros = Gradients::zeros_like(network);
        Adam {
            config,
            timestep: 0,
            m_weights: zeros.weights.clone(),
            v_weights: zeros.weights,
            m_biases: zeros.biases.clone(),
            v_biases: zeros.biases,
        }
    }

    pub fn config(&self) -> &AdamConfig {
        &self.config
    }

    /// Number of update steps taken so far.
    pub fn timestep(&self) -> i32 {
        self.timestep
    }

    /// Apply one bias-corrected Adam update using `grads`.
    pub fn step(&mut self, network: &mut FeedForwardNetwork, grads: &Gradients) {
        self.timestep += 1;
        let AdamConfig {
            learning_rate,
            beta1,
            beta2,
            epsilon,
        } = self.config;
        let bias_correction1 = 1.0 - beta1.powi(self.timestep);
        let bias_correction2_sqrt = (1.0 - beta2.powi(self.timestep)).sqrt();
        let step_size = learning_rate / bias_correction1;

        let update = |params: &mut [f32], m: &mut [f32], v: &mut [f32], g: &[f32]| {
            for i in 0..params.len() {
                m[i] = beta1 * m[i] + (1.0 - beta1) * g[i];
                v[i] = beta2 * v[i] + (1.0 - beta2) * g[i] * g[i];
                let denom = v[i].sqrt() / bias_correction2_sqrt + epsilon;
                params[i] -= step_size * m[i] / denom;
            }
        };

        for (l, layer) in network.layers_mut().iter_mut().enumerate() {
            update(
                &mut layer.weights,
                &mut self.m_weights[l],
                &mut self.v_weights[l],
                &grads.weights[l],
            );
            update(
                &mut layer.biases,
                &mut self.m_biases[l],
                &mut self.v_biases[l],
                &grads.biases[l],
            );
        }
    }
}
