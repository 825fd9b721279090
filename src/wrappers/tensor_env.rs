//! Host/device bridge stage.
//!
//! Moves batched observation and info maps onto the training device and
//! converts tensor actions back to host arrays before forwarding them to
//! the vectorizer. Reward and done stay host-resident; downstream training
//! code consumes them as scalars.
//!
//! Transfers may be asynchronous on the backend, but every read goes
//! through `into_data`, which synchronizes first, so no transfer race is
//! ever visible to the caller.

use std::collections::HashMap;

use burn::tensor::backend::Backend;
use ndarray::{Array1, Array2};

use crate::env::Action;
use crate::tensor::DynTensor;
use crate::wrappers::vec_env::{VecGymEnv, VecOut};

/// Named device-tensor channels.
pub type TensorMap<B> = HashMap<String, DynTensor<B>>;

/// Batched result with device-resident observation and info maps.
#[derive(Debug, Clone)]
pub struct TensorVecOut<B: Backend> {
    /// Stacked observation channels on the device.
    pub obs: TensorMap<B>,
    /// Per-instance, per-player reward (host).
    pub reward: Array2<f32>,
    /// Per-instance done flags (host).
    pub done: Array1<bool>,
    /// Stacked info entries on the device.
    pub info: TensorMap<B>,
}

/// Tensor-level batched environment interface.
pub trait TensorGymEnv<B: Backend> {
    /// Reset instances and return device-resident results.
    fn reset(&mut self, force: bool) -> TensorVecOut<B>;

    /// Step with a batched tensor action.
    fn step(&mut self, action: &TensorMap<B>) -> TensorVecOut<B>;

    /// Seed instance `i` with `base_seed + i`.
    fn seed(&mut self, base_seed: u64);

    /// Close every instance.
    fn close(&mut self);
}

/// Bridges a vectorized environment onto a burn device.
pub struct TensorEnv<E, B: Backend> {
    env: E,
    device: B::Device,
}

impl<E: VecGymEnv, B: Backend> TensorEnv<E, B> {
    /// Wrap a vectorized environment, placing results on `device`.
    pub fn new(env: E, device: B::Device) -> Self {
        Self { env, device }
    }

    /// Reference to the wrapped environment.
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Mutable reference to the wrapped environment.
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Device results are placed on.
    pub fn device(&self) -> &B::Device {
        &self.device
    }

    fn lift(&self, out: VecOut) -> TensorVecOut<B> {
        let upload = |map: HashMap<String, ndarray::ArrayD<f32>>| -> TensorMap<B> {
            map.into_iter()
                .map(|(key, val)| (key, DynTensor::from_array(&val, &self.device)))
                .collect()
        };
        TensorVecOut {
            obs: upload(out.obs),
            reward: out.reward,
            done: out.done,
            info: upload(out.info),
        }
    }

    fn download(action: &TensorMap<B>) -> Action {
        action
            .iter()
            .map(|(key, tensor)| (key.clone(), tensor.to_array()))
            .collect()
    }
}

impl<E: VecGymEnv, B: Backend> TensorGymEnv<B> for TensorEnv<E, B> {
    fn reset(&mut self, force: bool) -> TensorVecOut<B> {
        let out = self.env.reset(force);
        self.lift(out)
    }

    fn step(&mut self, action: &TensorMap<B>) -> TensorVecOut<B> {
        let host_action = Self::download(action);
        let out = self.env.step(&host_action);
        self.lift(out)
    }

    fn seed(&mut self, base_seed: u64) {
        self.env.seed(base_seed);
    }

    fn close(&mut self) {
        self.env.close();
    }
}
