//! Result flattening stage.
//!
//! The outermost wrapper: merges (observation, reward, done, info) into one
//! mapping so the training loop consumes a single uniform structure. Info
//! keys carry over under their own names; the three reserved keys abort on
//! collision rather than shadowing an info entry.

use std::collections::HashMap;
use std::marker::PhantomData;

use burn::tensor::backend::Backend;
use ndarray::{Array1, Array2};

use crate::tensor::DynTensor;
use crate::wrappers::tensor_env::{TensorGymEnv, TensorMap, TensorVecOut};

/// Keys the flattener claims for itself.
pub const RESERVED_KEYS: [&str; 3] = ["obs", "reward", "done"];

/// One entry of the flattened step mapping.
#[derive(Debug, Clone)]
pub enum StepValue<B: Backend> {
    /// The full observation map, stored under `"obs"`.
    Obs(TensorMap<B>),
    /// Host reward matrix `[n_envs, players]`, stored under `"reward"`.
    Reward(Array2<f32>),
    /// Per-instance done flags, stored under `"done"`.
    Done(Array1<bool>),
    /// An info entry carried over under its own key.
    Tensor(DynTensor<B>),
}

impl<B: Backend> StepValue<B> {
    /// The observation map, if this entry holds one.
    pub fn as_obs(&self) -> Option<&TensorMap<B>> {
        match self {
            Self::Obs(map) => Some(map),
            _ => None,
        }
    }

    /// The reward matrix, if this entry holds one.
    pub fn as_reward(&self) -> Option<&Array2<f32>> {
        match self {
            Self::Reward(reward) => Some(reward),
            _ => None,
        }
    }

    /// The done flags, if this entry holds them.
    pub fn as_done(&self) -> Option<&Array1<bool>> {
        match self {
            Self::Done(done) => Some(done),
            _ => None,
        }
    }

    /// The info tensor, if this entry holds one.
    pub fn as_tensor(&self) -> Option<&DynTensor<B>> {
        match self {
            Self::Tensor(tensor) => Some(tensor),
            _ => None,
        }
    }
}

/// Flattened step/reset result.
pub type StepMap<B> = HashMap<String, StepValue<B>>;

/// Flattens the four-part result into a single mapping.
pub struct DictEnv<E, B: Backend> {
    env: E,
    _backend: PhantomData<B>,
}

impl<E: TensorGymEnv<B>, B: Backend> DictEnv<E, B> {
    /// Wrap a tensor-level environment.
    pub fn new(env: E) -> Self {
        Self {
            env,
            _backend: PhantomData,
        }
    }

    /// Reference to the wrapped environment.
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Mutable reference to the wrapped environment.
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Reset and return the flattened mapping.
    pub fn reset(&mut self, force: bool) -> StepMap<B> {
        Self::flatten(self.env.reset(force))
    }

    /// Step and return the flattened mapping.
    pub fn step(&mut self, action: &TensorMap<B>) -> StepMap<B> {
        Self::flatten(self.env.step(action))
    }

    /// Seed instance `i` with `base_seed + i`.
    pub fn seed(&mut self, base_seed: u64) {
        self.env.seed(base_seed);
    }

    /// Close every instance.
    pub fn close(&mut self) {
        self.env.close();
    }

    fn flatten(out: TensorVecOut<B>) -> StepMap<B> {
        for key in RESERVED_KEYS {
            assert!(
                !out.info.contains_key(key),
                "info key '{key}' collides with a reserved output key"
            );
        }
        let mut map: StepMap<B> = out
            .info
            .into_iter()
            .map(|(key, val)| (key, StepValue::Tensor(val)))
            .collect();
        map.insert("obs".into(), StepValue::Obs(out.obs));
        map.insert("reward".into(), StepValue::Reward(out.reward));
        map.insert("done".into(), StepValue::Done(out.done));
        map
    }
}
