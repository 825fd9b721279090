//! Environment vectorization stage.
//!
//! Owns a fixed list of independent instances, steps them sequentially, and
//! stacks the four result components along a new leading batch axis. There
//! is no worker pool here: any parallelism lives outside this crate, driving
//! multiple vectorizers.

use std::collections::BTreeSet;

use ndarray::{Array1, Array2, Axis};
use tracing::debug;

use crate::env::{Action, EnvOut, GymEnv, Info, Observation};
use crate::error::{EnvError, Result};

/// Batched counterpart of [`EnvOut`].
///
/// Observation and info values gain a leading axis of size `n_envs`; reward
/// becomes `[n_envs, players]` and done one flag per instance.
#[derive(Debug, Clone)]
pub struct VecOut {
    /// Stacked observation channels.
    pub obs: Observation,
    /// Per-instance, per-player reward.
    pub reward: Array2<f32>,
    /// Per-instance done flags.
    pub done: Array1<bool>,
    /// Stacked info entries.
    pub info: Info,
}

/// Batched environment interface produced by the vectorizer.
pub trait VecGymEnv {
    /// Reset instances and return the stacked results.
    ///
    /// When `force` is set every instance resets; otherwise only instances
    /// whose last recorded result signaled completion reset, and the cached
    /// results of the others are returned untouched.
    fn reset(&mut self, force: bool) -> VecOut;

    /// Step every instance with its slice of the batched action.
    fn step(&mut self, action: &Action) -> VecOut;

    /// Seed instance `i` with `base_seed + i`.
    fn seed(&mut self, base_seed: u64);

    /// Close every instance.
    fn close(&mut self);
}

/// Vectorizes a fixed list of independent environment instances.
pub struct VecEnv<E> {
    envs: Vec<E>,
    last_outs: Vec<Option<EnvOut>>,
}

impl<E: GymEnv> VecEnv<E> {
    /// Build a vectorizer over the given instances.
    pub fn new(envs: Vec<E>) -> Result<Self> {
        if envs.is_empty() {
            return Err(EnvError::InvalidConfig {
                param: "envs",
                message: "vectorizer needs at least one instance".into(),
            });
        }
        let n = envs.len();
        Ok(Self {
            envs,
            last_outs: vec![None; n],
        })
    }

    /// Number of instances.
    pub fn n_envs(&self) -> usize {
        self.envs.len()
    }

    /// Read-only access to the instances.
    pub fn envs(&self) -> &[E] {
        &self.envs
    }

    /// Extract instance `idx`'s slice of a batched action.
    fn slice_action(action: &Action, idx: usize) -> Action {
        action
            .iter()
            .map(|(key, val)| (key.clone(), val.index_axis(Axis(0), idx).to_owned()))
            .collect()
    }

    /// Stack cached per-instance results along a new leading axis.
    fn stack_outs(outs: &[&EnvOut]) -> VecOut {
        let first = outs[0];
        let obs_keys: BTreeSet<&String> = first.obs.keys().collect();
        let info_keys: BTreeSet<&String> = first.info.keys().collect();
        for out in &outs[1..] {
            assert_eq!(
                obs_keys,
                out.obs.keys().collect::<BTreeSet<_>>(),
                "instances produced mismatched observation key sets"
            );
            assert_eq!(
                info_keys,
                out.info.keys().collect::<BTreeSet<_>>(),
                "instances produced mismatched info key sets"
            );
        }

        let stack_maps = |key: &String, pick: fn(&EnvOut) -> &Observation| {
            let views: Vec<_> = outs.iter().map(|out| pick(out)[key].view()).collect();
            ndarray::stack(Axis(0), &views)
                .unwrap_or_else(|_| panic!("channel '{key}' shapes differ across instances"))
        };
        let obs: Observation = obs_keys
            .iter()
            .map(|&key| (key.clone(), stack_maps(key, |out| &out.obs)))
            .collect();
        let info: Info = info_keys
            .iter()
            .map(|&key| (key.clone(), stack_maps(key, |out| &out.info)))
            .collect();

        let reward_views: Vec<_> = outs.iter().map(|out| out.reward.view()).collect();
        let reward = ndarray::stack(Axis(0), &reward_views)
            .unwrap_or_else(|_| panic!("reward lengths differ across instances"));
        let done = Array1::from_iter(outs.iter().map(|out| out.done));

        VecOut {
            obs,
            reward,
            done,
            info,
        }
    }

    fn stacked(&self) -> VecOut {
        let outs: Vec<&EnvOut> = self
            .last_outs
            .iter()
            .map(|slot| {
                slot.as_ref()
                    .expect("every instance has a cached result after reset")
            })
            .collect();
        Self::stack_outs(&outs)
    }
}

impl<E: GymEnv> VecGymEnv for VecEnv<E> {
    fn reset(&mut self, force: bool) -> VecOut {
        if force {
            for (env, slot) in self.envs.iter_mut().zip(self.last_outs.iter_mut()) {
                *slot = Some(env.reset());
            }
        } else {
            let mut refreshed = 0usize;
            for (env, slot) in self.envs.iter_mut().zip(self.last_outs.iter_mut()) {
                // Instances without a cached result have never been reset.
                let completed = slot.as_ref().map_or(true, |out| out.done);
                if completed {
                    *slot = Some(env.reset());
                    refreshed += 1;
                }
            }
            debug!(refreshed, total = self.envs.len(), "selective reset");
        }
        self.stacked()
    }

    fn step(&mut self, action: &Action) -> VecOut {
        let n = self.envs.len();
        assert!(
            self.last_outs.iter().all(Option::is_some),
            "step called before reset"
        );
        for (key, val) in action {
            assert!(
                val.ndim() >= 1 && val.shape()[0] == n,
                "action '{key}' leading dimension must equal instance count {n}"
            );
        }
        for (idx, env) in self.envs.iter_mut().enumerate() {
            let sliced = Self::slice_action(action, idx);
            self.last_outs[idx] = Some(env.step(&sliced));
        }
        self.stacked()
    }

    fn seed(&mut self, base_seed: u64) {
        for (idx, env) in self.envs.iter_mut().enumerate() {
            env.seed(base_seed + idx as u64);
        }
    }

    fn close(&mut self) {
        for env in &mut self.envs {
            env.close();
        }
    }
}
