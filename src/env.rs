//! Core environment interface shared by every wrapper stage.
//!
//! This module provides:
//! - [`GymEnv`] trait for the single-instance reset/step interface
//! - [`EnvOut`] for the (observation, reward, done, info) result tuple
//! - [`GameState`] / [`PlayerState`] as the read-only view of the inner
//!   simulation that the telemetry stage consumes
//!
//! Observations, actions and info are maps from named channels to host
//! `ndarray` arrays. Spatial channels keep the board on the trailing two
//! axes, which is what the padding stage relies on.

use std::collections::HashMap;

use ndarray::{Array1, ArrayD};

/// Named observation channels for one instance.
pub type Observation = HashMap<String, ArrayD<f32>>;

/// Named actuator channels for one instance.
pub type Action = HashMap<String, ArrayD<f32>>;

/// Auxiliary per-step metadata, extended (never overwritten) by wrappers.
pub type Info = HashMap<String, ArrayD<f32>>;

/// Observation spec: named channel to full array shape.
pub type ObsSpec = HashMap<String, Vec<usize>>;

/// Result of a single reset or step.
///
/// `reward` carries one entry per player; `done` flags episode termination.
#[derive(Debug, Clone)]
pub struct EnvOut {
    /// Observation channels after the transition.
    pub obs: Observation,
    /// Per-player reward.
    pub reward: Array1<f32>,
    /// Whether the episode has ended.
    pub done: bool,
    /// Auxiliary metadata.
    pub info: Info,
}

/// Per-player snapshot of the simulation state.
#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    /// Number of city tiles owned.
    pub city_tiles: u32,
    /// Number of separate cities.
    pub cities: u32,
    /// Number of worker units.
    pub workers: u32,
    /// Number of cart units.
    pub carts: u32,
    /// Accumulated research points.
    pub research_points: u32,
}

/// Read-only view of the inner simulation state.
///
/// The telemetry stage is tightly coupled to this view; an environment that
/// cannot provide it cannot sit under [`crate::TelemetryEnv`].
#[derive(Debug, Clone, Default)]
pub struct GameState {
    /// Current turn counter.
    pub turn: u32,
    /// One entry per player.
    pub players: Vec<PlayerState>,
}

/// Single-instance environment interface.
///
/// Each wrapper stage except the vectorizer implements this trait by
/// delegating to its inner environment, transforming results on the way out
/// and actions on the way in.
pub trait GymEnv {
    /// Reset to the start of a new episode and return the initial result.
    fn reset(&mut self) -> EnvOut;

    /// Advance the simulation by one action.
    fn step(&mut self, action: &Action) -> EnvOut;

    /// Native (unpadded) board extent of the current episode.
    fn board_dims(&self) -> (usize, usize);

    /// Read-only view of the underlying simulation state.
    fn game_state(&self) -> &GameState;

    /// Observation spec for the given board extent.
    fn obs_spec(&self, board_dims: (usize, usize)) -> ObsSpec;

    /// Seed the simulation's randomness. Default is a no-op.
    fn seed(&mut self, _seed: u64) {}

    /// Release any resources held by the simulation. Default is a no-op.
    fn close(&mut self) {}
}

/// Insert into an info mapping, aborting on key collision.
///
/// Wrappers extend info in place but must never clobber an existing entry.
pub(crate) fn insert_unique(info: &mut Info, key: String, value: ArrayD<f32>) {
    assert!(
        !info.contains_key(&key),
        "info key '{key}' already present; wrappers must not overwrite entries"
    );
    info.insert(key, value);
}

#[cfg(test)]
mod tests {
    use ndarray::{ArrayD, IxDyn};

    use super::*;

    #[test]
    fn test_insert_unique_adds_key() {
        let mut info = Info::new();
        insert_unique(&mut info, "mask".into(), ArrayD::zeros(IxDyn(&[2, 2])));
        assert!(info.contains_key("mask"));
    }

    #[test]
    #[should_panic(expected = "already present")]
    fn test_insert_unique_rejects_duplicate() {
        let mut info = Info::new();
        info.insert("mask".into(), ArrayD::zeros(IxDyn(&[2, 2])));
        insert_unique(&mut info, "mask".into(), ArrayD::zeros(IxDyn(&[2, 2])));
    }
}
