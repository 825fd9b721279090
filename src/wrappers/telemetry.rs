//! Telemetry collection stage.
//!
//! Reads per-player counts from the inner simulation's state view on every
//! reset and step, and injects them into the info mapping under prefixed
//! keys. This is a tight-coupling adapter: it requires the wrapped
//! environment to expose [`crate::GameState`] and aborts if the player
//! count drifts mid-episode.

use ndarray::Array1;

use crate::env::{insert_unique, Action, EnvOut, GameState, GymEnv, Info, ObsSpec, PlayerState};

/// Prefix applied to every key the telemetry stage writes.
pub const TELEMETRY_PREFIX: &str = "telemetry_";

/// Floor value the peak counter resets to at episode start.
const PEAK_FLOOR: f32 = 1.0;

/// Injects simulation statistics into the info mapping.
///
/// Published keys (all prefixed with `telemetry_`): `step`, `city_tiles`,
/// `separate_cities`, `workers`, `carts`, `research_points`, and
/// `peak_city_tiles`. The peak counter is a running per-player maximum over
/// the episode, reset to 1.0 on episode reset.
pub struct TelemetryEnv<E> {
    env: E,
    peak_city_tiles: Array1<f32>,
}

impl<E: GymEnv> TelemetryEnv<E> {
    /// Wrap an environment exposing a simulation state view.
    pub fn new(env: E) -> Self {
        let players = env.game_state().players.len();
        Self {
            env,
            peak_city_tiles: Array1::from_elem(players, PEAK_FLOOR),
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

    /// Consume the wrapper and return the wrapped environment.
    pub fn into_inner(self) -> E {
        self.env
    }

    fn per_player(state: &GameState, count: impl Fn(&PlayerState) -> f32) -> Array1<f32> {
        state.players.iter().map(count).collect()
    }

    fn collect(&mut self, mut info: Info) -> Info {
        let state = self.env.game_state();
        assert_eq!(
            state.players.len(),
            self.peak_city_tiles.len(),
            "player count changed mid-episode"
        );

        let city_tiles = Self::per_player(state, |p| p.city_tiles as f32);
        self.peak_city_tiles
            .zip_mut_with(&city_tiles, |peak, &current| *peak = peak.max(current));

        let entries = [
            ("step", Array1::from_elem(1, state.turn as f32)),
            ("city_tiles", city_tiles),
            (
                "separate_cities",
                Self::per_player(state, |p| p.cities as f32),
            ),
            ("workers", Self::per_player(state, |p| p.workers as f32)),
            ("carts", Self::per_player(state, |p| p.carts as f32)),
            (
                "research_points",
                Self::per_player(state, |p| p.research_points as f32),
            ),
            ("peak_city_tiles", self.peak_city_tiles.clone()),
        ];
        for (name, values) in entries {
            insert_unique(&mut info, format!("{TELEMETRY_PREFIX}{name}"), values.into_dyn());
        }
        info
    }
}

impl<E: GymEnv> GymEnv for TelemetryEnv<E> {
    fn reset(&mut self) -> EnvOut {
        let out = self.env.reset();
        let players = self.env.game_state().players.len();
        self.peak_city_tiles = Array1::from_elem(players, PEAK_FLOOR);
        EnvOut {
            obs: out.obs,
            reward: out.reward,
            done: out.done,
            info: self.collect(out.info),
        }
    }

    fn step(&mut self, action: &Action) -> EnvOut {
        let out = self.env.step(action);
        EnvOut {
            obs: out.obs,
            reward: out.reward,
            done: out.done,
            info: self.collect(out.info),
        }
    }

    fn board_dims(&self) -> (usize, usize) {
        self.env.board_dims()
    }

    fn game_state(&self) -> &GameState {
        self.env.game_state()
    }

    fn obs_spec(&self, board_dims: (usize, usize)) -> ObsSpec {
        self.env.obs_spec(board_dims)
    }

    fn seed(&mut self, seed: u64) {
        self.env.seed(seed);
    }

    fn close(&mut self) {
        self.env.close();
    }
}
