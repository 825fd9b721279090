//! Deterministic mock game engine for wrapper tests.

use ndarray::{Array1, ArrayD, IxDyn};

use crate::env::{Action, EnvOut, GameState, GymEnv, Info, ObsSpec, Observation, PlayerState};

/// Two-player board simulation stub with a fixed horizon.
///
/// Observation values are a deterministic function of the fill offset, turn
/// counter, and cell index, so tests can tell instances and turns apart.
/// Player counts grow with the turn so telemetry has something to track.
pub struct MockGame {
    board: (usize, usize),
    horizon: u32,
    fill_offset: f32,
    obs_channel: &'static str,
    extra_info: Vec<(String, ArrayD<f32>)>,
    state: GameState,
    last_action: Option<Action>,
    seed: Option<u64>,
    pub closed: bool,
}

impl MockGame {
    /// Observation channel count.
    pub const CHANNELS: usize = 2;
    /// Player count.
    pub const PLAYERS: usize = 2;

    pub fn new(board: (usize, usize), horizon: u32) -> Self {
        Self {
            board,
            horizon,
            fill_offset: 0.0,
            obs_channel: "board",
            extra_info: Vec::new(),
            state: GameState {
                turn: 0,
                players: vec![PlayerState::default(); Self::PLAYERS],
            },
            last_action: None,
            seed: None,
            closed: false,
        }
    }

    /// Offset every observation value, to distinguish instances.
    pub fn with_fill_offset(mut self, offset: f32) -> Self {
        self.fill_offset = offset;
        self
    }

    /// Rename the observation channel, to provoke key-set mismatches.
    pub fn with_obs_channel(mut self, name: &'static str) -> Self {
        self.obs_channel = name;
        self
    }

    /// Emit an extra info entry on every reset/step.
    pub fn put_extra_info(&mut self, key: &str, value: ArrayD<f32>) {
        self.extra_info.push((key.to_string(), value));
    }

    /// Last action forwarded into the engine.
    pub fn last_action(&self) -> Option<&Action> {
        self.last_action.as_ref()
    }

    /// Last seed applied, if any.
    pub fn seed_value(&self) -> Option<u64> {
        self.seed
    }

    fn refresh_state(&mut self) {
        let turn = self.state.turn;
        for (idx, player) in self.state.players.iter_mut().enumerate() {
            player.city_tiles = turn + 1 + idx as u32;
            player.cities = turn / 2 + 1;
            player.workers = turn + 2;
            player.carts = turn / 3;
            player.research_points = turn * 10;
        }
    }

    fn out(&self) -> EnvOut {
        let (rows, cols) = self.board;
        let turn = self.state.turn as f32;
        let offset = self.fill_offset;
        let obs_values = ArrayD::from_shape_fn(
            IxDyn(&[Self::CHANNELS, rows, cols]),
            |idx| offset + turn + (idx[0] * rows * cols + idx[1] * cols + idx[2]) as f32 * 0.01,
        );
        let mut obs = Observation::new();
        obs.insert(self.obs_channel.to_string(), obs_values);

        let mut info = Info::new();
        info.insert(
            "score".to_string(),
            Array1::from_vec(vec![turn, turn + offset]).into_dyn(),
        );
        for (key, value) in &self.extra_info {
            info.insert(key.clone(), value.clone());
        }

        EnvOut {
            obs,
            reward: Array1::from_vec(vec![turn, -turn]),
            done: self.state.turn >= self.horizon,
            info,
        }
    }
}

impl GymEnv for MockGame {
    fn reset(&mut self) -> EnvOut {
        self.state.turn = 0;
        self.refresh_state();
        self.out()
    }

    fn step(&mut self, action: &Action) -> EnvOut {
        self.last_action = Some(action.clone());
        self.state.turn += 1;
        self.refresh_state();
        self.out()
    }

    fn board_dims(&self) -> (usize, usize) {
        self.board
    }

    fn game_state(&self) -> &GameState {
        &self.state
    }

    fn obs_spec(&self, board_dims: (usize, usize)) -> ObsSpec {
        let mut spec = ObsSpec::new();
        spec.insert(
            self.obs_channel.to_string(),
            vec![Self::CHANNELS, board_dims.0, board_dims.1],
        );
        spec
    }

    fn seed(&mut self, seed: u64) {
        self.seed = Some(seed);
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
