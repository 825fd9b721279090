//! Board padding stage.
//!
//! Board-game simulations sample a new map size per episode, but training
//! batches need a fixed tensor shape. This stage zero-pads observation
//! arrays on the trailing two spatial axes up to a configured maximum,
//! crops actions back to the native extent before forwarding them, and
//! maintains an `input_mask` info entry marking the valid cells.

use ndarray::{ArrayD, Axis, IxDyn, Slice};

use crate::env::{insert_unique, Action, EnvOut, GameState, GymEnv, Info, ObsSpec, Observation};
use crate::error::{EnvError, Result};

/// Default maximum board extent accommodated by padded tensors.
pub const MAX_BOARD_SIZE: (usize, usize) = (32, 32);

/// Info key under which the valid-cell mask is published.
pub const INPUT_MASK_KEY: &str = "input_mask";

/// Pads observations to a fixed board shape and crops actions back.
///
/// Info entries whose trailing two dimensions equal the native board extent
/// are padded like observations; all other entries pass through unchanged.
/// The mask has shape `(1, max_rows, max_cols)` with 1.0 on the native
/// region and 0.0 elsewhere, recomputed on every reset.
pub struct PadEnv<E> {
    env: E,
    max_board_size: (usize, usize),
    input_mask: ArrayD<f32>,
}

impl<E: GymEnv> PadEnv<E> {
    /// Wrap an environment with the default maximum board size.
    pub fn new(env: E) -> Result<Self> {
        Self::with_max_size(env, MAX_BOARD_SIZE)
    }

    /// Wrap an environment with an explicit maximum board size.
    pub fn with_max_size(env: E, max_board_size: (usize, usize)) -> Result<Self> {
        if max_board_size.0 == 0 || max_board_size.1 == 0 {
            return Err(EnvError::InvalidConfig {
                param: "max_board_size",
                message: "padded board extent must be non-zero".into(),
            });
        }
        let (rows, cols) = env.board_dims();
        if rows > max_board_size.0 || cols > max_board_size.1 {
            return Err(EnvError::BoardTooLarge {
                rows,
                cols,
                max_rows: max_board_size.0,
                max_cols: max_board_size.1,
            });
        }
        let mut wrapper = Self {
            env,
            max_board_size,
            input_mask: ArrayD::zeros(IxDyn(&[1, max_board_size.0, max_board_size.1])),
        };
        wrapper.refresh_mask();
        Ok(wrapper)
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

    /// Current valid-cell mask, shape `(1, max_rows, max_cols)`.
    pub fn input_mask(&self) -> &ArrayD<f32> {
        &self.input_mask
    }

    /// Maximum board extent this wrapper pads to.
    pub fn max_board_size(&self) -> (usize, usize) {
        self.max_board_size
    }

    fn refresh_mask(&mut self) {
        let (rows, cols) = self.env.board_dims();
        self.input_mask.fill(0.0);
        let mut valid = self.input_mask.view_mut();
        valid.slice_axis_inplace(Axis(1), Slice::from(0..rows));
        valid.slice_axis_inplace(Axis(2), Slice::from(0..cols));
        valid.fill(1.0);
    }

    /// Zero-pad the trailing two axes from the native extent to the maximum.
    fn pad(&self, arr: &ArrayD<f32>) -> ArrayD<f32> {
        let ndim = arr.ndim();
        assert!(ndim >= 2, "padded arrays need two trailing spatial axes");
        let (rows, cols) = self.env.board_dims();
        let mut shape = arr.shape().to_vec();
        shape[ndim - 2] = self.max_board_size.0;
        shape[ndim - 1] = self.max_board_size.1;
        let mut out = ArrayD::zeros(IxDyn(&shape));
        let mut native = out.view_mut();
        native.slice_axis_inplace(Axis(ndim - 2), Slice::from(0..rows));
        native.slice_axis_inplace(Axis(ndim - 1), Slice::from(0..cols));
        native.assign(arr);
        out
    }

    /// Crop the trailing two axes back to the native extent.
    fn crop(&self, arr: &ArrayD<f32>) -> ArrayD<f32> {
        let ndim = arr.ndim();
        assert!(ndim >= 2, "cropped arrays need two trailing spatial axes");
        let (rows, cols) = self.env.board_dims();
        let mut native = arr.view();
        native.slice_axis_inplace(Axis(ndim - 2), Slice::from(0..rows));
        native.slice_axis_inplace(Axis(ndim - 1), Slice::from(0..cols));
        native.to_owned()
    }

    fn pad_obs(&self, obs: Observation) -> Observation {
        obs.into_iter()
            .map(|(key, val)| {
                let padded = self.pad(&val);
                (key, padded)
            })
            .collect()
    }

    fn pad_info(&self, info: Info) -> Info {
        let native = self.env.board_dims();
        let mut out: Info = info
            .into_iter()
            .map(|(key, val)| {
                let padded = if spatial_dims(&val) == Some(native) {
                    self.pad(&val)
                } else {
                    val
                };
                (key, padded)
            })
            .collect();
        insert_unique(&mut out, INPUT_MASK_KEY.to_string(), self.input_mask.clone());
        out
    }
}

/// Trailing two dimensions of an array, if it has at least two.
fn spatial_dims(arr: &ArrayD<f32>) -> Option<(usize, usize)> {
    let shape = arr.shape();
    match shape {
        [.., rows, cols] => Some((*rows, *cols)),
        _ => None,
    }
}

impl<E: GymEnv> GymEnv for PadEnv<E> {
    fn reset(&mut self) -> EnvOut {
        let out = self.env.reset();
        let (rows, cols) = self.env.board_dims();
        assert!(
            rows <= self.max_board_size.0 && cols <= self.max_board_size.1,
            "board {rows}x{cols} exceeds padded maximum {}x{}",
            self.max_board_size.0,
            self.max_board_size.1
        );
        self.refresh_mask();
        EnvOut {
            obs: self.pad_obs(out.obs),
            reward: out.reward,
            done: out.done,
            info: self.pad_info(out.info),
        }
    }

    fn step(&mut self, action: &Action) -> EnvOut {
        let cropped: Action = action
            .iter()
            .map(|(key, val)| (key.clone(), self.crop(val)))
            .collect();
        let out = self.env.step(&cropped);
        EnvOut {
            obs: self.pad_obs(out.obs),
            reward: out.reward,
            done: out.done,
            info: self.pad_info(out.info),
        }
    }

    fn board_dims(&self) -> (usize, usize) {
        self.env.board_dims()
    }

    fn game_state(&self) -> &GameState {
        self.env.game_state()
    }

    fn obs_spec(&self, _board_dims: (usize, usize)) -> ObsSpec {
        // The padded env always reports shapes at the maximum extent.
        self.env.obs_spec(self.max_board_size)
    }

    fn seed(&mut self, seed: u64) {
        self.env.seed(seed);
    }

    fn close(&mut self) {
        self.env.close();
    }
}
