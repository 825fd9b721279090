//! # board_gym: environment wrappers for board-game RL training
//!
//! A chain of composable adapter stages between a board-game simulation and
//! a tensor-based training loop. Each stage is a pure data-shape transform;
//! all game logic stays in the wrapped engine.
//!
//! ```text
//! training loop
//!      │  single mapping (obs / reward / done / telemetry keys)
//! ┌────▼─────┐
//! │ DictEnv  │  flatten the four-part result
//! ├──────────┤
//! │ TensorEnv│  host arrays ⇄ device tensors
//! ├──────────┤
//! │ VecEnv   │  N instances, stacked along a new batch axis
//! ├──────────┤
//! │Telemetry │  simulation counts into info        (per instance)
//! ├──────────┤
//! │ PadEnv   │  fixed board shape + valid-cell mask (per instance)
//! └────┬─────┘
//!      │  reset/step
//!   game engine
//! ```
//!
//! The chain is single-threaded and synchronous: every call is a direct,
//! blocking call into the next inner stage, and the vectorizer loops over
//! its instances sequentially. Contract violations (duplicate info keys,
//! mismatched key sets, reserved-key collisions) abort immediately.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use board_gym::{build_stack, StackConfig};
//!
//! let config = StackConfig::new().with_n_envs(16);
//! let mut env = build_stack::<_, B, _>(&config, device, |_| make_game())?;
//! let mut out = env.reset(true);
//! loop {
//!     let action = policy(&out);
//!     out = env.step(&action);
//! }
//! ```

pub mod config;
pub mod env;
pub mod error;
pub mod tensor;
pub mod wrappers;

#[cfg(test)]
pub(crate) mod test_util;

pub use config::{build_stack, EnvStack, StackConfig};
pub use env::{Action, EnvOut, GameState, GymEnv, Info, Observation, ObsSpec, PlayerState};
pub use error::{EnvError, Result};
pub use tensor::DynTensor;
pub use wrappers::dict_env::{DictEnv, StepMap, StepValue, RESERVED_KEYS};
pub use wrappers::pad::{PadEnv, INPUT_MASK_KEY, MAX_BOARD_SIZE};
pub use wrappers::telemetry::{TelemetryEnv, TELEMETRY_PREFIX};
pub use wrappers::tensor_env::{TensorEnv, TensorGymEnv, TensorMap, TensorVecOut};
pub use wrappers::vec_env::{VecEnv, VecGymEnv, VecOut};
