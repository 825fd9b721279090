//! Stack assembly configuration.
//!
//! A single configuration type plus a builder for the canonical wrapper
//! chain. Training binaries deserialize [`StackConfig`] from their run
//! config and call [`build_stack`] with a base-environment factory.

use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::env::GymEnv;
use crate::error::{EnvError, Result};
use crate::wrappers::dict_env::DictEnv;
use crate::wrappers::pad::{PadEnv, MAX_BOARD_SIZE};
use crate::wrappers::telemetry::TelemetryEnv;
use crate::wrappers::tensor_env::TensorEnv;
use crate::wrappers::vec_env::VecEnv;

/// Configuration for the canonical wrapper chain.
///
/// # Example
///
/// ```ignore
/// let config = StackConfig::new()
///     .with_n_envs(16)
///     .with_max_board_size((24, 24));
/// let env = build_stack::<_, B, _>(&config, device, |_| make_game())?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackConfig {
    /// Number of vectorized instances.
    pub n_envs: usize,
    /// Maximum board extent observations are padded to.
    pub max_board_size: (usize, usize),
}

impl StackConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of vectorized instances.
    pub fn with_n_envs(mut self, n_envs: usize) -> Self {
        self.n_envs = n_envs;
        self
    }

    /// Set the maximum board extent.
    pub fn with_max_board_size(mut self, max_board_size: (usize, usize)) -> Self {
        self.max_board_size = max_board_size;
        self
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            n_envs: 8,
            max_board_size: MAX_BOARD_SIZE,
        }
    }
}

/// The canonical wrapper chain over a base environment type.
pub type EnvStack<E, B> = DictEnv<TensorEnv<VecEnv<TelemetryEnv<PadEnv<E>>>, B>, B>;

/// Assemble the canonical wrapper chain.
///
/// `factory` is called once per instance index to produce independent base
/// environments.
pub fn build_stack<E, B, F>(
    config: &StackConfig,
    device: B::Device,
    mut factory: F,
) -> Result<EnvStack<E, B>>
where
    E: GymEnv,
    B: Backend,
    F: FnMut(usize) -> E,
{
    if config.n_envs == 0 {
        return Err(EnvError::InvalidConfig {
            param: "n_envs",
            message: "stack needs at least one instance".into(),
        });
    }
    let mut instances = Vec::with_capacity(config.n_envs);
    for idx in 0..config.n_envs {
        let padded = PadEnv::with_max_size(factory(idx), config.max_board_size)?;
        instances.push(TelemetryEnv::new(padded));
    }
    let vectorized = VecEnv::new(instances)?;
    info!(
        n_envs = vectorized.n_envs(),
        max_rows = config.max_board_size.0,
        max_cols = config.max_board_size.1,
        "assembled environment stack"
    );
    Ok(DictEnv::new(TensorEnv::new(vectorized, device)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::MockGame;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_builder_chain() {
        let config = StackConfig::new()
            .with_n_envs(4)
            .with_max_board_size((16, 16));
        assert_eq!(config.n_envs, 4);
        assert_eq!(config.max_board_size, (16, 16));
    }

    #[test]
    fn test_serde_round_trip() {
        let config = StackConfig::new().with_n_envs(2);
        let json = serde_json::to_string(&config).unwrap();
        let back: StackConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_zero_instances_rejected() {
        let config = StackConfig::new().with_n_envs(0);
        let result = build_stack::<_, TestBackend, _>(&config, Default::default(), |_| {
            MockGame::new((4, 4), 3)
        });
        assert!(matches!(result, Err(EnvError::InvalidConfig { .. })));
    }

    #[test]
    fn test_build_stack_resets() {
        let config = StackConfig::new()
            .with_n_envs(2)
            .with_max_board_size((8, 8));
        let mut env = build_stack::<_, TestBackend, _>(&config, Default::default(), |_| {
            MockGame::new((4, 4), 3)
        })
        .unwrap();
        let map = env.reset(true);
        assert!(map.contains_key("obs"));
        assert!(map.contains_key("input_mask"));
    }
}
