//! Composable environment wrapper stages.
//!
//! Stages are independent and compose only through wrapping order:
//!
//! ```text
//! DictEnv( TensorEnv( VecEnv( [ TelemetryEnv( PadEnv( base ) ); N ] ) ) )
//! ```
//!
//! - [`pad`] — fixed-shape board padding and action cropping
//! - [`telemetry`] — simulation statistics injected into info
//! - [`vec_env`] — sequential vectorization over N instances
//! - [`tensor_env`] — host array / device tensor bridge
//! - [`dict_env`] — four-tuple to single-mapping flattening

pub mod dict_env;
pub mod pad;
pub mod telemetry;
pub mod tensor_env;
pub mod vec_env;
