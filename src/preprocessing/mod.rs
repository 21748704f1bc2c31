//! Data preprocessing module
//!
//! Feature scaling applied ahead of the linear model. The scaler is fitted
//! offline and loaded as an artifact; at serving time it is only applied.

mod scaler;

pub use scaler::{Scaler, ScalerParams, ScalerType};
