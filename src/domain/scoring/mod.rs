//! Scoring Module - Pure domain services over taste identities.
//!
//! # Components
//!
//! - `Evaluator` - alignment, confidence, tension, regret risk and reasons
//! - `ReinforcementUpdater` - closed-form per-event update of an identity
//! - `AxisMapping` - projection onto presentation axes and one-line readings
//! - `EvaluatorTuning` / `ReinforcementTuning` - the tunable constants
//!
//! # Design Philosophy
//!
//! Nothing here performs I/O or holds state between calls. Inputs are
//! borrowed snapshots and outputs are new values, so every service can be
//! shared freely across tasks.

mod axis_mapping;
mod evaluator;
mod reinforcement;
mod tuning;

pub use axis_mapping::{AxisMapping, PresentationAxis, READING_NOISE_FLOOR};
pub use evaluator::{Evaluator, NORM_EPSILON};
pub use reinforcement::ReinforcementUpdater;
pub use tuning::{EvaluatorTuning, ReinforcementTuning};
