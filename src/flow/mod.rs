//! Flow analysis: causal flow and generalized flow, the structural
//! conditions a ZX-diagram must satisfy to realize a deterministic
//! measurement-based computation.

pub mod boolean_matrix;
pub mod causal;
pub mod gflow;

pub use causal::{calculate_causal_flow, has_causal_flow, CausalFlow};
pub use gflow::{calculate as calculate_gflow, has_gflow, GFlow, MeasurementPlane};
