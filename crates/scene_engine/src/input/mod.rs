//! Input-driven interaction: mouse-ray picking

pub mod picking;

pub use picking::{PickHit, PickResult, Picker};
