//! Water simulation: finite-difference wave field and the ripple policy

pub mod disturbance;
pub mod waves;

pub use disturbance::RippleScheduler;
pub use waves::WaveField;

/// Simulation errors
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    /// Grid dimensions or integration parameters rejected at construction
    #[error("Invalid wave parameters: {0}")]
    InvalidParameters(String),
}
