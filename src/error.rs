//! Error types for the simulation core.
//!
//! The library exposes a small `thiserror` enum of fatal conditions;
//! the binary driver layers `anyhow` context on top of that for its own
//! I/O concerns.

use thiserror::Error;

/// Fatal conditions that can occur while advancing the simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// A particle came out of density evaluation with ρ = 0, i.e. it had
    /// no neighbor (including itself) within its kernel support. This
    /// can only happen if the tree or kernel table is miscomputed.
    #[error("degenerate density (rho == 0) for particle {index}")]
    DegenerateDensity { index: usize },

    /// The particle store was empty; there is nothing to simulate.
    #[error("particle store is empty")]
    EmptyParticleStore,
}
