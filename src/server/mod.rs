//! Server core functionality
//!
//! The listener, the per-connection handler and the shared guard state
//! they both operate on.

pub mod core;
pub mod handler;
pub mod state;

pub use self::core::{Lifecycle, Server, ServerHandle};
pub use handler::{ConnectionOutcome, handle_connection};
pub use state::{BannedSource, GuardState, StatusSnapshot, SweepReport, Verdict};
