//! Server middleware
//!
//! Per-source bookkeeping consulted by every connection: the sliding request
//! window, the ban registry and the open-connection counter, plus logging.
//! None of these types lock on their own; `server::state::GuardState` owns
//! all three behind one mutex.

pub mod ban;
pub mod connections;
pub mod logging;
pub mod rate_limit;

pub use ban::BanRegistry;
pub use connections::ConnectionCounter;
pub use rate_limit::RateWindowTracker;
