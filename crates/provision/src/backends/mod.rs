//! Concrete seed sources and service launchers.

pub mod compose;
pub mod http;
#[cfg(test)]
pub mod mock;

pub use compose::ComposeLauncher;
pub use http::HttpSeedSource;
#[cfg(test)]
pub use mock::{MockFailure, MockSeedSource, RecordingLauncher};
