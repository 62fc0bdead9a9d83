// detector-hub Core Services
// - config_store: config file and resolved settings
// - transport: shared HTTP client
// - detectors: provider backends and the registry
// - fanout: selection resolution and concurrent dispatch
// - aggregator: response envelope and timing

pub mod aggregator;
pub mod config_store;
pub mod detectors;
pub mod fanout;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregator::run_detection;
pub use config_store::{AppConfig, ConfigCommand, ConfigStore, ProviderSettings, Settings};
pub use detectors::{Detector, DetectorRegistry};
pub use fanout::{dispatch, resolve, validate_text, DetectError};
pub use transport::{HttpTransport, TransportError};
