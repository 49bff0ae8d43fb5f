use config::ConfigError;
use thiserror::Error;

/// Everything that can stop the listener before it starts listening.
/// None of these are retried: the process exits non-zero.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("error loading configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("unable to parse MAC for button '{name}': {mac}")]
    InvalidMac { name: String, mac: String },

    #[error("error opening interface (perhaps you need to run as root?): {0}")]
    Capture(#[from] pcap::Error),

    #[error("unable to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("unable to set filter '{filter}': {source}")]
    Filter {
        filter: String,
        #[source]
        source: pcap::Error,
    },
}
