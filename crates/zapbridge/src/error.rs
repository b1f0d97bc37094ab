//! Daemon error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use openwebif_config::ConfigError;

#[derive(Debug, Error, Diagnostic)]
pub enum BridgeError {
    #[error("could not load configuration")]
    #[diagnostic(
        code(zapbridge::config),
        help("Check the config file syntax; see config.example.toml for the expected shape.")
    )]
    Config(#[from] ConfigError),

    #[error("no usable devices configured")]
    #[diagnostic(
        code(zapbridge::no_devices),
        help(
            "Add at least one [[devices]] entry with a name and host, or fix the\n\
             devices that were skipped (see the warnings above)."
        )
    )]
    NoDevices,

    #[error("I/O error")]
    #[diagnostic(code(zapbridge::io))]
    Io(#[from] std::io::Error),
}
