//! Logging setup and run correlation for plugscout.
//!
//! ```rust,no_run
//! use plugscout_telemetry::{LogConfig, LogFormat, RunContext, setup_logging};
//!
//! # fn main() -> Result<(), plugscout_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Pretty)
//!     .with_directive("plugscout_plugins=trace");
//! setup_logging(&config)?;
//!
//! let run = RunContext::new("deps").enter();
//! let _entered = run.span().enter();
//! tracing::info!("fetching dependencies");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod context;
mod error;
mod logging;

pub use context::{RunContext, RunGuard};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
