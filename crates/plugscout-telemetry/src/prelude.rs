//! Commonly used types.
//!
//! ```rust,no_run
//! use plugscout_telemetry::prelude::*;
//!
//! # fn main() -> TelemetryResult<()> {
//! setup_logging(&LogConfig::new("info").with_format(LogFormat::Json))?;
//! let _run = RunContext::new("list").enter();
//! tracing::info!("listing plugins");
//! # Ok(())
//! # }
//! ```

pub use crate::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
pub use crate::{RunContext, RunGuard};
pub use crate::{TelemetryError, TelemetryResult};
