//! errmail — project-scoped error reporting with email dispatch.
//!
//! Hosts register named reporting channels ("projects"), then either hand
//! reports to [`Reporting::send`] directly or route their error channel
//! through [`Reporting::listen`] / [`Reporting::raise`]. Reports are formatted
//! as HTML with a pretty-printed JSON stack payload and dispatched through a
//! caller-supplied [`MailTransport`]. Delivery is synchronous, best-effort and
//! fire-and-forget.
//!
//! # Example
//!
//! ```
//! use errmail::mail::LogTransport;
//! use errmail::settings::{MemorySettings, StaticOptions};
//! use errmail::{ErrorReport, ProjectParams, Reporting};
//!
//! let mut settings = MemorySettings::new();
//! settings.enable("checkout");
//! let options = StaticOptions::new("admin@example.org", "Example Site");
//!
//! let mut reporting = Reporting::new(
//!     Box::new(settings),
//!     Box::new(options),
//!     Box::new(LogTransport),
//! );
//! reporting.register(
//!     "checkout",
//!     ProjectParams {
//!         prefix: Some("CO".to_string()),
//!         to: Some("dev@example.org".to_string()),
//!         ..Default::default()
//!     },
//! );
//!
//! let report = ErrorReport::new("Null pointer", "/app/checkout.rs", 42);
//! assert!(reporting.send(&report, "checkout"));
//! ```

pub mod config;
pub mod hooks;
pub mod logging;
pub mod mail;
pub mod registry;
pub mod report;
pub mod settings;

pub use config::{Category, Project, ProjectParams, ReportingConfig};
pub use mail::MailTransport;
pub use registry::{Dispatch, Propagation, Reporting};
pub use report::{ErrorReport, Frame, RaisedError, Severity};
