//! Mail transport seam.
//!
//! The host supplies the actual delivery mechanism; this crate only defines
//! the contract. Dispatch is synchronous and best-effort: a transport reports
//! failure by returning `false` and must never panic, since it runs inside
//! whatever call stack raised the error.

use tracing::info;

/// Content type header attached to every report email.
pub const HTML_CONTENT_TYPE: &str = "Content-Type: text/html; charset=UTF-8";

/// Outbound mail facility supplied by the host.
pub trait MailTransport {
    /// Deliver one message. Fire-and-forget: no retries, no timeout handling
    /// beyond what the implementation does itself.
    fn send(&self, to: &str, subject: &str, html_body: &str, content_type: &str) -> bool;
}

/// Transport that writes the mail to the tracing log instead of sending it.
///
/// Useful as a development stand-in while the real transport is not wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

impl MailTransport for LogTransport {
    fn send(&self, to: &str, subject: &str, _html_body: &str, _content_type: &str) -> bool {
        info!(to, subject, "mail transport stubbed, report logged only");
        true
    }
}

/// Syntactic address check: exactly one `@`, a non-empty local part, a dotted
/// domain with non-empty labels, and no whitespace anywhere.
///
/// This is deliberately not RFC 5322; it only has to catch obvious garbage
/// before the admin fallback kicks in.
pub fn is_valid_email(address: &str) -> bool {
    if address.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}
