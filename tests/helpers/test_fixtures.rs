use std::io;
use std::sync::{Arc, Mutex};

use errmail::mail::MailTransport;
use errmail::settings::{MemorySettings, StaticOptions};
use errmail::{Reporting, ReportingConfig};

pub const ADMIN_EMAIL: &str = "admin@example.org";
pub const SITE_NAME: &str = "Example Site";

#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub content_type: String,
}

/// Mail transport that records every send instead of delivering.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<SentMail>>>,
    fail: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that records the mail but reports delivery failure.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl MailTransport for RecordingTransport {
    fn send(&self, to: &str, subject: &str, html_body: &str, content_type: &str) -> bool {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
            content_type: content_type.to_string(),
        });
        !self.fail
    }
}

/// Shared buffer usable as a tracing writer, for asserting on emitted log
/// lines.
#[derive(Clone, Default)]
pub struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CaptureWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Build a registry wired to a recording transport, with the given projects
/// enabled in the settings store.
pub fn reporting_with(enabled_projects: &[&str]) -> (RecordingTransport, Reporting) {
    reporting_with_transport(RecordingTransport::new(), enabled_projects)
}

pub fn reporting_with_transport(
    transport: RecordingTransport,
    enabled_projects: &[&str],
) -> (RecordingTransport, Reporting) {
    let mut settings = MemorySettings::new();
    for name in enabled_projects {
        settings.enable(name);
    }

    let reporting = Reporting::with_config(
        Box::new(settings),
        Box::new(StaticOptions::new(ADMIN_EMAIL, SITE_NAME)),
        Box::new(transport.clone()),
        ReportingConfig {
            debug_log: true,
            ..Default::default()
        },
    );

    (transport, reporting)
}
