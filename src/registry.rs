//! The reporting registry: named channels, report dispatch, error listening.

use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, error, info};

use crate::config::{resolve_recipient, Category, Project, ProjectParams, ReportingConfig};
use crate::hooks::{HookContext, Hooks};
use crate::mail::{MailTransport, HTML_CONTENT_TYPE};
use crate::report::{capture_frames, ErrorReport, RaisedError, Severity, TRACE_LIMIT};
use crate::settings::{HostOptions, SettingsStore};

/// Frames added by the registry's own dispatch path, skipped from captured
/// traces by count rather than by symbol matching.
const OWN_FRAMES: usize = 2;

/// Outcome of [`Reporting::dispatch`].
///
/// [`Reporting::send`] collapses everything except `Sent` to `false`,
/// preserving the original boolean contract; callers that need to tell the
/// failure modes apart use `dispatch` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The transport accepted the message
    Sent,
    /// No project registered under that name
    UnknownProject,
    /// The report's file path did not match the project's `only_in_dir` filter
    PathFiltered,
    /// The project is disabled in the settings store
    Disabled,
    /// The transport reported failure
    TransportFailed,
}

impl Dispatch {
    pub fn is_sent(self) -> bool {
        matches!(self, Dispatch::Sent)
    }
}

/// Signal returned to the host's error channel by [`Reporting::raise`].
///
/// The registry never asks the host to swallow an error; default handling
/// always continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "Hand this back to the host error channel"]
pub enum Propagation {
    Continue,
}

/// An installed error handler. The project is bound when the handler is
/// installed, not when it fires.
#[derive(Debug, Clone)]
struct Handler {
    project: String,
    level: Severity,
}

/// Registry of error-reporting channels.
///
/// Owns the project map, the installed-handler stack and the injected host
/// collaborators. Constructed explicitly by the embedder and passed wherever
/// reporting is needed; there is no global instance.
pub struct Reporting {
    projects: HashMap<String, Project>,
    current_project: Option<String>,
    handlers: Vec<Handler>,
    settings: Box<dyn SettingsStore>,
    options: Box<dyn HostOptions>,
    transport: Box<dyn MailTransport>,
    hooks: Hooks,
    config: ReportingConfig,
}

impl Reporting {
    pub fn new(
        settings: Box<dyn SettingsStore>,
        options: Box<dyn HostOptions>,
        transport: Box<dyn MailTransport>,
    ) -> Self {
        Self::with_config(settings, options, transport, ReportingConfig::default())
    }

    pub fn with_config(
        settings: Box<dyn SettingsStore>,
        options: Box<dyn HostOptions>,
        transport: Box<dyn MailTransport>,
        config: ReportingConfig,
    ) -> Self {
        Self {
            projects: HashMap::new(),
            current_project: None,
            handlers: Vec::new(),
            settings,
            options,
            transport,
            hooks: Hooks::default(),
            config,
        }
    }

    /// Extension points, for embedders that register transformers.
    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    /// Register a project under `project_name`, replacing any prior
    /// registration with the same name.
    ///
    /// Registration hooks run first, then the category is normalized, the
    /// recipient resolved (base64 decoding, validation, admin fallback) and
    /// the enabled flag read from the settings store. Chainable.
    pub fn register(&mut self, project_name: &str, params: ProjectParams) -> &mut Self {
        let params = self.hooks.register.apply(params, project_name);

        let category = Category::normalize(&params.category);
        let to = resolve_recipient(params.to.as_deref(), &self.options.admin_email());
        let enabled = self.settings.get(project_name);

        let project = Project {
            name: project_name.to_string(),
            label: params.label.unwrap_or_else(|| project_name.to_string()),
            description: params.description,
            to,
            prefix: params.prefix.unwrap_or_else(|| project_name.to_string()),
            category,
            only_in_dir: params.only_in_dir,
            default_enabled: params.default_enabled,
            trace_in_logs: params.trace_in_logs,
            enabled,
        };

        info!(
            project = project_name,
            category = %project.category,
            enabled,
            "Registered reporting project"
        );
        self.projects.insert(project_name.to_string(), project);
        self
    }

    /// The fixed category set.
    pub fn categories(&self) -> &'static [Category] {
        &Category::ALL
    }

    /// All registered projects, keyed by name.
    pub fn projects(&self) -> &HashMap<String, Project> {
        &self.projects
    }

    /// Look up one project. No side effects.
    pub fn project(&self, project_name: &str) -> Option<&Project> {
        self.projects.get(project_name)
    }

    /// Name of the project most recently made active for listening.
    pub fn current_project(&self) -> Option<&str> {
        self.current_project.as_deref()
    }

    pub fn set_current_project(&mut self, project_name: &str) -> &mut Self {
        self.current_project = Some(project_name.to_string());
        self
    }

    /// Send a report to the named project's channel.
    ///
    /// Boolean contract: `true` only when the transport accepted the message.
    /// Never panics and never raises into the caller.
    pub fn send(&self, report: &ErrorReport, project_name: &str) -> bool {
        self.dispatch(report, project_name).is_sent()
    }

    /// Like [`Reporting::send`], but the outcome distinguishes why nothing
    /// was sent.
    ///
    /// Pipeline order is part of the contract: the path filter runs before
    /// anything else, and the diagnostic log line is written BEFORE the
    /// enabled check, so a disabled project still leaves an audit trail when
    /// `debug_log` is on.
    pub fn dispatch(&self, report: &ErrorReport, project_name: &str) -> Dispatch {
        let Some(project) = self.projects.get(project_name) else {
            error!(
                project = project_name,
                "Report for unregistered project dropped"
            );
            return Dispatch::UnknownProject;
        };

        if let Some(dir) = &project.only_in_dir {
            if !report.file.contains(dir.as_str()) {
                return Dispatch::PathFiltered;
            }
        }

        let context = HookContext { report, project };

        let to = self.hooks.recipient.apply(project.to.clone(), &context);

        let prefix = self
            .hooks
            .subject_prefix
            .apply(format!("[{}]", project.prefix), &context);
        let subject = self
            .hooks
            .subject
            .apply(format!("{} {}", prefix, report.message), &context);

        let stack = self.hooks.stack.apply(
            serde_json::to_value(&report.stack).unwrap_or(Value::Null),
            &context,
        );
        let trace: Vec<_> = capture_frames(OWN_FRAMES)
            .into_iter()
            .take(TRACE_LIMIT)
            .collect();
        let payload = json!({ "stack": stack, "trace": trace });
        let payload_pretty =
            serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());

        let message = self.hooks.message.apply(
            format!(
                "<h1>Error in {}</h1>\n<p><code>{}</code> in <em>{}</em> at line <strong>{}</strong>.</p>",
                self.options.site_name(),
                report.message,
                report.file,
                report.line
            ),
            &context,
        );
        let body = self.hooks.body.apply(
            format!("{}\n\n<pre>```\n{}\n```</pre>", message, payload_pretty),
            &context,
        );

        if self.config.debug_log {
            if project.trace_in_logs {
                debug!(
                    subject = %subject,
                    location = %report.location(),
                    stack = %stack,
                    "Error report"
                );
            } else {
                debug!(subject = %subject, location = %report.location(), "Error report");
            }
        }

        if !project.enabled {
            return Dispatch::Disabled;
        }

        if self.transport.send(&to, &subject, &body, HTML_CONTENT_TYPE) {
            Dispatch::Sent
        } else {
            Dispatch::TransportFailed
        }
    }

    /// Route subsequently raised errors at or above `level` to
    /// `project_name`.
    ///
    /// The project is bound at install time; changing the current project
    /// afterwards does not redirect an installed handler. Handlers stack:
    /// the most recent installation wins until [`Reporting::stop`] removes it.
    pub fn listen(&mut self, project_name: &str, level: Severity) -> &mut Self {
        self.set_current_project(project_name);
        self.handlers.push(Handler {
            project: project_name.to_string(),
            level,
        });
        debug!(project = project_name, level = %level, "Error handler installed");
        self
    }

    /// Remove the most recently installed handler, restoring the previous one.
    pub fn stop(&mut self) -> &mut Self {
        if let Some(handler) = self.handlers.pop() {
            debug!(project = %handler.project, "Error handler removed");
        }
        self
    }

    /// Entry point for the host's error channel.
    ///
    /// Suppressed errors, errors below the active handler's severity
    /// threshold, and errors raised with no handler installed are ignored.
    /// Default host handling always continues either way.
    pub fn raise(&self, raised: RaisedError) -> Propagation {
        if raised.suppressed {
            return Propagation::Continue;
        }

        let Some(handler) = self.handlers.last() else {
            return Propagation::Continue;
        };

        if raised.severity < handler.level {
            return Propagation::Continue;
        }

        // One extra caller frame: this method
        let report = ErrorReport::capture(raised.message, raised.file, raised.line, 1)
            .with_severity(raised.severity);
        let _ = self.dispatch(&report, &handler.project);

        Propagation::Continue
    }

    /// Crate version. Fixed at compile time, cannot fail at runtime.
    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

impl std::fmt::Debug for Reporting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporting")
            .field("projects", &self.projects.len())
            .field("current_project", &self.current_project)
            .field("handlers", &self.handlers)
            .finish()
    }
}
