//! Typed extension points applied while a report is assembled.
//!
//! Each point holds an ordered list of transformer functions. Transformers
//! run in registration order and each receives the value produced by the
//! previous one; with none registered the value passes through unchanged.

use serde_json::Value;
use std::fmt;

use crate::config::{Project, ProjectParams};
use crate::report::ErrorReport;

/// Context handed to every transformer: the report being assembled and the
/// project it is addressed to.
pub struct HookContext<'a> {
    pub report: &'a ErrorReport,
    pub project: &'a Project,
}

type Transformer<T> = Box<dyn Fn(T, &HookContext<'_>) -> T + Send + Sync>;

/// Ordered transformer list for one extension point.
pub struct HookChain<T> {
    transformers: Vec<Transformer<T>>,
}

impl<T> HookChain<T> {
    pub fn register<F>(&mut self, transformer: F) -> &mut Self
    where
        F: Fn(T, &HookContext<'_>) -> T + Send + Sync + 'static,
    {
        self.transformers.push(Box::new(transformer));
        self
    }

    /// Run the value through every registered transformer, in order.
    pub fn apply(&self, value: T, context: &HookContext<'_>) -> T {
        self.transformers
            .iter()
            .fold(value, |value, transformer| transformer(value, context))
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }
}

impl<T> Default for HookChain<T> {
    fn default() -> Self {
        Self {
            transformers: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for HookChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain")
            .field("len", &self.transformers.len())
            .finish()
    }
}

type RegisterTransformer = Box<dyn Fn(ProjectParams, &str) -> ProjectParams + Send + Sync>;

/// Transformers applied to registration parameters before a project is
/// finalized and stored. Receives the project name as context.
#[derive(Default)]
pub struct RegisterChain {
    transformers: Vec<RegisterTransformer>,
}

impl RegisterChain {
    pub fn register<F>(&mut self, transformer: F) -> &mut Self
    where
        F: Fn(ProjectParams, &str) -> ProjectParams + Send + Sync + 'static,
    {
        self.transformers.push(Box::new(transformer));
        self
    }

    pub fn apply(&self, params: ProjectParams, project_name: &str) -> ProjectParams {
        self.transformers
            .iter()
            .fold(params, |params, transformer| {
                transformer(params, project_name)
            })
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }
}

impl fmt::Debug for RegisterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterChain")
            .field("len", &self.transformers.len())
            .finish()
    }
}

/// All extension points recognized by the registry.
#[derive(Debug, Default)]
pub struct Hooks {
    /// Observe or rewrite registration parameters before storage
    pub register: RegisterChain,
    /// Override the resolved recipient address
    pub recipient: HookChain<String>,
    /// Rewrite the `[prefix]` part of the subject line
    pub subject_prefix: HookChain<String>,
    /// Rewrite the full subject line
    pub subject: HookChain<String>,
    /// Rewrite the HTML message paragraph
    pub message: HookChain<String>,
    /// Rewrite the full HTML body, JSON payload included
    pub body: HookChain<String>,
    /// Rewrite the error-site stack payload
    pub stack: HookChain<Value>,
}
