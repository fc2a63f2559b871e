//! Run context: assembly and startup validation.
//!
//! [`RunContext::new`] fills identity and timing fields; the caller then sets
//! the user-supplied fields and calls [`assert_context`] once before sharing
//! the context with the rest of the client.

mod error;
mod identity;
mod output;
mod sign;
mod source_url;

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::logging::LogHandle;

pub use error::{ContextError, OutputProblem};
pub use identity::{current_user, UserIdentity, WORK_HOME_DIR};
pub use output::{file_name_from_url, resolve_output};
pub use sign::generate_sign;
pub use source_url::check_url;

/// Download pattern used when neither the command line nor the config sets one.
pub const DEFAULT_PATTERN: &str = "p2p";

/// Everything one dfget invocation needs to start a download.
///
/// Serialized field order is part of the diagnostic format written to the
/// client log; logger handles are not serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunContext {
    pub url: String,
    pub output: String,
    /// Download rate cap in bytes per second (0 = unlimited).
    pub local_limit: u64,
    pub pattern: String,
    pub version: bool,
    /// Machine-wide rate cap in bytes per second (0 = unlimited).
    pub total_limit: u64,
    /// Download timeout in seconds (0 = derived from file size later).
    pub timeout: u64,
    pub md5: String,
    pub identifier: String,
    pub call_system: String,
    /// Extra request headers, each `key:value`.
    pub header: Vec<String>,
    /// Supernode addresses.
    pub node: Vec<String>,
    /// Disable falling back to the source when no supernode is reachable.
    pub notbs: bool,
    pub show_bar: bool,
    pub console: bool,
    pub verbose: bool,

    pub start_time: DateTime<Local>,
    pub sign: String,
    pub user: String,
    pub work_home: PathBuf,

    #[serde(skip)]
    pub client_logger: Option<LogHandle>,
    #[serde(skip)]
    pub server_logger: Option<LogHandle>,
}

impl RunContext {
    /// Fresh context stamped with the current time, process sign and OS user.
    pub fn new() -> Self {
        let start_time = Local::now();
        let sign = generate_sign(std::process::id(), start_time.into());
        let (user, work_home) = match current_user() {
            Some(id) => {
                let work_home = id.work_home();
                (id.name, work_home)
            }
            None => (String::new(), PathBuf::new()),
        };

        RunContext {
            url: String::new(),
            output: String::new(),
            local_limit: 0,
            pattern: DEFAULT_PATTERN.to_string(),
            version: false,
            total_limit: 0,
            timeout: 0,
            md5: String::new(),
            identifier: String::new(),
            call_system: String::new(),
            header: Vec::new(),
            node: Vec::new(),
            notbs: false,
            show_bar: false,
            console: false,
            verbose: false,
            start_time,
            sign,
            user,
            work_home,
            client_logger: None,
            server_logger: None,
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(e) => write!(f, "{{\"error\":\"{}\"}}", e),
        }
    }
}

/// Checks the context's URL; see [`check_url`].
pub fn check_context_url(ctx: &RunContext) -> Result<(), ContextError> {
    check_url(&ctx.url)
}

/// Resolves `ctx.output` against the current directory and stores the
/// absolute result back into the context.
pub fn check_output(ctx: &mut RunContext) -> Result<(), ContextError> {
    let cwd = std::env::current_dir().map_err(|e| {
        ContextError::output(ctx.output.as_str(), OutputProblem::CurrentDir(e))
    })?;
    let resolved = resolve_output(&ctx.url, &ctx.output, &cwd, &ctx.user)?;
    ctx.output = resolved.to_string_lossy().into_owned();
    Ok(())
}

/// Validates `ctx` in fixed order and stops at the first failure:
/// client logger, server logger, URL, output.
///
/// On success `ctx.output` holds an absolute path.
pub fn assert_context(ctx: &mut RunContext) -> Result<(), ContextError> {
    if ctx.client_logger.is_none() {
        return Err(ContextError::MissingCollaborator("client log"));
    }
    if ctx.server_logger.is_none() {
        return Err(ContextError::MissingCollaborator("server log"));
    }
    check_context_url(ctx)?;
    check_output(ctx)?;
    tracing::debug!(url = %ctx.url, output = %ctx.output, sign = %ctx.sign, "context validated");
    Ok(())
}
