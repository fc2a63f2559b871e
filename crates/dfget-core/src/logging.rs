//! Logging: per-role log files under the work home, or stderr fallback.
//!
//! dfget keeps two logs: the client log (`dfclient.log`) for the download
//! itself and the server log (`dfserver.log`) for the peer-serving side. Each
//! is a [`LogHandle`] owning its own `tracing` dispatcher, so both can be open
//! in one process.

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::Dispatch;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Subdirectory of the work home holding log files.
pub const LOG_DIR: &str = "logs";
pub const CLIENT_LOG_FILE: &str = "dfclient.log";
pub const SERVER_LOG_FILE: &str = "dfserver.log";

/// Writer that is either a file or stderr (used when file clone fails).
enum FileOrStderr {
    File(fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct FileMakeWriter(fs::File);

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileOrStderr;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(FileOrStderr::File)
            .unwrap_or(FileOrStderr::Stderr)
    }
}

/// Writes every record to the file and, when console output is on, to stderr.
struct TeeMakeWriter(FileMakeWriter);

struct Tee(FileOrStderr);

impl io::Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.0.write(buf)?;
        let _ = io::stderr().lock().write_all(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<'a> MakeWriter<'a> for TeeMakeWriter {
    type Writer = Tee;

    fn make_writer(&'a self) -> Self::Writer {
        Tee(self.0.make_writer())
    }
}

/// Options shared by both log handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    /// Log at debug level instead of info.
    pub verbose: bool,
    /// Also copy records to stderr.
    pub console: bool,
}

impl LogOptions {
    fn filter(&self) -> EnvFilter {
        let default = if self.verbose {
            "debug"
        } else {
            "info"
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    }
}

/// A logger the run context must carry: a dispatcher plus where it writes.
#[derive(Clone, Debug)]
pub struct LogHandle {
    dispatch: Dispatch,
    path: Option<PathBuf>,
}

impl LogHandle {
    /// Handle writing to `path` (created with its parent directories).
    pub fn file(path: &Path, opts: LogOptions) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create log dir {}", parent.display()))?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file {}", path.display()))?;

        let writer = if opts.console {
            BoxMakeWriter::new(TeeMakeWriter(FileMakeWriter(file)))
        } else {
            BoxMakeWriter::new(FileMakeWriter(file))
        };

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(opts.filter())
            .with_writer(writer)
            .with_ansi(false)
            .finish();

        Ok(LogHandle {
            dispatch: Dispatch::new(subscriber),
            path: Some(path.to_path_buf()),
        })
    }

    /// Handle writing to stderr only. Used when the log file cannot be opened.
    pub fn stderr(opts: LogOptions) -> Self {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(opts.filter())
            .with_writer(io::stderr)
            .with_ansi(false)
            .finish();
        LogHandle {
            dispatch: Dispatch::new(subscriber),
            path: None,
        }
    }

    /// Handle that discards everything.
    pub fn discard() -> Self {
        let subscriber = tracing_subscriber::fmt().with_writer(io::sink).finish();
        LogHandle {
            dispatch: Dispatch::new(subscriber),
            path: None,
        }
    }

    /// Log file path, if this handle writes to a file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Runs `f` with this handle as the default `tracing` dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

fn open_or_stderr(work_home: &Path, file_name: &str, opts: LogOptions) -> LogHandle {
    // Unknown user: no work home to put logs under.
    if work_home.as_os_str().is_empty() {
        return LogHandle::stderr(opts);
    }
    let path = work_home.join(LOG_DIR).join(file_name);
    match LogHandle::file(&path, opts) {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!("falling back to stderr logging: {:#}", e);
            LogHandle::stderr(opts)
        }
    }
}

/// Client log at `<work_home>/logs/dfclient.log`.
pub fn client_log(work_home: &Path, opts: LogOptions) -> LogHandle {
    open_or_stderr(work_home, CLIENT_LOG_FILE, opts)
}

/// Server log at `<work_home>/logs/dfserver.log`. Never tees to the console.
pub fn server_log(work_home: &Path, opts: LogOptions) -> LogHandle {
    let opts = LogOptions {
        console: false,
        ..opts
    };
    open_or_stderr(work_home, SERVER_LOG_FILE, opts)
}

/// Initialize logging to stderr only (no file) for diagnostics emitted before
/// the log handles exist.
pub fn init_logging_stderr() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,dfget=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_and_server_logs_under_work_home() {
        let home = tempfile::tempdir().unwrap();
        let client = client_log(home.path(), LogOptions::default());
        let server = server_log(home.path(), LogOptions::default());
        assert_eq!(
            client.path(),
            Some(home.path().join("logs").join("dfclient.log").as_path())
        );
        assert_eq!(
            server.path(),
            Some(home.path().join("logs").join("dfserver.log").as_path())
        );
    }

    #[test]
    fn file_handle_records_events() {
        let home = tempfile::tempdir().unwrap();
        let path = home.path().join("logs").join("dfclient.log");
        let handle = LogHandle::file(&path, LogOptions::default()).unwrap();
        handle.in_scope(|| tracing::info!("hello from dfget"));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("hello from dfget"), "log was: {content}");
    }

    #[test]
    fn empty_work_home_logs_to_stderr() {
        let handle = server_log(Path::new(""), LogOptions::default());
        assert!(handle.path().is_none());
    }

    #[test]
    fn unopenable_path_falls_back_to_stderr() {
        let home = tempfile::tempdir().unwrap();
        let blocker = home.path().join("logs");
        fs::write(&blocker, b"not a dir").unwrap();
        let handle = client_log(home.path(), LogOptions::default());
        assert!(handle.path().is_none());
    }
}
