//! Destination path resolution.
//!
//! Turns an empty or relative output into one absolute path and rejects
//! targets that are directories or that the current user cannot write.

use std::io;
use std::path::{Component, Path, PathBuf};

use super::error::{ContextError, OutputProblem};

/// Derives the default file name from `url`: the text after the last `/`
/// once query, fragment and trailing slashes are dropped.
///
/// For a bare host (`http://www.taobao.com`) this is the host itself.
/// Returns `None` when `url` has no `scheme://` prefix or nothing usable
/// remains.
pub fn file_name_from_url(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("://")?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let rest = rest.trim_end_matches('/');
    let name = rest.rsplit('/').next().unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

/// Resolves `output` (or a name derived from `url` when `output` is empty)
/// against `cwd` and checks it is a writable, non-directory target.
///
/// Missing intermediate directories are fine; the caller creates them later.
pub fn resolve_output(
    url: &str,
    output: &str,
    cwd: &Path,
    user: &str,
) -> Result<PathBuf, ContextError> {
    let requested = if output.is_empty() {
        file_name_from_url(url).ok_or_else(|| {
            ContextError::output(
                cwd,
                OutputProblem::NoFileName {
                    url: url.to_string(),
                },
            )
        })?
    } else {
        output.to_string()
    };

    let path = absolutize(Path::new(&requested), cwd);

    if path.is_dir() {
        return Err(ContextError::output(path, OutputProblem::IsDirectory));
    }

    check_writable(&path, user)?;
    Ok(path)
}

/// Joins `path` onto `cwd` if relative and removes `.`/`..` lexically.
fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// The nearest existing entry on the way up from `path` decides writability.
fn check_writable(path: &Path, user: &str) -> Result<(), ContextError> {
    for candidate in path.ancestors() {
        if candidate.as_os_str().is_empty() {
            break;
        }
        match writable(candidate) {
            Ok(()) => return Ok(()),
            Err(e) if is_denied(&e) => {
                tracing::debug!(path = %candidate.display(), error = %e, "output not writable");
                return Err(ContextError::output(
                    path,
                    OutputProblem::NotWritable {
                        user: user.to_string(),
                        source: e,
                    },
                ));
            }
            Err(_) => continue,
        }
    }
    Ok(())
}

fn is_denied(e: &io::Error) -> bool {
    #[cfg(unix)]
    {
        if let Some(code) = e.raw_os_error() {
            return code == libc::EACCES || code == libc::EPERM || code == libc::EROFS;
        }
    }
    e.kind() == io::ErrorKind::PermissionDenied
}

#[cfg(unix)]
fn writable(path: &Path) -> io::Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let r = unsafe {
        libc::faccessat(libc::AT_FDCWD, c_path.as_ptr(), libc::W_OK, libc::AT_EACCESS)
    };
    if r == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn writable(path: &Path) -> io::Result<()> {
    let meta = std::fs::metadata(path)?;
    if meta.permissions().readonly() {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "read-only",
        ))
    } else {
        Ok(())
    }
}
