//! Current OS user: name and home directory.

use std::path::PathBuf;

/// Directory under the user's home where dfget keeps its state.
pub const WORK_HOME_DIR: &str = ".small-dragonfly";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub name: String,
    pub home: PathBuf,
}

impl UserIdentity {
    pub fn work_home(&self) -> PathBuf {
        self.home.join(WORK_HOME_DIR)
    }
}

/// Looks up the effective user in the password database.
///
/// Returns `None` when the user has no entry (e.g. an arbitrary uid inside a
/// container).
#[cfg(unix)]
pub fn current_user() -> Option<UserIdentity> {
    use std::ffi::CStr;
    use std::os::unix::ffi::OsStrExt;

    let uid = unsafe { libc::geteuid() };
    let mut buf = vec![0 as libc::c_char; 1024];
    loop {
        let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();
        let r = unsafe {
            libc::getpwuid_r(uid, &mut pwd, buf.as_mut_ptr(), buf.len(), &mut result)
        };
        if r == libc::ERANGE && buf.len() < 1 << 20 {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if r != 0 || result.is_null() || pwd.pw_name.is_null() || pwd.pw_dir.is_null() {
            tracing::debug!(uid, errno = r, "no passwd entry for current user");
            return None;
        }
        let name = unsafe { CStr::from_ptr(pwd.pw_name) }
            .to_string_lossy()
            .into_owned();
        let home = unsafe { CStr::from_ptr(pwd.pw_dir) };
        let home = PathBuf::from(std::ffi::OsStr::from_bytes(home.to_bytes()));
        return Some(UserIdentity { name, home });
    }
}

#[cfg(not(unix))]
pub fn current_user() -> Option<UserIdentity> {
    let name = std::env::var("USERNAME").ok()?;
    let home = std::env::var_os("USERPROFILE")?;
    Some(UserIdentity {
        name,
        home: PathBuf::from(home),
    })
}
