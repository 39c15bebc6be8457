//! Runtime kinds and host/solver path translation.
//!
//! Paths are handled as strings because a Windows host path has to be
//! translated even when this crate runs on a POSIX host (and vice versa).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where the solver's shell runs relative to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeKind {
    Posix,
    #[serde(rename = "BashWSL")]
    BashWsl,
    /// The blueCFD-Core MinGW port.
    #[serde(alias = "BlueCFD")]
    VendorWindows,
}

/// Home of the vendor port's user inside its MSYS tree.
pub const VENDOR_HOME: &str = "/home/ofuser";
const VENDOR_ROOT: &str = "/home/ofuser/blueCFD";

impl RuntimeKind {
    pub fn host_default() -> Self {
        if cfg!(windows) {
            Self::VendorWindows
        } else {
            Self::Posix
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Posix => "Posix",
            Self::BashWsl => "BashWSL",
            Self::VendorWindows => "VendorWindows",
        }
    }

    /// Host path to the path the solver shell sees.
    ///
    /// `install_dir` is the host-side installation root; the vendor port
    /// maps `<install>\..\` onto its own install tree. Drive-letter paths
    /// are read in their [`normalize_windows_path`] form, which is what
    /// reverse translation gives back.
    pub fn translate_path(&self, host: &str, install_dir: Option<&str>) -> String {
        match self {
            Self::Posix => host.to_string(),
            Self::BashWsl => {
                let host = normalize_windows_path(host);
                match split_drive(&host) {
                    Some((drive, tail)) => {
                        format!("/mnt/{}{}", drive.to_ascii_lowercase(), slashes(tail))
                    }
                    None => slashes(&host),
                }
            }
            Self::VendorWindows => {
                let host = normalize_windows_path(host);
                let install = install_dir.map(normalize_windows_path);
                if let Some(rest) = install.as_deref().and_then(|d| strip_vendor_parent(&host, d)) {
                    return join_posix(VENDOR_ROOT, &slashes(rest));
                }
                match split_drive(&host) {
                    Some((drive, tail)) => format!("/{}{}", drive.to_ascii_lowercase(), slashes(tail)),
                    None => slashes(&host),
                }
            }
        }
    }

    /// Solver-shell path back to the host path. Inverse of
    /// [`translate_path`](Self::translate_path).
    pub fn reverse_translate_path(&self, solver: &str, install_dir: Option<&str>) -> String {
        match self {
            Self::Posix => solver.to_string(),
            Self::BashWsl => {
                if let Some(rest) = solver.strip_prefix("/mnt/") {
                    let (drive, tail) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
                    if is_drive_letter(drive) {
                        return format!("{}:{}", drive.to_ascii_uppercase(), backslashes(tail, true));
                    }
                }
                relative_to_windows(solver)
            }
            Self::VendorWindows => {
                if let Some(dir) = install_dir.map(normalize_windows_path) {
                    if let Some(rest) = strip_component_prefix(solver, VENDOR_ROOT) {
                        let rest = rest.trim_start_matches('/');
                        let base = dir.trim_end_matches('\\');
                        return if rest.is_empty() {
                            format!("{base}\\..")
                        } else {
                            format!("{base}\\..\\{}", rest.replace('/', "\\"))
                        };
                    }
                }
                if let Some(rest) = solver.strip_prefix('/') {
                    let (drive, tail) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
                    if is_drive_letter(drive) {
                        return format!("{}:{}", drive.to_ascii_uppercase(), backslashes(tail, true));
                    }
                }
                relative_to_windows(solver)
            }
        }
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuntimeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "posix" => Ok(Self::Posix),
            "bashwsl" | "wsl" => Ok(Self::BashWsl),
            "vendorwindows" | "bluecfd" => Ok(Self::VendorWindows),
            other => Err(format!("unknown runtime kind '{other}'")),
        }
    }
}

/// Canonical form of a drive-letter host path: upper-case drive,
/// backslash separators, and a bare `C:` read as the drive root `C:\`.
/// Other paths are returned unchanged.
pub fn normalize_windows_path(p: &str) -> String {
    match split_drive(p) {
        Some((drive, tail)) => format!(
            "{}:{}",
            drive.to_ascii_uppercase(),
            backslashes(tail, true)
        ),
        None => p.to_string(),
    }
}

fn is_drive_letter(s: &str) -> bool {
    s.len() == 1 && s.as_bytes()[0].is_ascii_alphabetic()
}

/// `C:\Users\x` -> `('C', "\Users\x")`.
fn split_drive(p: &str) -> Option<(char, &str)> {
    let mut chars = p.chars();
    let drive = chars.next()?;
    if drive.is_ascii_alphabetic() && chars.next() == Some(':') {
        Some((drive, &p[2..]))
    } else {
        None
    }
}

fn slashes(p: &str) -> String {
    p.replace('\\', "/")
}

fn backslashes(tail: &str, rooted: bool) -> String {
    let t = tail.replace('/', "\\");
    if rooted && t.is_empty() { "\\".to_string() } else { t }
}

/// Absolute solver paths outside any mapped root stay as they are;
/// relative ones get Windows separators back.
fn relative_to_windows(p: &str) -> String {
    if p.starts_with('/') {
        p.to_string()
    } else {
        p.replace('/', "\\")
    }
}

fn strip_vendor_parent<'a>(host: &'a str, install_dir: &str) -> Option<&'a str> {
    let base = install_dir.trim_end_matches('\\');
    let prefix = format!("{base}\\..");
    let rest = host.strip_prefix(prefix.as_str())?;
    if rest.is_empty() || rest.starts_with('\\') {
        Some(rest.trim_start_matches('\\'))
    } else {
        None
    }
}

fn strip_component_prefix<'a>(p: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = p.strip_prefix(prefix)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

fn join_posix(base: &str, rest: &str) -> String {
    if rest.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{rest}")
    }
}
