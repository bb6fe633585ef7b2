use std::fmt;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Operating system family of the host running the checks, named as
/// `uname -s` reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum HostSystem {
    Linux,
    Darwin,
    Windows,
    Other,
}

impl HostSystem {
    pub fn detect() -> Self {
        if cfg!(target_os = "linux") {
            HostSystem::Linux
        } else if cfg!(target_os = "macos") {
            HostSystem::Darwin
        } else if cfg!(target_os = "windows") {
            HostSystem::Windows
        } else {
            HostSystem::Other
        }
    }
}

impl fmt::Display for HostSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HostSystem::Linux => "Linux",
            HostSystem::Darwin => "Darwin",
            HostSystem::Windows => "Windows",
            HostSystem::Other => "Other",
        };
        write!(f, "{}", s)
    }
}

/// Executable search abstraction
pub trait ToolLocator: Send + Sync {
    /// Resolve a tool name to an executable path, like `which`
    fn find(&self, name: &str) -> Option<PathBuf>;
}

/// Looks tools up in a fixed search path, the way the shell would with
/// that value as `$PATH`.
#[derive(Debug, Clone)]
pub struct PathLocator {
    search_path: OsString,
    cwd: PathBuf,
}

impl PathLocator {
    pub fn new(search_path: impl Into<OsString>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            search_path: search_path.into(),
            cwd: cwd.into(),
        }
    }
}

impl ToolLocator for PathLocator {
    fn find(&self, name: &str) -> Option<PathBuf> {
        match which::which_in(name, Some(&self.search_path), &self.cwd) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::trace!(tool = name, error = %e, "Tool lookup failed");
                None
            }
        }
    }
}

/// Locator over `search_path`, relative to the current directory
pub fn get_tool_locator(search_path: impl Into<OsString>) -> Result<Box<dyn ToolLocator>> {
    let cwd = std::env::current_dir()?;
    Ok(Box::new(PathLocator::new(search_path, cwd)))
}

/// Program to spawn for `name`: the located executable when `name` is a
/// bare tool name found by `locator`, otherwise `name` unchanged.
pub fn resolve_program(locator: &dyn ToolLocator, name: &str) -> PathBuf {
    if Path::new(name).components().count() > 1 {
        return PathBuf::from(name);
    }
    locator.find(name).unwrap_or_else(|| PathBuf::from(name))
}
