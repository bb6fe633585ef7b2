use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::errors::{Result, SmokeError};
use crate::platform::HostSystem;

pub const OS_ID: &str = "OS_ID";
pub const BUILD_SYSTEM: &str = "build_system";
pub const CI_JOB_NAME: &str = "CI_JOB_NAME";
pub const GV_VERSION: &str = "GV_VERSION";
pub const PROJECT_PLATFORM: &str = "project_platform";

const OS_RELEASE_PATHS: &[&str] = &["/etc/os-release", "/usr/lib/os-release"];

/// Parse `KEY=value` lines as found in dotenv and os-release files.
/// Blank lines and `#` comments are ignored, surrounding quotes stripped.
pub fn parse_env_lines(content: &str) -> Vec<(String, String)> {
    let mut vars = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim().to_string();
            let mut value = value.trim();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }
            vars.push((key, value.to_string()));
        }
    }
    vars
}

/// Variables loaded from `--env-file` files. Later files override earlier ones.
#[derive(Debug, Clone, Default)]
pub struct EnvManager {
    env_vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_env_files<P: AsRef<Path>>(&mut self, env_files: &[P]) -> Result<()> {
        for file_path in env_files {
            self.load_env_file(file_path.as_ref())?;
        }
        Ok(())
    }

    fn load_env_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            SmokeError::ConfigError(format!("cannot read env file {}: {}", path.display(), e))
        })?;
        let vars = parse_env_lines(&content);
        tracing::debug!(file = %path.display(), count = vars.len(), "Loaded env file");
        self.env_vars.extend(vars);
        Ok(())
    }

    pub fn get_env(&self) -> &HashMap<String, String> {
        &self.env_vars
    }

    /// Process environment first, then values from env files. An empty
    /// process variable counts as unset.
    pub fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.env_vars.get(key).cloned())
    }
}

/// `ID` from the freedesktop os-release file, if any is readable
pub fn read_os_release_id() -> Option<String> {
    OS_RELEASE_PATHS.iter().find_map(|path| {
        let content = fs::read_to_string(path).ok()?;
        parse_env_lines(&content)
            .into_iter()
            .find(|(key, _)| key == "ID")
            .map(|(_, value)| value)
    })
}

/// Immutable snapshot of everything the checks key their decisions on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CiEnvironment {
    pub os_id: Option<String>,
    pub build_system: Option<String>,
    pub ci_job_name: Option<String>,
    pub gv_version: Option<String>,
    pub project_platform: Option<String>,
    pub system: HostSystem,
    pub asan: bool,
}

impl CiEnvironment {
    /// Build a snapshot from an arbitrary variable source. `os_release_id`
    /// is used when `OS_ID` is unset.
    pub fn from_lookup<F>(
        lookup: F,
        os_release_id: Option<String>,
        system: HostSystem,
        asan_jobs: &[String],
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let ci_job_name = get(CI_JOB_NAME);
        let asan = ci_job_name
            .as_ref()
            .map(|job| asan_jobs.iter().any(|j| j == job))
            .unwrap_or(false);

        Self {
            os_id: get(OS_ID).or(os_release_id),
            build_system: get(BUILD_SYSTEM),
            ci_job_name,
            gv_version: get(GV_VERSION),
            project_platform: get(PROJECT_PLATFORM),
            system,
            asan,
        }
    }

    pub fn capture(env_manager: &EnvManager, asan_jobs: &[String]) -> Self {
        let env = Self::from_lookup(
            |key| env_manager.lookup(key),
            read_os_release_id(),
            HostSystem::detect(),
            asan_jobs,
        );
        tracing::debug!(
            os_id = ?env.os_id,
            build_system = ?env.build_system,
            system = %env.system,
            asan = env.asan,
            "Captured CI environment"
        );
        env
    }

    pub fn os_id_display(&self) -> &str {
        self.os_id.as_deref().unwrap_or("<unknown os>")
    }

    pub fn build_system_display(&self) -> &str {
        self.build_system.as_deref().unwrap_or("<unset>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_env_lines() {
        let content = "TEST_KEY=test_value\n# comment\n\nTEST_KEY2='quoted value'\nID=\"ubuntu\"\n";
        let vars = parse_env_lines(content);
        assert_eq!(
            vars,
            vec![
                ("TEST_KEY".to_string(), "test_value".to_string()),
                ("TEST_KEY2".to_string(), "quoted value".to_string()),
                ("ID".to_string(), "ubuntu".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_env_lines_lone_quote() {
        let vars = parse_env_lines("A=\"\n");
        assert_eq!(vars, vec![("A".to_string(), "\"".to_string())]);
    }

    #[test]
    fn test_merge_env_files_later_wins() {
        let mut first = tempfile::NamedTempFile::new().unwrap();
        writeln!(first, "build_system=cmake\nOS_ID=ubuntu").unwrap();
        let mut second = tempfile::NamedTempFile::new().unwrap();
        writeln!(second, "build_system=autotools").unwrap();

        let mut manager = EnvManager::new();
        manager
            .merge_env_files(&[first.path(), second.path()])
            .unwrap();
        assert_eq!(manager.get_env().get("build_system").unwrap(), "autotools");
        assert_eq!(manager.get_env().get("OS_ID").unwrap(), "ubuntu");
    }

    #[test]
    fn test_merge_missing_env_file() {
        let mut manager = EnvManager::new();
        let result = manager.merge_env_files(&["/nonexistent/gvsmoke.env"]);
        assert!(matches!(result, Err(SmokeError::ConfigError(_))));
    }

    #[test]
    fn test_from_lookup() {
        let asan_jobs = vec!["ubuntu21.04-cmake-ASan-test-including-ctest".to_string()];
        let env = CiEnvironment::from_lookup(
            lookup_from(&[
                ("OS_ID", "ubuntu"),
                ("build_system", "cmake"),
                ("CI_JOB_NAME", "ubuntu21.04-cmake-ASan-test-including-ctest"),
                ("GV_VERSION", "2.49.0"),
            ]),
            Some("fedora".to_string()),
            HostSystem::Linux,
            &asan_jobs,
        );
        assert_eq!(env.os_id.as_deref(), Some("ubuntu"));
        assert_eq!(env.build_system.as_deref(), Some("cmake"));
        assert_eq!(env.gv_version.as_deref(), Some("2.49.0"));
        assert_eq!(env.project_platform, None);
        assert!(env.asan);
    }

    #[test]
    fn test_os_release_fallback_and_empty_values() {
        let env = CiEnvironment::from_lookup(
            lookup_from(&[("OS_ID", ""), ("CI_JOB_NAME", "macos-autotools-test")]),
            Some("centos".to_string()),
            HostSystem::Darwin,
            &["other".to_string()],
        );
        assert_eq!(env.os_id.as_deref(), Some("centos"));
        assert_eq!(env.build_system_display(), "<unset>");
        assert!(!env.asan);
    }

    #[test]
    fn test_lookup_empty_process_var_falls_back_to_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "GVSMOKE_TEST_EMPTY_BUILD_SYSTEM=cmake").unwrap();
        writeln!(file, "GVSMOKE_TEST_SET_BUILD_SYSTEM=cmake").unwrap();
        std::env::set_var("GVSMOKE_TEST_EMPTY_BUILD_SYSTEM", "");
        std::env::set_var("GVSMOKE_TEST_SET_BUILD_SYSTEM", "autotools");

        let mut manager = EnvManager::new();
        manager.merge_env_files(&[file.path()]).unwrap();
        assert_eq!(
            manager.lookup("GVSMOKE_TEST_EMPTY_BUILD_SYSTEM").as_deref(),
            Some("cmake")
        );
        assert_eq!(
            manager.lookup("GVSMOKE_TEST_SET_BUILD_SYSTEM").as_deref(),
            Some("autotools")
        );
    }
}
