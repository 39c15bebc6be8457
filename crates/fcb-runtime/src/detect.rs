//! Installation detection.
//!
//! Detection never fails: an unknown installation is recorded as `None`
//! and only reported as [`RuntimeError::NotFound`] when something tries to
//! launch a tool.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;

use crate::path::VENDOR_HOME;
use crate::{FoamVariant, FoamVersion, RuntimeConfig, RuntimeError, RuntimeKind, RuntimeResult};

/// Runs a one-line script in the user's login shell and returns its
/// trimmed stdout, or `None` when the shell is unavailable or prints
/// nothing.
pub trait ShellQuery {
    fn query(&self, script: &str) -> Option<String>;
}

/// Query backed by a real `bash` login shell.
#[derive(Clone, Copy, Debug)]
pub struct LoginShell {
    pub kind: RuntimeKind,
}

impl ShellQuery for LoginShell {
    fn query(&self, script: &str) -> Option<String> {
        let mut cmd = Command::new("bash");
        match self.kind {
            RuntimeKind::BashWsl => cmd.arg("-c").arg(format!("source ~/.bashrc && {script}")),
            _ => cmd.arg("-l").arg("-c").arg(script),
        };
        let output = cmd
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| tracing::debug!(error = %e, "shell query failed to start"))
            .ok()?;
        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

/// Conventional install locations searched when nothing else is known.
pub fn default_install_dirs() -> Vec<PathBuf> {
    if cfg!(windows) {
        [
            r"C:\Program Files\blueCFD-Core-2017\OpenFOAM-5.x",
            r"C:\Program Files\blueCFD-Core-2016\OpenFOAM-4.x",
        ]
        .iter()
        .map(PathBuf::from)
        .collect()
    } else {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        let mut dirs: Vec<PathBuf> = [
            "/opt/openfoam6",
            "/opt/openfoam5",
            "/opt/openfoam4",
            "/opt/openfoam-dev",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        if let Some(home) = home {
            for name in ["OpenFOAM-6.x", "OpenFOAM-5.x", "OpenFOAM-4.x", "OpenFOAM-dev"] {
                dirs.push(home.join("OpenFOAM").join(name));
            }
        }
        dirs
    }
}

/// A directory is an installation when it carries `etc/bashrc`.
pub fn is_installation(dir: &Path) -> bool {
    dir.join("etc").join("bashrc").is_file()
}

/// The detected solver runtime, shared read-only by every build.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RuntimeEnvironment {
    pub install_dir: Option<PathBuf>,
    pub version: FoamVersion,
    pub kind: RuntimeKind,
    pub variant: FoamVariant,
}

impl RuntimeEnvironment {
    /// A fixed environment, bypassing detection.
    pub fn new(install_dir: impl Into<PathBuf>, version: FoamVersion, kind: RuntimeKind) -> Self {
        let install_dir = install_dir.into();
        let variant = FoamVariant::detect(Some(&install_dir), None);
        Self {
            install_dir: Some(install_dir),
            version,
            kind,
            variant,
        }
    }

    /// Detection order: configured override, then the login-shell
    /// `WM_PROJECT_DIR`, then [`default_install_dirs`].
    pub fn detect(config: &RuntimeConfig, shell: &dyn ShellQuery) -> Self {
        Self::detect_with_defaults(config, shell, &default_install_dirs())
    }

    pub fn detect_with_defaults(
        config: &RuntimeConfig,
        shell: &dyn ShellQuery,
        defaults: &[PathBuf],
    ) -> Self {
        let kind = config.runtime.unwrap_or_else(RuntimeKind::host_default);
        let install_dir = detect_install_dir(config, shell, defaults);

        let version_text = config
            .version_override
            .clone()
            .or_else(|| shell.query("echo $WM_PROJECT_VERSION"));
        let version = match version_text.as_deref().map(str::parse::<FoamVersion>) {
            Some(Ok(v)) => v,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "unreadable OpenFOAM version, assuming default");
                FoamVersion::default()
            }
            None => {
                tracing::warn!(
                    default = %FoamVersion::default(),
                    "WM_PROJECT_VERSION is not defined, assuming default"
                );
                FoamVersion::default()
            }
        };
        let variant = FoamVariant::detect(install_dir.as_deref(), version_text.as_deref());
        tracing::info!(
            install_dir = ?install_dir,
            %version,
            %kind,
            %variant,
            "detected OpenFOAM runtime"
        );
        Self {
            install_dir,
            version,
            kind,
            variant,
        }
    }

    /// The installation root, or [`RuntimeError::NotFound`].
    pub fn install_dir(&self) -> RuntimeResult<&Path> {
        self.install_dir.as_deref().ok_or(RuntimeError::NotFound)
    }

    /// Legacy naming rules apply (e.g. `mut` instead of `nut`).
    pub fn is_legacy(&self) -> bool {
        !self.version.at_least(3, 0) || self.variant.is_extend()
    }

    /// Extra process environment required by the runtime kind.
    pub fn env_vars(&self) -> BTreeMap<String, String> {
        match self.kind {
            RuntimeKind::VendorWindows => [
                ("MSYSTEM", "MINGW64"),
                ("USERNAME", "ofuser"),
                ("USER", "ofuser"),
                ("HOME", VENDOR_HOME),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
            RuntimeKind::Posix | RuntimeKind::BashWsl => BTreeMap::new(),
        }
    }

    pub fn translate_path(&self, host: &Path) -> String {
        let install = self.install_dir.as_ref().map(|d| d.to_string_lossy());
        self.kind
            .translate_path(&host.to_string_lossy(), install.as_deref())
    }

    pub fn reverse_translate_path(&self, solver: &str) -> PathBuf {
        let install = self.install_dir.as_ref().map(|d| d.to_string_lossy());
        PathBuf::from(self.kind.reverse_translate_path(solver, install.as_deref()))
    }
}

fn detect_install_dir(
    config: &RuntimeConfig,
    shell: &dyn ShellQuery,
    defaults: &[PathBuf],
) -> Option<PathBuf> {
    if let Some(dir) = &config.installation_path {
        if dir.is_absolute() && is_installation(dir) {
            return Some(dir.clone());
        }
        tracing::warn!(
            path = %dir.display(),
            "configured installation path is not a valid OpenFOAM installation"
        );
        return None;
    }
    if let Some(dir) = shell.query("echo $WM_PROJECT_DIR").map(PathBuf::from) {
        if is_installation(&dir) {
            return Some(dir);
        }
        tracing::debug!(path = %dir.display(), "WM_PROJECT_DIR has no etc/bashrc");
    }
    let found = defaults.iter().find(|d| is_installation(d)).cloned();
    if found.is_none() {
        tracing::warn!("no OpenFOAM installation found");
    }
    found
}

/// Converter tools a complete installation provides.
pub const REQUIRED_TOOLS: [&str; 3] = ["ideasUnvToFoam", "gmshToFoam", "transformPoints"];

/// Human-readable readiness report; an empty list means nothing to fix.
pub fn check_prerequisites(env: &RuntimeEnvironment, shell: &dyn ShellQuery) -> Vec<String> {
    let mut messages = Vec::new();
    let Some(dir) = env.install_dir.as_deref() else {
        messages.push("OpenFOAM installation not found".to_string());
        return messages;
    };
    if !is_installation(dir) {
        messages.push(format!(
            "OpenFOAM installation path {} has no etc/bashrc",
            dir.display()
        ));
        return messages;
    }
    if !env.version.at_least(4, 0) {
        messages.push(format!(
            "OpenFOAM {} detected; version 4.0 or newer is required",
            env.version
        ));
    }
    let bashrc = env.translate_path(&dir.join("etc").join("bashrc"));
    for tool in REQUIRED_TOOLS {
        let script = format!("source \"{bashrc}\" && command -v {tool}");
        if shell.query(&script).is_none() {
            messages.push(format!("OpenFOAM tool '{tool}' not found on PATH"));
        }
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    #[derive(Default)]
    struct FakeShell(HashMap<String, String>);

    impl FakeShell {
        fn with(mut self, script: &str, out: &str) -> Self {
            self.0.insert(script.to_string(), out.to_string());
            self
        }
    }

    impl ShellQuery for FakeShell {
        fn query(&self, script: &str) -> Option<String> {
            if script.starts_with("source ") {
                return script
                    .rsplit_once("command -v ")
                    .and_then(|(_, tool)| self.0.get(tool).cloned());
            }
            self.0.get(script).cloned()
        }
    }

    fn fake_install(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("etc")).unwrap();
        fs::write(dir.join("etc").join("bashrc"), "").unwrap();
        dir
    }

    fn posix_config() -> RuntimeConfig {
        RuntimeConfig {
            runtime: Some(RuntimeKind::Posix),
            ..Default::default()
        }
    }

    #[test]
    fn override_wins() {
        let dir = fake_install("fcb_detect_override");
        let config = RuntimeConfig {
            installation_path: Some(dir.clone()),
            version_override: Some("6".into()),
            ..posix_config()
        };
        let shell = FakeShell::default().with("echo $WM_PROJECT_DIR", "/somewhere/else");
        let env = RuntimeEnvironment::detect_with_defaults(&config, &shell, &[]);
        assert_eq!(env.install_dir.as_deref(), Some(dir.as_path()));
        assert_eq!(env.version, FoamVersion::new(6, 0));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn shell_answer_then_defaults() {
        let reported = fake_install("fcb_detect_shell");
        let shell = FakeShell::default()
            .with("echo $WM_PROJECT_DIR", &reported.to_string_lossy())
            .with("echo $WM_PROJECT_VERSION", "4.1");
        let env = RuntimeEnvironment::detect_with_defaults(&posix_config(), &shell, &[]);
        assert_eq!(env.install_dir.as_deref(), Some(reported.as_path()));
        assert_eq!(env.version, FoamVersion::new(4, 1));

        let fallback = fake_install("fcb_detect_fallback");
        let missing = std::env::temp_dir().join("fcb_detect_nowhere");
        let shell = FakeShell::default().with("echo $WM_PROJECT_DIR", "/does/not/exist");
        let env = RuntimeEnvironment::detect_with_defaults(
            &posix_config(),
            &shell,
            &[missing, fallback.clone()],
        );
        assert_eq!(env.install_dir.as_deref(), Some(fallback.as_path()));
        assert_eq!(env.version, FoamVersion::default());
        let _ = fs::remove_dir_all(&reported);
        let _ = fs::remove_dir_all(&fallback);
    }

    #[test]
    fn not_found_is_lazy() {
        let config = RuntimeConfig {
            installation_path: Some(PathBuf::from("/definitely/not/foam")),
            ..posix_config()
        };
        let env = RuntimeEnvironment::detect_with_defaults(&config, &FakeShell::default(), &[]);
        assert!(env.install_dir.is_none());
        assert!(matches!(env.install_dir(), Err(RuntimeError::NotFound)));
        assert_eq!(
            check_prerequisites(&env, &FakeShell::default()),
            vec!["OpenFOAM installation not found".to_string()]
        );
    }

    #[test]
    fn vendor_env_map() {
        let env = RuntimeEnvironment::new("/x", FoamVersion::default(), RuntimeKind::VendorWindows);
        let vars = env.env_vars();
        assert_eq!(vars.get("MSYSTEM").map(String::as_str), Some("MINGW64"));
        assert_eq!(vars.get("HOME").map(String::as_str), Some("/home/ofuser"));
        assert_eq!(vars.len(), 4);
        let posix = RuntimeEnvironment::new("/x", FoamVersion::default(), RuntimeKind::Posix);
        assert!(posix.env_vars().is_empty());
    }

    #[test]
    fn prerequisites_report() {
        let dir = fake_install("fcb_detect_prereq");
        let env = RuntimeEnvironment::new(&dir, FoamVersion::new(3, 0), RuntimeKind::Posix);
        let shell = FakeShell::default()
            .with("ideasUnvToFoam", "/opt/bin/ideasUnvToFoam")
            .with("gmshToFoam", "/opt/bin/gmshToFoam");
        let messages = check_prerequisites(&env, &shell);
        assert_eq!(messages.len(), 2, "{messages:?}");
        assert!(messages[0].contains("4.0"));
        assert!(messages[1].contains("transformPoints"));

        let shell = shell.with("transformPoints", "/opt/bin/transformPoints");
        let env = RuntimeEnvironment::new(&dir, FoamVersion::DEV, RuntimeKind::Posix);
        assert!(check_prerequisites(&env, &shell).is_empty());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn legacy_naming() {
        let old = RuntimeEnvironment::new("/opt/openfoam230", FoamVersion::new(2, 3), RuntimeKind::Posix);
        assert!(old.is_legacy());
        let ext = RuntimeEnvironment::new("/opt/foam-extend-4.0", FoamVersion::new(4, 0), RuntimeKind::Posix);
        assert_eq!(ext.variant, FoamVariant::ForkExtend);
        assert!(ext.is_legacy());
        let new = RuntimeEnvironment::new("/opt/openfoam5", FoamVersion::new(5, 0), RuntimeKind::Posix);
        assert!(!new.is_legacy());
    }
}
