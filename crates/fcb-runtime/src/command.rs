//! Structured command descriptions and their rendering per runtime kind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::{RuntimeEnvironment, RuntimeKind, RuntimeResult};

/// A solver tool invocation, independent of how the runtime wraps it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FoamCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    /// Relative to `cwd`; output is appended to it as well as captured.
    pub log_file: Option<String>,
}

impl FoamCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Tee output into `log.<application>`.
    pub fn logged(mut self) -> Self {
        self.log_file = Some(format!("log.{}", self.app_name()));
        self
    }

    pub fn log_to(mut self, file: impl Into<String>) -> Self {
        self.log_file = Some(file.into());
        self
    }

    /// Bare application name, without any directory prefix.
    pub fn app_name(&self) -> &str {
        self.program.rsplit('/').next().unwrap_or(&self.program)
    }

    /// The command as a single shell line.
    pub fn shell_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A concrete process launch: argv, environment and working directory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// The shell script passed to `-c`, when this is a shell wrapper.
    pub fn script(&self) -> Option<&str> {
        let pos = self.args.iter().position(|a| a == "-c")?;
        self.args.get(pos + 1).map(String::as_str)
    }
}

impl RuntimeEnvironment {
    /// Wraps `cmd` so it runs with the solver environment sourced.
    ///
    /// Fails with `NotFound` when no installation is known.
    pub fn render(&self, cmd: &FoamCommand) -> RuntimeResult<Invocation> {
        let install = self.install_dir()?;
        let mut line = cmd.shell_line();
        if let Some(log) = &cmd.log_file {
            let log = shell_quote(log);
            line = format!("{{ rm -f {log}; {line} 1> >(tee -a {log}) 2> >(tee -a {log} >&2); }}");
        }
        let script = match self.kind {
            RuntimeKind::BashWsl => format!("source ~/.bashrc && {line}"),
            RuntimeKind::Posix | RuntimeKind::VendorWindows => {
                let bashrc = self.translate_path(&install.join("etc").join("bashrc"));
                format!("source \"{bashrc}\" && {line}")
            }
        };
        let (program, mut args) = match self.kind {
            RuntimeKind::VendorWindows => (
                vendor_bash(install).to_string_lossy().into_owned(),
                vec!["--login".to_string(), "-O".into(), "expand_aliases".into()],
            ),
            RuntimeKind::Posix | RuntimeKind::BashWsl => ("bash".to_string(), Vec::new()),
        };
        args.push("-c".into());
        args.push(script);

        let mut env = self.env_vars();
        env.extend(cmd.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(Invocation {
            program,
            args,
            cwd: cmd.cwd.clone(),
            env,
        })
    }
}

/// The MSYS bash shipped alongside the vendor port.
fn vendor_bash(install: &Path) -> PathBuf {
    install
        .join("..")
        .join("msys64")
        .join("usr")
        .join("bin")
        .join("bash.exe")
}

/// Single-quotes `s` unless it only holds characters the shell leaves alone.
pub fn shell_quote(s: &str) -> String {
    let plain = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%$".contains(c));
    if plain {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FoamVersion, RuntimeError};

    fn posix() -> RuntimeEnvironment {
        RuntimeEnvironment::new("/opt/openfoam5", FoamVersion::new(5, 0), RuntimeKind::Posix)
    }

    #[test]
    fn quoting() {
        assert_eq!(shell_quote("simpleFoam"), "simpleFoam");
        assert_eq!(shell_quote("(0.001 0.001 0.001)"), "'(0.001 0.001 0.001)'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn posix_sources_bashrc() {
        let cmd = FoamCommand::new("transformPoints")
            .args(["-scale", "(0.001 0.001 0.001)"])
            .cwd("/tmp/case");
        let inv = posix().render(&cmd).unwrap();
        assert_eq!(inv.program, "bash");
        assert_eq!(
            inv.script(),
            Some("source \"/opt/openfoam5/etc/bashrc\" && transformPoints -scale '(0.001 0.001 0.001)'")
        );
        assert_eq!(inv.cwd.as_deref(), Some(Path::new("/tmp/case")));
        assert!(inv.env.is_empty());
    }

    #[test]
    fn logged_command_tees() {
        let cmd = FoamCommand::new("/usr/bin/simpleFoam").logged();
        assert_eq!(cmd.log_file.as_deref(), Some("log.simpleFoam"));
        let script = posix().render(&cmd).unwrap().script().unwrap().to_string();
        assert!(script.contains("rm -f log.simpleFoam;"));
        assert!(script.contains("1> >(tee -a log.simpleFoam)"));
        assert!(script.contains("2> >(tee -a log.simpleFoam >&2)"));
    }

    #[test]
    fn wsl_uses_user_bashrc() {
        let env = RuntimeEnvironment::new("/opt/openfoam5", FoamVersion::default(), RuntimeKind::BashWsl);
        let inv = env.render(&FoamCommand::new("icoFoam")).unwrap();
        assert_eq!(inv.args, vec!["-c".to_string(), "source ~/.bashrc && icoFoam".into()]);
    }

    #[test]
    fn vendor_merges_env() {
        let env = RuntimeEnvironment::new(
            r"C:\blueCFD\OpenFOAM-5.x",
            FoamVersion::default(),
            RuntimeKind::VendorWindows,
        );
        let inv = env
            .render(&FoamCommand::new("blockMesh").env("HOME", "/home/other"))
            .unwrap();
        assert_eq!(inv.args[..3], ["--login", "-O", "expand_aliases"]);
        assert_eq!(inv.env.get("MSYSTEM").map(String::as_str), Some("MINGW64"));
        assert_eq!(inv.env.get("HOME").map(String::as_str), Some("/home/other"));
        assert!(inv.script().unwrap().starts_with("source \"/c/blueCFD/OpenFOAM-5.x/etc/bashrc\""));
    }

    #[test]
    fn render_without_install_is_not_found() {
        let mut env = posix();
        env.install_dir = None;
        assert!(matches!(
            env.render(&FoamCommand::new("simpleFoam")),
            Err(RuntimeError::NotFound)
        ));
    }
}
