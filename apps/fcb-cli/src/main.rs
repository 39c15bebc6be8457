use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use fcb_app::{
    AppError, AppResult, BuildProgressEvent, BuildReport, CaseSettings, ResidualTracker,
    Severity, load_settings, solver_service, write_case,
};
use fcb_dict::{FoamDict, Value};
use fcb_runtime::{
    LoginShell, OutputCallbacks, RuntimeConfig, RuntimeEnvironment, RuntimeKind,
    check_prerequisites,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fcb-cli")]
#[command(about = "Foam case builder - write and run OpenFOAM and FEniCS cases", long_about = None)]
struct Cli {
    /// Runtime configuration file (YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a case from a settings file
    WriteCase {
        /// Path to the case settings YAML file
        settings_path: PathBuf,
    },
    /// Write a case, then run the solver and stream its log
    Run {
        /// Path to the case settings YAML file
        settings_path: PathBuf,
        /// Run the case as it is on disk
        #[arg(long)]
        no_write: bool,
    },
    /// Detect the OpenFOAM installation
    Detect {
        /// Print the runtime as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that the installation has everything a build needs
    Check,
    /// Read or edit a dictionary file
    #[command(subcommand)]
    Dict(DictCommands),
    /// Translate a path between host and solver form
    TranslatePath {
        path: String,
        /// Solver path to host path instead
        #[arg(long)]
        reverse: bool,
        /// Runtime kind (Posix, BashWSL, BlueCFD); defaults to the host's
        #[arg(long)]
        runtime: Option<RuntimeKind>,
        /// Installation directory, needed for vendor runtime paths
        #[arg(long)]
        install_dir: Option<String>,
    },
}

#[derive(Subcommand)]
enum DictCommands {
    /// Print the value at a slash-separated key path
    Get { file: PathBuf, key_path: String },
    /// Set the value at a slash-separated key path; an empty value removes it
    Set {
        file: PathBuf,
        key_path: String,
        value: String,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::WriteCase { settings_path } => cmd_write_case(&settings_path, config),
        Commands::Run {
            settings_path,
            no_write,
        } => cmd_run(&settings_path, config, !no_write),
        Commands::Detect { json } => cmd_detect(config, json),
        Commands::Check => cmd_check(config),
        Commands::Dict(dict_cmd) => match dict_cmd {
            DictCommands::Get { file, key_path } => cmd_dict_get(&file, &key_path),
            DictCommands::Set {
                file,
                key_path,
                value,
            } => cmd_dict_set(&file, &key_path, &value),
        },
        Commands::TranslatePath {
            path,
            reverse,
            runtime,
            install_dir,
        } => {
            cmd_translate_path(&path, reverse, runtime, install_dir.as_deref());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> AppResult<RuntimeConfig> {
    match path {
        Some(path) => Ok(RuntimeConfig::load(path)?),
        None => Ok(RuntimeConfig::default()),
    }
}

fn detect_runtime(config: Option<&Path>) -> AppResult<RuntimeEnvironment> {
    let config = load_config(config)?;
    let shell = LoginShell {
        kind: config.runtime.unwrap_or_else(RuntimeKind::host_default),
    };
    Ok(RuntimeEnvironment::detect(&config, &shell))
}

fn write_with_progress(settings: &CaseSettings, runtime: &RuntimeEnvironment) -> BuildReport {
    let report = write_case(settings, runtime, Some(&mut |event| render_cli_progress(&event)));
    clear_progress_line();
    report
}

fn print_report(report: &BuildReport) {
    for message in &report.messages {
        match message.severity {
            Severity::Info => println!("  {}", message.text),
            Severity::Warning => println!("  ! {}", message.text),
            Severity::Error => println!("  ✗ {}", message.text),
        }
    }
}

fn cmd_write_case(settings_path: &Path, config: Option<&Path>) -> AppResult<()> {
    println!("Writing case from: {}", settings_path.display());
    let settings = load_settings(settings_path)?;
    let runtime = detect_runtime(config)?;
    let report = write_with_progress(&settings, &runtime);
    print_report(&report);
    if !report.success {
        return Err(AppError::Case(format!(
            "case {} was not written completely",
            report.case_dir.display()
        )));
    }
    println!("✓ Case written: {}", report.case_dir.display());
    Ok(())
}

fn cmd_run(settings_path: &Path, config: Option<&Path>, write_first: bool) -> AppResult<()> {
    let settings = load_settings(settings_path)?;
    let runtime = detect_runtime(config)?;
    if write_first {
        let report = write_with_progress(&settings, &runtime);
        print_report(&report);
        if !report.success {
            return Err(AppError::Case(format!(
                "case {} was not written completely",
                report.case_dir.display()
            )));
        }
    }

    println!("Running {} on {}", settings.solver_name, settings.case_dir().display());
    let (tx, rx) = mpsc::channel::<String>();
    let err_tx = tx.clone();
    let callbacks = OutputCallbacks {
        on_stdout: Some(Box::new(move |line: &str| {
            let _ = tx.send(line.to_string());
        })),
        on_stderr: Some(Box::new(move |line: &str| {
            let _ = err_tx.send(format!("stderr: {line}"));
        })),
        on_finished: None,
    };
    let mut handle = solver_service::launch(&settings, &runtime, callbacks)?;

    let mut tracker = ResidualTracker::new();
    for line in rx {
        println!("{line}");
        if let Some(sample) = tracker.feed(&line) {
            tracing::debug!(time = sample.time, residuals = ?sample.residuals, "time step finished");
        }
    }
    tracker.finish();

    let exit_code = handle.wait()?;
    if let Some(last) = tracker.history().last() {
        let residuals: Vec<String> = last
            .residuals
            .iter()
            .map(|(var, r)| format!("{var}={r:.3e}"))
            .collect();
        println!("  Last time {}: {}", last.time, residuals.join("  "));
    }
    if exit_code != 0 {
        return Err(AppError::Runtime(format!(
            "{} exited with code {}",
            settings.solver_name, exit_code
        )));
    }
    println!("✓ Solver finished ({} time steps)", tracker.history().len());
    Ok(())
}

fn cmd_detect(config: Option<&Path>, json: bool) -> AppResult<()> {
    let runtime = detect_runtime(config)?;
    if json {
        let text = serde_json::to_string_pretty(&runtime)
            .map_err(|e| AppError::Runtime(e.to_string()))?;
        println!("{text}");
        return Ok(());
    }
    match &runtime.install_dir {
        Some(dir) => println!("Installation: {}", dir.display()),
        None => println!("Installation: not found"),
    }
    println!("Version:      {}", runtime.version);
    println!("Variant:      {}", runtime.variant);
    println!("Runtime:      {}", runtime.kind);
    Ok(())
}

fn cmd_check(config: Option<&Path>) -> AppResult<()> {
    let runtime = detect_runtime(config)?;
    let shell = LoginShell { kind: runtime.kind };
    let problems = check_prerequisites(&runtime, &shell);
    if problems.is_empty() {
        println!("✓ All prerequisites found");
        return Ok(());
    }
    for problem in &problems {
        println!("  ✗ {problem}");
    }
    Err(AppError::Validation(format!(
        "{} prerequisite(s) missing",
        problems.len()
    )))
}

fn cmd_dict_get(file: &Path, key_path: &str) -> AppResult<()> {
    let doc = FoamDict::load(file)?;
    match doc.get(key_path) {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => Err(AppError::Dict(format!(
            "'{}' not found in {}",
            key_path,
            file.display()
        ))),
    }
}

fn cmd_dict_set(file: &Path, key_path: &str, value: &str) -> AppResult<()> {
    let mut doc = FoamDict::load(file)?;
    if value.trim().is_empty() {
        doc.body.remove_path(key_path);
    } else {
        doc.set(key_path, Value::words(value))?;
    }
    doc.save(file)?;
    println!("✓ {} updated", file.display());
    Ok(())
}

fn cmd_translate_path(
    path: &str,
    reverse: bool,
    runtime: Option<RuntimeKind>,
    install_dir: Option<&str>,
) {
    let kind = runtime.unwrap_or_else(RuntimeKind::host_default);
    let translated = if reverse {
        kind.reverse_translate_path(path, install_dir)
    } else {
        kind.translate_path(path, install_dir)
    };
    println!("{translated}");
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &BuildProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  elapsed={:.2}s",
        spinner[spin_idx],
        event.stage.label(),
        event.elapsed_wall_s
    );
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{line}");
    let _ = io::stdout().flush();
}
