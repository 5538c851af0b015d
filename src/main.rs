use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;
use runtime_sync::services::prepare_runtime_dir;
use runtime_sync::{
    assemble_runtime, run_summary, AppConfig, AssemblyConfig, AssemblyPlan, AssemblyReport,
    ClipboardSink, IgnoreRuleSet, RuntimeLocation, SummaryConfig, SummaryPlan, SummaryReport,
    TextSink, UnitStatus,
};

fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    // Load .env before the subscriber reads RUST_LOG
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    let config = create_app_config(&matches)?;

    initialize_logging(&config.log_level)?;
    if !dotenv_loaded {
        info!("No .env file found, using system environment variables");
    }

    match matches.subcommand() {
        Some(("assemble", _)) => run_assemble(&config),
        Some(("summarize", _)) => run_summarize(&config),
        _ => anyhow::bail!("No subcommand given"),
    }
}

fn build_cli() -> Command {
    Command::new("runtime-sync")
        .version("0.1.0")
        .about("Assemble the plugin runtime directory and build source summaries")
        .subcommand_required(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Set the log level (trace, debug, info, warn, error)")
                .default_value("info")
                .global(true),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("DIR")
                .help("Project root all fixed paths are relative to")
                .default_value(".")
                .global(true),
        )
        .subcommand(
            Command::new("assemble")
                .about("Copy the built sub-applications into the runtime directory")
                .arg(
                    Arg::new("runtime-dir")
                        .long("runtime-dir")
                        .value_name("DIR")
                        .help("Runtime directory, relative to the project root")
                        .default_value("runtime")
                        .conflicts_with("latest-version"),
                )
                .arg(
                    Arg::new("latest-version")
                        .long("latest-version")
                        .help("Assemble into the newest vX.Y.Z directory instead")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .value_name("PATH")
                        .help("Also write the assembly report as JSON"),
                ),
        )
        .subcommand(
            Command::new("summarize")
                .about("Concatenate docs and sources into one text file")
                .arg(
                    Arg::new("output")
                        .long("output")
                        .value_name("PATH")
                        .help("Output file (default: result.txt in the project root)"),
                )
                .arg(
                    Arg::new("clipboard-hold")
                        .long("clipboard-hold")
                        .value_name("SECS")
                        .help("Linux: keep serving the clipboard for at most this long")
                        .default_value("60"),
                )
                .arg(
                    Arg::new("no-clipboard")
                        .long("no-clipboard")
                        .help("Do not copy the summary to the clipboard")
                        .action(ArgAction::SetTrue),
                ),
        )
}

/// Pure function to create application configuration from CLI arguments
fn create_app_config(matches: &ArgMatches) -> Result<AppConfig> {
    // global args are propagated down, so read them where the user may have put them
    let scoped = matches.subcommand().map(|(_, sub)| sub).unwrap_or(matches);

    let log_level = scoped
        .get_one::<String>("log-level")
        .cloned()
        .unwrap_or_else(|| "info".to_string());

    let root = scoped
        .get_one::<String>("root")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = AppConfig {
        root,
        log_level,
        ..AppConfig::default()
    };

    match matches.subcommand() {
        Some(("assemble", sub)) => {
            let location = if sub.get_flag("latest-version") {
                RuntimeLocation::LatestVersion
            } else {
                let dir = sub
                    .get_one::<String>("runtime-dir")
                    .ok_or_else(|| anyhow::anyhow!("Missing runtime-dir value"))?;
                RuntimeLocation::Fixed(PathBuf::from(dir))
            };

            config.assembly = AssemblyConfig {
                location,
                report_path: sub.get_one::<String>("report").map(PathBuf::from),
            };
        }
        Some(("summarize", sub)) => {
            let clipboard_hold: u64 = sub
                .get_one::<String>("clipboard-hold")
                .map(|secs| secs.parse::<u64>())
                .transpose()
                .map_err(|_| anyhow::anyhow!("Invalid clipboard-hold value"))?
                .unwrap_or(60);

            config.summary = SummaryConfig {
                output: sub.get_one::<String>("output").map(PathBuf::from),
                publish_to_clipboard: !sub.get_flag("no-clipboard"),
                clipboard_hold: Duration::from_secs(clipboard_hold),
            };
        }
        _ => {}
    }

    Ok(config)
}

/// Initialize structured logging with tracing
fn initialize_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}

fn run_assemble(config: &AppConfig) -> Result<()> {
    info!("Configuration: {:#?}", config.assembly);

    let runtime_dir = prepare_runtime_dir(&config.root, &config.assembly.location)?;
    let plan = AssemblyPlan::standard(&config.root, runtime_dir);
    let rules = IgnoreRuleSet::build_artifacts();
    info!("Ignore rules: {:?}", rules.labels());

    let report = assemble_runtime(&plan, &rules)?;
    print_assembly_report(&report);

    if let Some(path) = &config.assembly.report_path {
        report.write_json(path)?;
        info!("Report written to {}", path.display());
    }

    if report.has_failures() {
        anyhow::bail!("{} unit(s) failed to assemble", report.count(UnitStatus::Failed));
    }

    Ok(())
}

fn run_summarize(config: &AppConfig) -> Result<()> {
    let mut plan = SummaryPlan::standard(&config.root);
    if let Some(output) = &config.summary.output {
        plan = plan.with_output(output);
    }

    let mut clipboard = ClipboardSink::with_hold(config.summary.clipboard_hold);
    let sink: Option<&mut dyn TextSink> = if config.summary.publish_to_clipboard {
        Some(&mut clipboard)
    } else {
        None
    };

    let report = run_summary(&plan, sink)?;
    print_summary_report(&report);
    Ok(())
}

fn print_assembly_report(report: &AssemblyReport) {
    info!("=== RUNTIME ASSEMBLY REPORT ===");
    info!("Runtime directory: {}", report.runtime_dir.display());

    for unit in &report.units {
        match unit.status {
            UnitStatus::Synced => info!(
                "{:<12} synced: {} files, {} ignored, {} unsupported",
                unit.name, unit.copy.files_copied, unit.copy.ignored, unit.copy.unsupported
            ),
            UnitStatus::SourceMissing => {
                warn!("{:<12} skipped: {} does not exist", unit.name, unit.source.display())
            }
            UnitStatus::Failed => error!(
                "{:<12} failed: {}",
                unit.name,
                unit.error.as_deref().unwrap_or("see copy errors above")
            ),
        }
    }

    for placeholder in &report.placeholders_created {
        info!("Created placeholder {}", placeholder.display());
    }

    let elapsed = report.finished_at - report.started_at;
    info!("Total files copied: {}", report.files_copied());
    info!("Elapsed: {} ms", elapsed.num_milliseconds());
}

fn print_summary_report(report: &SummaryReport) {
    info!("=== SUMMARY REPORT ===");
    info!("Output file: {}", report.output.display());
    info!("Sections: {}", report.sections);
    info!("Characters: {}", report.characters);
    match &report.published_to {
        Some(sink) => info!("Content copied to {}", sink),
        None => info!("Content not published"),
    }
}
