mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::ConfigMerger;
use fs_err as fs;
use portfix_core::adapters::{CommandBuildInvoker, FsRepoView, FsWritePort};
use portfix_core::heal::{run_repair_loop, write_heal_artifacts};
use portfix_core::oracle::GeminiOracle;
use portfix_core::planning::create_plan;
use portfix_core::ports::WritePort;
use portfix_core::scaffold::scaffold_project;
use portfix_core::scan::FsScanner;
use portfix_core::settings::{HealSettings, TranslateSettings};
use portfix_core::translate::translate_all;
use portfix_core::{CancellationToken, ToolError};
use portfix_domain::{ValidateOptions, validate_plan};
use portfix_render::render_translation_md;
use portfix_types::plan::{MigrationPlan, SavedPlan};
use portfix_types::report::ToolInfo;
use portfix_types::scan::ScanResult;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Where run artifacts live inside a generated or repaired project.
const ARTIFACTS_DIR: &str = ".portfix";

#[derive(Debug, Parser)]
#[command(
    name = "portfix",
    version,
    about = "Plan-driven code migration with a build-diagnose-repair loop."
)]
struct Cli {
    /// Config file (default: ./portfix.toml when present).
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Oracle model, overriding [oracle].model.
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan a source project and print a migration plan as JSON.
    Analyze(AnalyzeArgs),
    /// Plan, scaffold and translate a source project into a target project.
    Migrate(MigrateArgs),
    /// Drive an existing target project toward a compiling state.
    Fix(FixArgs),
}

#[derive(Debug, Parser)]
struct AnalyzeArgs {
    /// Source project directory.
    input: Utf8PathBuf,

    /// Write the plan here instead of stdout.
    #[arg(long)]
    out: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct MigrateArgs {
    /// Source project directory.
    input: Utf8PathBuf,

    /// Target project directory (created if missing).
    output: Utf8PathBuf,

    /// Reuse a saved plan instead of asking the oracle for one.
    #[arg(long)]
    plan: Option<Utf8PathBuf>,

    /// Run the repair loop on the generated project.
    #[arg(long, default_value_t = false)]
    heal: bool,

    #[command(flatten)]
    repair: RepairArgs,
}

#[derive(Debug, Parser)]
struct FixArgs {
    /// Target project directory.
    project: Utf8PathBuf,

    #[command(flatten)]
    repair: RepairArgs,
}

#[derive(Debug, Clone, clap::Args)]
struct RepairArgs {
    /// Maximum number of builds, overriding [repair].max_retries.
    #[arg(long)]
    retries: Option<u32>,

    /// Stop as soon as an attempt reproduces the previous diagnostics.
    #[arg(long, default_value_t = false)]
    halt_on_stall: bool,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match real_main() {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn real_main() -> Result<(), ToolError> {
    let cli = Cli::parse();

    let cwd = Utf8PathBuf::from(".");
    let file_config =
        config::load_or_default(cli.config.as_deref(), &cwd).context("load portfix.toml config")?;
    let merger = ConfigMerger::new(file_config);

    match cli.cmd {
        Command::Analyze(args) => cmd_analyze(args, &merger, cli.model.as_deref()),
        Command::Migrate(args) => cmd_migrate(args, &merger, cli.model.as_deref()),
        Command::Fix(args) => cmd_fix(args, &merger, cli.model.as_deref()),
    }
}

fn cmd_analyze(
    args: AnalyzeArgs,
    merger: &ConfigMerger,
    model: Option<&str>,
) -> Result<(), ToolError> {
    let scan = scan_source(&args.input, merger)?;
    let oracle = build_oracle(merger, model)?;
    let plan = create_plan(
        &scan,
        &oracle,
        &merger.languages(),
        &ValidateOptions::default(),
    )?;

    let json = plan_json(&plan)?;
    match args.out {
        Some(out) => {
            FsWritePort
                .write_file(&out, json.as_bytes())
                .with_context(|| format!("write {}", out))?;
            info!("wrote plan to {}", out);
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_migrate(
    args: MigrateArgs,
    merger: &ConfigMerger,
    model: Option<&str>,
) -> Result<(), ToolError> {
    // Settings are resolved up front so a bad config fails before any oracle call.
    let heal_settings = if args.heal {
        Some(merger.merge_heal_args(
            Utf8PathBuf::new(),
            args.repair.retries,
            args.repair.halt_on_stall,
        )?)
    } else {
        None
    };

    let scan = scan_source(&args.input, merger)?;
    let oracle = build_oracle(merger, model)?;

    let plan = match &args.plan {
        Some(path) => load_plan(path)?,
        None => create_plan(
            &scan,
            &oracle,
            &merger.languages(),
            &ValidateOptions::default(),
        )?,
    };

    fs::create_dir_all(&args.output).with_context(|| format!("create {}", args.output))?;
    let output = args
        .output
        .canonicalize_utf8()
        .with_context(|| format!("resolve {}", args.output))?;
    let artifacts = output.join(ARTIFACTS_DIR);
    let writer = FsWritePort;

    writer
        .write_file(&artifacts.join("plan.json"), plan_json(&plan)?.as_bytes())
        .context("save plan")?;
    scaffold_project(&plan, &output, &writer).context("scaffold target project")?;

    let settings = TranslateSettings {
        output_root: output.clone(),
        languages: merger.languages(),
    };
    let cancel = CancellationToken::new();
    let summary = translate_all(&plan, &scan, &oracle, &writer, &settings, &cancel);
    writer
        .write_file(
            &artifacts.join("migrate.md"),
            render_translation_md(&summary).as_bytes(),
        )
        .context("write migrate report")?;

    let failed = summary.files.len() - summary.translated();
    if failed > 0 {
        warn!(
            failed,
            total = summary.files.len(),
            "some files were not translated"
        );
    }
    info!(
        translated = summary.translated(),
        output = %output,
        "migration written"
    );

    match heal_settings {
        Some(mut settings) => {
            settings.project_root = output;
            heal(&settings, merger, &oracle, &cancel)
        }
        None => Ok(()),
    }
}

fn cmd_fix(args: FixArgs, merger: &ConfigMerger, model: Option<&str>) -> Result<(), ToolError> {
    let project = args
        .project
        .canonicalize_utf8()
        .with_context(|| format!("project directory {}", args.project))?;
    if !project.is_dir() {
        return Err(anyhow::anyhow!("{} is not a directory", project).into());
    }

    let settings =
        merger.merge_heal_args(project, args.repair.retries, args.repair.halt_on_stall)?;
    let oracle = build_oracle(merger, model)?;
    heal(&settings, merger, &oracle, &CancellationToken::new())
}

fn heal(
    settings: &HealSettings,
    merger: &ConfigMerger,
    oracle: &GeminiOracle,
    cancel: &CancellationToken,
) -> Result<(), ToolError> {
    let build = CommandBuildInvoker::new(merger.build_command(), settings.project_root.clone())?;
    debug!(
        command = %build.command_line(),
        grammar = settings.grammar.name(),
        max_retries = settings.max_retries,
        "starting repair loop"
    );

    let repo = FsRepoView::new(settings.project_root.clone());
    let writer = FsWritePort;
    let outcome = run_repair_loop(settings, &build, &repo, oracle, &writer, cancel, tool_info())?;

    let artifacts = settings.project_root.join(ARTIFACTS_DIR);
    write_heal_artifacts(&outcome, &artifacts, &writer).context("write heal artifacts")?;
    info!("wrote heal report to {}", artifacts);

    outcome.ensure_success()
}

fn scan_source(input: &Utf8Path, merger: &ConfigMerger) -> anyhow::Result<ScanResult> {
    let scanner = FsScanner::new(input.to_path_buf(), &merger.scan_settings())?;
    let scan = scanner
        .scan()
        .with_context(|| format!("scan source project {}", input))?;
    info!(files = scan.files.len(), root = %scan.root_name, "scanned source project");
    Ok(scan)
}

fn build_oracle(merger: &ConfigMerger, model: Option<&str>) -> anyhow::Result<GeminiOracle> {
    let settings = merger.merge_oracle_args(model, |name| std::env::var(name).ok())?;
    GeminiOracle::new(&settings)
}

/// Read a plan saved by `migrate` or `analyze`, or a bare plan document.
fn load_plan(path: &Utf8Path) -> Result<MigrationPlan, ToolError> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path))?;
    // Saved plans may have been edited by hand; both forms are revalidated.
    let body = match serde_json::from_str::<SavedPlan>(&raw) {
        Ok(saved) => {
            debug!(schema = %saved.schema, "loaded saved plan");
            serde_json::to_string(&saved.plan).context("reserialize saved plan")?
        }
        Err(_) => raw,
    };
    Ok(validate_plan(&body)?)
}

fn plan_json(plan: &MigrationPlan) -> anyhow::Result<String> {
    serde_json::to_string_pretty(&SavedPlan::new(plan.clone())).context("serialize plan")
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "portfix".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}

