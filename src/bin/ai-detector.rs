use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ai_image_detector::config::{DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT};
use ai_image_detector::{server, Detector, FileReport, ServerConfig, Variant};

#[derive(Parser)]
#[command(
    name = "ai-detector",
    about = "Score how likely images are AI-generated using fixed heuristics",
    version,
    after_help = "NOTE: Scores come from simple image statistics (size, saturation,\n\
                  brightness spread, color variance). They are a hint, not proof."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log per-check statistics
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all non-error output on stderr
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Score an image file or every image in a directory, one JSON line each
    Analyze(AnalyzeArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Add the edge-smoothness check
    #[arg(long)]
    extended: bool,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Input image file or directory
    input: PathBuf,

    /// Add the edge-smoothness check
    #[arg(long)]
    extended: bool,
}

fn variant(extended: bool) -> Variant {
    if extended {
        Variant::Extended
    } else {
        Variant::Minimal
    }
}

fn init_logging(cli: &Cli) {
    let default = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let code = match &cli.command {
        Command::Serve(args) => run_serve(args),
        Command::Analyze(args) => run_analyze(args, cli.quiet),
    };
    process::exit(code);
}

fn run_serve(args: &ServeArgs) -> i32 {
    let config = ServerConfig {
        host: args.host.clone(),
        port: args.port,
        variant: variant(args.extended),
        max_body_bytes: args.max_body_bytes,
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Fatal: Failed to start async runtime: {e}");
            return 1;
        }
    };

    match runtime.block_on(server::serve(&config)) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Fatal: {e}");
            1
        }
    }
}

fn run_analyze(args: &AnalyzeArgs, quiet: bool) -> i32 {
    let input: &Path = &args.input;
    if !input.exists() {
        eprintln!("Error: Input path does not exist: {}", input.display());
        return 1;
    }

    let detector = Detector::heuristic(variant(args.extended));
    let reports = if input.is_dir() {
        detector.analyze_directory(input)
    } else {
        vec![detector.analyze_file(input)]
    };

    let mut ai_count = 0u32;
    let mut fail_count = 0u32;
    for report in &reports {
        print_report(report);
        match &report.analysis {
            Some(a) if a.is_ai_generated => ai_count += 1,
            Some(_) => {}
            None => fail_count += 1,
        }
    }

    if reports.len() > 1 && !quiet {
        eprintln!();
        eprint!("[Summary] Likely AI: {ai_count}");
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", reports.len());
    }

    i32::from(fail_count > 0)
}

fn print_report(report: &FileReport) {
    match serde_json::to_string(report) {
        Ok(line) => println!("{line}"),
        Err(e) => eprintln!("[FAIL] {}: {e}", report.path.display()),
    }
}
