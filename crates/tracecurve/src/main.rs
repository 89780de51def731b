mod bset;
mod sink;

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use itertools::Itertools;
use mimalloc::MiMalloc;
use serde_json::Value;
use tracecurve_plot::{PlotOutput, PlotterKind, merge_config};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Turn compiler time-trace logs from benchmark runs into plot data, to
/// compare how compile time scales with the size of each benchmark.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plot a set of benchmark cases
    ///
    /// Each input directory is a case holding one sub-directory per input
    /// size, each filled with time-trace JSON files. Charts are written as
    /// JSON under the output directory; the debug plotter prints a report
    /// instead.
    Plot {
        /// Plotter to run (stack, compare, compare_by, debug)
        #[arg(short, long, value_parser = PlotterKind::resolve)]
        plotter: PlotterKind,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// JSON configuration merged over the plotter's defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Benchmark case directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Print a plotter's default configuration
    DefaultConfig {
        #[arg(short, long, value_parser = PlotterKind::resolve)]
        plotter: PlotterKind,
    },

    /// Print a plotter's help text
    Describe {
        #[arg(short, long, value_parser = PlotterKind::resolve)]
        plotter: PlotterKind,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so reports on stdout stay clean. Default to warn,
    // allowlist our crates.
    const CRATES: &[&str] = &[
        "tracecurve",
        "tracecurve_aggregate",
        "tracecurve_plot",
        "tracecurve_predicates",
        "tracecurve_schemas",
    ];
    let level = cli.verbose.tracing_level_filter();
    let allowlist = CRATES.iter().map(|c| format!("{c}={level}")).join(",");
    let filter = EnvFilter::new(format!("warn,{allowlist}"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let stdout = std::io::stdout();
    match cli.command {
        Commands::Plot {
            plotter,
            output,
            config,
            inputs,
        } => {
            let config = load_config(plotter, config.as_deref())?;
            let bset = bset::build_benchmark_set(&inputs)?;
            match plotter.run(&bset, &config)? {
                PlotOutput::Artifacts {
                    artifacts,
                    file_extensions,
                } => {
                    let hints = sink::RenderHints::new(&config, file_extensions);
                    let index = sink::write_artifacts(&output, &artifacts, &hints)?;
                    info!(index = %index.display(), "done");
                }
                PlotOutput::Report(report) => {
                    report.write_report(stdout.lock())?;
                }
            }
        }
        Commands::DefaultConfig { plotter } => {
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, &plotter.default_config())?;
            writeln!(out)?;
        }
        Commands::Describe { plotter } => {
            writeln!(stdout.lock(), "{}", plotter.help())?;
        }
    }
    Ok(())
}

/// The plotter's defaults, with the user's configuration file merged over.
fn load_config(plotter: PlotterKind, path: Option<&Path>) -> Result<Value> {
    let defaults = plotter.default_config();
    let Some(path) = path else {
        return Ok(defaults);
    };

    let file = File::open(path)
        .with_context(|| format!("failed to open config {}", path.display()))?;
    let user: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse config {}", path.display()))?;

    if let Some(name) = user
        .get("plotter")
        .and_then(Value::as_str)
        .filter(|name| *name != plotter.name())
    {
        warn!(
            config = name,
            plotter = %plotter,
            "config was written for another plotter"
        );
    }
    Ok(merge_config(&defaults, &user))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn plotter_names_parse() {
        let cli = Cli::try_parse_from([
            "tracecurve",
            "plot",
            "-p",
            "compare_by",
            "-o",
            "out",
            "a",
            "b",
        ])
        .unwrap();
        let Commands::Plot {
            plotter, inputs, ..
        } = cli.command
        else {
            panic!("expected plot");
        };
        assert_eq!(plotter, PlotterKind::CompareBy);
        assert_eq!(inputs.len(), 2);

        assert!(
            Cli::try_parse_from(["tracecurve", "describe", "-p", "pie"]).is_err()
        );
        // At least one input is required.
        assert!(
            Cli::try_parse_from(["tracecurve", "plot", "-p", "stack", "-o", "out"])
                .is_err()
        );
    }

    #[test]
    fn config_file_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(
            &path,
            json!({"width": 800, "plot_file_extensions": [".png"]}).to_string(),
        )
        .unwrap();

        let config = load_config(PlotterKind::Compare, Some(&path)).unwrap();
        assert_eq!(config["width"], 800);
        assert_eq!(config["height"], 500);
        assert_eq!(config["plot_file_extensions"], json!([".png"]));
        assert_eq!(config["plotter"], "compare");
    }

    #[test]
    fn missing_config_file() {
        let tmp = TempDir::new().unwrap();
        let err =
            load_config(PlotterKind::Stack, Some(&tmp.path().join("nope.json")))
                .unwrap_err();
        assert!(err.to_string().contains("failed to open config"));
    }

    #[test]
    fn no_config_file_uses_defaults() {
        assert_eq!(
            load_config(PlotterKind::Debug, None).unwrap(),
            PlotterKind::Debug.default_config()
        );
    }
}
