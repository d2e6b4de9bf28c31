use anyhow::Context;
#[cfg(not(feature = "toml"))]
use anyhow::bail;
use clap::{Parser, Subcommand};
use gridquery::export;
use gridquery::{
    Config, GridKnn, LinearScan, LoadPolicy, LoadReport, NaiveSpatialJoin, PbsmJoin, Session,
    SkylineQuery,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DEFAULT_LABEL: &str = "default";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON configuration file (TOML with the `toml` feature)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, allow_hyphen_values = true)]
    xl: Option<f64>,

    #[arg(long, global = true, allow_hyphen_values = true)]
    yl: Option<f64>,

    #[arg(long, global = true, allow_hyphen_values = true)]
    xu: Option<f64>,

    #[arg(long, global = true, allow_hyphen_values = true)]
    yu: Option<f64>,

    /// Partitions per axis
    #[arg(short = 'm', long = "partitions", global = true)]
    partitions: Option<usize>,

    /// Skip malformed rows and duplicate ids instead of aborting
    #[arg(long, global = true)]
    lenient: bool,

    /// Write the result export to this file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Leave the statistics block out of the export file
    #[arg(long, global = true)]
    no_stats: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct PointQuery {
    file: PathBuf,

    #[arg(long, allow_hyphen_values = true)]
    x: f64,

    #[arg(long, allow_hyphen_values = true)]
    y: f64,

    #[arg(short, default_value_t = 1)]
    k: usize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a uniform random dataset
    Generate {
        file: PathBuf,

        #[arg(short = 'n', long = "count")]
        count: usize,

        /// Id prefix, e.g. `A` for `A1, A2, ...`
        #[arg(long)]
        label: Option<String>,

        #[arg(long)]
        seed: Option<u64>,
    },
    /// k nearest neighbors by scanning every rectangle
    LinearScan(PointQuery),
    /// k nearest neighbors through the grid
    Knn(PointQuery),
    /// Partition-based spatial-merge join
    Pbsm { a: PathBuf, b: PathBuf },
    /// Nested-loop spatial join
    Naive { a: PathBuf, b: PathBuf },
    /// Skyline of lower-left corners
    Skyline { file: PathBuf },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gridquery=info,gridquery_cli=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let mut session = Session::new(config).context("invalid configuration")?;
    let include_stats = session.config().include_stats;
    let output = args.output.as_deref();

    match args.command {
        Command::Generate {
            file,
            count,
            label,
            seed,
        } => {
            let generator = session
                .generator()?
                .with_optional_seed(seed.or(session.config().seed));
            let rects = generator
                .generate_to_path(&file, count, label.as_deref())
                .with_context(|| format!("failed to generate {}", file.display()))?;
            info!("Generated {} rectangles into {}", rects.len(), file.display());
        }
        Command::LinearScan(query) => {
            let flat = session
                .load_flat(&query.file)
                .with_context(|| format!("failed to load {}", query.file.display()))?;
            report_load(&query.file, &flat.report);
            let (neighbors, stats) = LinearScan::new(&flat.rects).knn(query.x, query.y, query.k)?;
            export::write_neighbors(&mut io::stdout().lock(), &neighbors, Some(&stats))?;
            if let Some(path) = output {
                let stats = include_stats.then_some(&stats);
                export::export_neighbors_to_path(path, &neighbors, stats)?;
            }
        }
        Command::Knn(query) => {
            load_into(&mut session, &query.file, DEFAULT_LABEL)?;
            let (neighbors, stats) =
                GridKnn::new(session.grid(), DEFAULT_LABEL).knn(query.x, query.y, query.k)?;
            export::write_neighbors(&mut io::stdout().lock(), &neighbors, Some(&stats))?;
            if let Some(path) = output {
                let stats = include_stats.then_some(&stats);
                export::export_neighbors_to_path(path, &neighbors, stats)?;
            }
        }
        Command::Pbsm { a, b } => {
            load_into(&mut session, &a, "A")?;
            load_into(&mut session, &b, "B")?;
            let (pairs, stats) = PbsmJoin::new(session.grid()).execute();
            export::write_pairs(&mut io::stdout().lock(), &pairs, Some(&stats))?;
            if let Some(path) = output {
                let stats = include_stats.then_some(&stats);
                export::export_pairs_to_path(path, &pairs, stats)?;
            }
        }
        Command::Naive { a, b } => {
            let left = session
                .load_flat(&a)
                .with_context(|| format!("failed to load {}", a.display()))?;
            report_load(&a, &left.report);
            let right = session
                .load_flat(&b)
                .with_context(|| format!("failed to load {}", b.display()))?;
            report_load(&b, &right.report);

            let (pairs, stats) = NaiveSpatialJoin::new(&left.rects, &right.rects).execute();
            export::write_pairs(&mut io::stdout().lock(), &pairs, Some(&stats))?;
            if let Some(path) = output {
                let stats = include_stats.then_some(&stats);
                export::export_pairs_to_path(path, &pairs, stats)?;
            }
        }
        Command::Skyline { file } => {
            load_into(&mut session, &file, DEFAULT_LABEL)?;
            let (skyline, stats) = SkylineQuery::new(session.grid(), DEFAULT_LABEL).run();
            export::write_skyline(&mut io::stdout().lock(), &skyline, Some(&stats))?;
            if let Some(path) = output {
                let stats = include_stats.then_some(&stats);
                export::export_skyline_to_path(path, &skyline, stats)?;
            }
        }
    }

    io::stdout().flush()?;
    Ok(())
}

/// Config file first, then command-line overrides.
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => read_config_file(path)?,
        None => Config::default(),
    };

    let bounds = &mut config.bounds;
    for (value, field) in [
        (args.xl, &mut bounds.xl),
        (args.yl, &mut bounds.yl),
        (args.xu, &mut bounds.xu),
        (args.yu, &mut bounds.yu),
    ] {
        if let Some(value) = value {
            *field = value;
        }
    }
    if let Some(partitions) = args.partitions {
        config.partitions = partitions;
    }
    if args.lenient {
        config.load_policy = LoadPolicy::Lenient;
    }
    if args.no_stats {
        config.include_stats = false;
    }
    Ok(config)
}

fn read_config_file(path: &Path) -> anyhow::Result<Config> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    info!("Using configuration from {}", path.display());

    if path.extension().is_some_and(|ext| ext == "toml") {
        #[cfg(feature = "toml")]
        {
            return Config::from_toml(&text)
                .with_context(|| format!("invalid config {}", path.display()));
        }
        #[cfg(not(feature = "toml"))]
        {
            bail!(
                "{} is a TOML config; rebuild with the `toml` feature or use JSON",
                path.display()
            );
        }
    }

    Config::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn load_into(session: &mut Session, path: &Path, label: &str) -> anyhow::Result<()> {
    let report = session
        .load_path(path, label)
        .with_context(|| format!("failed to load {} as '{}'", path.display(), label))?;
    report_load(path, &report);
    Ok(())
}

fn report_load(path: &Path, report: &LoadReport) {
    if report.skipped() > 0 {
        warn!(
            "{}: skipped {} malformed and {} duplicate rows",
            path.display(),
            report.malformed,
            report.duplicates
        );
        for issue in &report.issues {
            warn!("  line {}: {} ({})", issue.line, issue.reason, issue.value);
        }
    }
    if report.loaded == 0 {
        warn!("{}: no rectangles loaded", path.display());
    }
}
