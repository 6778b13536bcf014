//! dirpatch - reconcile two directory trees into a patch report.
//!
//! Usage:
//!   dirpatch <DIR_A> <DIR_B>            Write reference.patch (SHA-256)
//!   dirpatch --md5 -u <DIR_A> <DIR_B>   MD5, hide unchanged entries
//!   dirpatch -f json -o out.json A B    JSON report
//!   dirpatch --help                     Show help

use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};

use clap::{ArgAction, ArgGroup, Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use dirpatch_reconcile::{
    DEFAULT_PATCH_FILE, PatchFormat, PatchSet, PatchWriter, ReconcileConfig, Reconciler,
    TimestampZone,
};
use dirpatch_scan::{FingerprintKind, ScanConfig, ScanResult, TreeScanner};

#[derive(Parser)]
#[command(
    name = "dirpatch",
    version,
    about = "Reconcile two directory trees into a deterministic patch report",
    long_about = "dirpatch scans two directories, fingerprints every file and writes a \
                  report listing, for each directory, the files it is missing (+), the \
                  files it shares unchanged (=) and the files that differ (!).\n\n\
                  At most one fingerprint flag may be given; SHA-256 is the default."
)]
#[command(group(ArgGroup::new("fingerprint").multiple(false)))]
struct Cli {
    /// First directory to reconcile
    dir_a: String,

    /// Second directory to reconcile
    dir_b: String,

    /// MD5 hash
    #[arg(long, group = "fingerprint")]
    md5: bool,

    /// SHA-1 hash
    #[arg(long, group = "fingerprint")]
    sha1: bool,

    /// SHA-256 hash (default)
    #[arg(long, visible_alias = "sha2", group = "fingerprint")]
    sha256: bool,

    /// BLAKE3 hash
    #[arg(long, group = "fingerprint")]
    blake3: bool,

    /// Adler-32 checksum
    #[arg(long, group = "fingerprint")]
    adler32: bool,

    /// CRC-32 checksum
    #[arg(long, visible_alias = "crc32", group = "fingerprint")]
    crc: bool,

    /// Leave unchanged files out of the report
    #[arg(short = 'u', long)]
    ignore_unchanged: bool,

    /// Report file
    #[arg(short, long, default_value = DEFAULT_PATCH_FILE)]
    output: PathBuf,

    /// Report format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Render timestamps in UTC instead of local time
    #[arg(long)]
    utc: bool,

    /// Treat modification times closer than this many seconds as equal
    #[arg(long, value_name = "SECS", default_value = "0", value_parser = parse_tolerance)]
    mtime_tolerance: Duration,

    /// Hashing threads per directory (0 = one per core)
    #[arg(short = 'j', long, default_value = "0")]
    threads: usize,

    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    /// The selected fingerprint. The argument group allows at most one flag.
    fn fingerprint(&self) -> FingerprintKind {
        [
            (self.md5, FingerprintKind::Md5),
            (self.sha1, FingerprintKind::Sha1),
            (self.sha256, FingerprintKind::Sha256),
            (self.blake3, FingerprintKind::Blake3),
            (self.adler32, FingerprintKind::Adler32),
            (self.crc, FingerprintKind::Crc32),
        ]
        .into_iter()
        .find_map(|(selected, kind)| selected.then_some(kind))
        .unwrap_or_default()
    }

    fn patch_writer(&self) -> PatchWriter {
        let format = match self.format {
            OutputFormat::Text => PatchFormat::Text,
            OutputFormat::Json => PatchFormat::Json,
        };
        let zone = if self.utc {
            TimestampZone::Utc
        } else {
            TimestampZone::Local
        };

        PatchWriter::new()
            .with_ignore_unchanged(self.ignore_unchanged)
            .with_zone(zone)
            .with_format(format)
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    run(&cli)
}

/// Scan both trees, reconcile them and write the report.
fn run(cli: &Cli) -> Result<()> {
    let fingerprint = cli.fingerprint();
    let config_a = ScanConfig::builder()
        .root(&cli.dir_a)
        .fingerprint(fingerprint)
        .threads(cli.threads)
        .build()
        .context("Invalid scan configuration")?;
    let config_b = config_a.with_root(&cli.dir_b);
    debug!(?config_a, ?config_b, tolerance = ?cli.mtime_tolerance, "Configuration");

    eprintln!(
        "Reconciling '{}' and '{}' ({fingerprint})...",
        cli.dir_a, cli.dir_b
    );
    let start = Instant::now();

    let (scan_a, scan_b) = TreeScanner::new()
        .scan_pair(&config_a, &config_b)
        .context("Scan failed")?;

    let reconciler = Reconciler::with_config(ReconcileConfig {
        mtime_tolerance: cli.mtime_tolerance,
    });
    let outcome = reconciler
        .reconcile(&scan_a, &scan_b)
        .context("Reconciliation failed")?;

    cli.patch_writer()
        .write(
            &cli.output,
            &cli.dir_a,
            &cli.dir_b,
            &outcome,
            SystemTime::now(),
        )
        .with_context(|| format!("Cannot write report to {}", cli.output.display()))?;

    eprintln!();
    print_side(&cli.dir_a, &scan_a, &outcome.a);
    print_side(&cli.dir_b, &scan_b, &outcome.b);
    eprintln!();
    eprintln!(
        "Wrote {} in {:.2}s",
        cli.output.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Print one directory's counts.
fn print_side(label: &str, scan: &ScanResult, patch: &PatchSet<'_>) {
    let summary = patch.summary();
    eprintln!(
        " {label}: {} files, {}  (+{} ={} !{})",
        scan.len(),
        format_size(scan.total_size()),
        summary.added,
        summary.unchanged,
        summary.conflict
    );
}

/// Install a stderr subscriber filtered by RUST_LOG or the verbosity flag.
fn init_logging(verbosity: u8) -> Result<()> {
    let fallback = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()?;

    Ok(())
}

/// Parse a non-negative number of seconds.
fn parse_tolerance(s: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid number of seconds '{s}': {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid tolerance '{s}': {e}"))
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
