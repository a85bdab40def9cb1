// Idiomatic Rust CLI for pkcarve.
//
// Uses explicit subcommands and long-form options around the
// extract/patch engines and the file helpers in `io`.

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use log::LevelFilter;

use crate::engine;
use crate::entry::KindHint;
use crate::io::{self, IoError};

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

const EXIT_OK: i32 = 0;
const EXIT_ERROR: i32 = 1;
/// `patch` ran but no entry was written.
const EXIT_UNCHANGED: i32 = 2;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Locate, extract and patch WebP/Ogg assets in index-less .pk archives.
#[derive(Parser, Debug)]
#[command(
    name = "pkcarve",
    version,
    about = "WebP/Ogg asset extractor and patcher for .pk archives",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output listings and stats as JSON.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List the assets found in an archive.
    List(ListArgs),
    /// Write every asset of an archive into a folder.
    Extract(ExtractArgs),
    /// Overwrite assets in an archive with same-named files from a folder.
    Patch(PatchArgs),
    /// Print build/configuration details.
    Config,
}

/// Which scanner(s) to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    /// Infer from the archive file name (`*tx.pk` images, other `*.pk` audio).
    Auto,
    /// WebP images only.
    Image,
    /// Ogg audio only.
    Audio,
    /// Scan for both formats.
    Unknown,
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Asset kind to scan for.
    #[arg(long, short = 'k', value_enum, default_value_t = KindArg::Auto)]
    kind: KindArg,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Archive to scan.
    #[arg(value_hint = ValueHint::FilePath)]
    archive: PathBuf,

    #[command(flatten)]
    scan: ScanArgs,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Archive to scan.
    #[arg(value_hint = ValueHint::FilePath)]
    archive: PathBuf,

    /// Output folder (created if missing).
    #[arg(value_hint = ValueHint::DirPath)]
    output_dir: PathBuf,

    #[command(flatten)]
    scan: ScanArgs,
}

#[derive(Args, Debug)]
struct PatchArgs {
    /// Original archive.
    #[arg(value_hint = ValueHint::FilePath)]
    archive: PathBuf,

    /// Folder of replacement files named like the extracted entries.
    #[arg(value_hint = ValueHint::DirPath)]
    replacements: PathBuf,

    /// Patched archive to write.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,

    #[command(flatten)]
    scan: ScanArgs,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    List,
    Extract,
    Patch,
    Config,
}

struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    kind: KindArg,
    archive: Option<PathBuf>,
    dir: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

fn resolve_options(cli: Cli) -> Options {
    let base = |command| Options {
        command,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        kind: KindArg::Auto,
        archive: None,
        dir: None,
        output_file: None,
    };

    match cli.command {
        Cmd::List(args) => Options {
            kind: args.scan.kind,
            archive: Some(args.archive),
            ..base(Command::List)
        },
        Cmd::Extract(args) => Options {
            kind: args.scan.kind,
            archive: Some(args.archive),
            dir: Some(args.output_dir),
            ..base(Command::Extract)
        },
        Cmd::Patch(args) => Options {
            kind: args.scan.kind,
            archive: Some(args.archive),
            dir: Some(args.replacements),
            output_file: Some(args.output),
            ..base(Command::Patch)
        },
        Cmd::Config => base(Command::Config),
    }
}

fn kind_hint(kind: KindArg, archive: &Path) -> KindHint {
    match kind {
        KindArg::Auto => io::infer_kind_hint(archive),
        KindArg::Image => KindHint::Image,
        KindArg::Audio => KindHint::Audio,
        KindArg::Unknown => KindHint::Unknown,
    }
}

fn log_level(opts: &Options) -> LevelFilter {
    if opts.quiet {
        return LevelFilter::Error;
    }
    match opts.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn hex_digest(digest: Option<[u8; 32]>) -> Option<String> {
    digest.map(hex::encode)
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("pkcarve".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("pkcarve version {version} (Rust)");

    let file_io = cfg!(feature = "file-io") as u8;
    let parallel = cfg!(feature = "parallel") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("FILE_IO={file_io}");
    eprintln!("PARALLEL={parallel}");
    eprintln!("FORMATS=webp,ogg");
    eprintln!("sizeof(usize)={ptr_size}");

    EXIT_OK
}

// ---------------------------------------------------------------------------
// List command
// ---------------------------------------------------------------------------

fn cmd_list(opts: &Options) -> i32 {
    let Some(path) = opts.archive.as_deref() else {
        return EXIT_ERROR;
    };
    let archive = match io::read_archive(path) {
        Ok(a) => a,
        Err(e) => return report_io_error(&e),
    };
    let hint = kind_hint(opts.kind, path);
    let candidates = engine::scan_candidates(archive.as_bytes(), hint);

    if opts.json_output {
        let items: Vec<_> = candidates
            .iter()
            .enumerate()
            .map(|(i, (kind, c))| {
                serde_json::json!({
                    "name": engine::entry_name(*kind, i),
                    "kind": kind.label(),
                    "offset": c.offset,
                    "size": c.size,
                })
            })
            .collect();
        let json = serde_json::json!({
            "archive": path.display().to_string(),
            "archive_size": archive.len(),
            "hint": format!("{hint:?}"),
            "entries": items,
        });
        println!("{}", serde_json::to_string_pretty(&json).unwrap());
        return EXIT_OK;
    }

    for (i, (kind, c)) in candidates.iter().enumerate() {
        println!(
            "{:<20} {:#010X} {:>10} {kind}",
            engine::entry_name(*kind, i),
            c.offset,
            c.size
        );
    }
    if !opts.quiet {
        eprintln!(
            "pkcarve: {} asset(s) in {} ({} bytes, {hint:?})",
            candidates.len(),
            path.display(),
            archive.len()
        );
    }
    EXIT_OK
}

// ---------------------------------------------------------------------------
// Extract command
// ---------------------------------------------------------------------------

fn cmd_extract(opts: &Options) -> i32 {
    let (Some(path), Some(dir)) = (opts.archive.as_deref(), opts.dir.as_deref()) else {
        return EXIT_ERROR;
    };
    let archive = match io::read_archive(path) {
        Ok(a) => a,
        Err(e) => return report_io_error(&e),
    };
    let hint = kind_hint(opts.kind, path);
    let entries = engine::extract(archive.as_bytes(), hint);

    if entries.is_empty() {
        if !opts.quiet {
            eprintln!("pkcarve: no assets found in {}", path.display());
        }
        return EXIT_OK;
    }

    let stats = match io::dump_entries(&entries, dir) {
        Ok(s) => s,
        Err(e) => return report_io_error(&e),
    };

    if !opts.quiet {
        eprintln!(
            "pkcarve: extracted {} asset(s) ({} bytes) to {}",
            stats.files,
            stats.bytes,
            dir.display()
        );
    }
    if opts.json_output {
        let json = serde_json::json!({
            "command": "extract",
            "archive_size": archive.len(),
            "files": stats.files,
            "bytes": stats.bytes,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }
    EXIT_OK
}

// ---------------------------------------------------------------------------
// Patch command
// ---------------------------------------------------------------------------

fn cmd_patch(opts: &Options) -> i32 {
    let (Some(path), Some(dir), Some(output)) = (
        opts.archive.as_deref(),
        opts.dir.as_deref(),
        opts.output_file.as_deref(),
    ) else {
        return EXIT_ERROR;
    };

    if output.exists() && !opts.force {
        eprintln!(
            "pkcarve: output file exists, use -f to overwrite: {}",
            output.display()
        );
        return EXIT_ERROR;
    }

    let hint = kind_hint(opts.kind, path);
    let stats = match io::patch_file(path, dir, output, hint) {
        Ok(s) => s,
        Err(e) => return report_io_error(&e),
    };

    if !opts.quiet {
        for name in &stats.unlocated {
            eprintln!("pkcarve: warning: could not locate {name} in archive");
        }
        for name in &stats.truncated {
            eprintln!("pkcarve: warning: {name} was truncated to fit its original size");
        }
        if stats.written {
            eprintln!(
                "pkcarve: {} modification(s) written to {}",
                stats.modified,
                output.display()
            );
        } else {
            eprintln!("pkcarve: no modifications were found to save");
        }
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "patch",
            "archive_size": stats.archive_size,
            "entries": stats.entries,
            "replacements": stats.replacements,
            "modified": stats.modified,
            "unlocated": stats.unlocated,
            "truncated": stats.truncated,
            "written": stats.written,
            "input_sha256": hex_digest(stats.input_sha256),
            "output_sha256": hex_digest(stats.output_sha256),
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    if stats.written {
        EXIT_OK
    } else {
        EXIT_UNCHANGED
    }
}

fn report_io_error(e: &IoError) -> i32 {
    eprintln!("pkcarve: {e}");
    EXIT_ERROR
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level(&opts).as_str()),
    )
    .format_timestamp(None)
    .format_target(false)
    .init();

    let exit_code = match opts.command {
        Command::List => cmd_list(&opts),
        Command::Extract => cmd_extract(&opts),
        Command::Patch => cmd_patch(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
