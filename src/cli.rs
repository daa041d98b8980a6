// Command-line interface for digirle.
//
// Explicit subcommands with long-form options. Every command is a thin
// wrapper over `io`, `rle::inspect` and `shell`; none of them keep codec
// state between invocations.

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::io::{self as fileio, Direction, FileOptions, FileStats, IoError};
use crate::rle::{self, DecodeOptions, FRAME_MAGIC, FrameOptions, MAX_COUNT};
use crate::shell::Shell;

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Digit-count run-length encoder/decoder.
#[derive(Parser, Debug)]
#[command(
    name = "digirle",
    version,
    about = "Digit-count run-length encoder/decoder",
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

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run-length encode an input file.
    Compress(CompressArgs),
    /// Decode a token stream or framed file.
    Decompress(DecompressArgs),
    /// Print format, token and size information about a file.
    Inspect(InspectArgs),
    /// Print build/configuration details.
    Config,
    /// Interactive compress/decompress loop on stdin/stdout.
    Shell,
}

#[derive(Args, Debug)]
struct CompressArgs {
    /// Input file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Check/compute only (do not write output).
    #[arg(long = "check-only")]
    no_output: bool,

    /// Wrap the token stream in a tagged frame.
    #[arg(long)]
    frame: bool,

    /// Omit the Adler-32 from the frame.
    #[arg(long = "no-checksum", requires = "frame")]
    no_checksum: bool,

    /// Compress even if the input already looks encoded.
    #[arg(long = "no-guard")]
    no_guard: bool,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecompressArgs {
    /// Input file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Check/compute only (do not write output).
    #[arg(long = "check-only")]
    no_output: bool,

    /// Reject '0' counts in bare token streams.
    #[arg(long)]
    strict: bool,

    /// Decompress even if the input looks plain.
    #[arg(long = "no-guard")]
    no_guard: bool,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// File to inspect.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Compress,
    Decompress,
    Inspect,
    Config,
    Shell,
}

#[derive(Debug)]
struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    no_output: bool,
    frame: bool,
    checksum: bool,
    strict: bool,
    guard: bool,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

fn resolve_options(cli: Cli) -> Options {
    let Cli {
        command,
        force,
        quiet,
        verbose,
        json_output,
    } = cli;

    let base = |command: Command| Options {
        command,
        use_stdout: false,
        force,
        quiet,
        verbose: verbose.min(2),
        json_output,
        no_output: false,
        frame: false,
        checksum: true,
        strict: false,
        guard: true,
        input_file: None,
        output_file: None,
    };

    match command {
        Cmd::Compress(args) => Options {
            use_stdout: args.stdout,
            no_output: args.no_output,
            frame: args.frame,
            checksum: !args.no_checksum,
            guard: !args.no_guard,
            input_file: args.input.or(args.input_pos),
            output_file: args.output.or(args.output_pos),
            ..base(Command::Compress)
        },
        Cmd::Decompress(args) => Options {
            use_stdout: args.stdout,
            no_output: args.no_output,
            strict: args.strict,
            guard: !args.no_guard,
            input_file: args.input.or(args.input_pos),
            output_file: args.output.or(args.output_pos),
            ..base(Command::Decompress)
        },
        Cmd::Inspect(args) => Options {
            input_file: Some(args.input),
            ..base(Command::Inspect)
        },
        Cmd::Config => base(Command::Config),
        Cmd::Shell => base(Command::Shell),
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("digirle".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let opts = resolve_options(cli);
        let _ = build_file_options(&opts);
    }
}

fn build_file_options(opts: &Options) -> FileOptions {
    FileOptions {
        frame: opts.frame.then_some(FrameOptions {
            checksum: opts.checksum,
        }),
        decode: if opts.strict {
            DecodeOptions::strict()
        } else {
            DecodeOptions::default()
        },
        guard: opts.guard,
        overwrite: opts.force,
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("digirle version {version} (Rust)");

    let adler32 = cfg!(feature = "adler32") as u8;
    let file_io = cfg!(feature = "file-io") as u8;

    eprintln!("ADLER32={adler32}");
    eprintln!("FILE_IO={file_io}");
    eprintln!("MAX_COUNT={MAX_COUNT}");
    eprintln!("FRAME_MAGIC={}", hex(&FRAME_MAGIC));

    0
}

// ---------------------------------------------------------------------------
// Compress / decompress commands
// ---------------------------------------------------------------------------

fn read_input(opts: &Options) -> Result<Vec<u8>, String> {
    match &opts.input_file {
        Some(path) => fs::read(path).map_err(|e| format!("input file: {}: {e}", path.display())),
        None => {
            let mut data = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut data)
                .map_err(|e| format!("read error: {e}"))?;
            Ok(data)
        }
    }
}

fn output_error(path: &Path, err: IoError) -> String {
    match err {
        IoError::OutputExists(p) => {
            format!("output file exists, use -f to overwrite: {}", p.display())
        }
        other => format!("output file: {}: {other}", path.display()),
    }
}

fn write_result(opts: &Options, data: &[u8]) -> Result<(), String> {
    if opts.no_output {
        return Ok(());
    }
    match (&opts.output_file, opts.use_stdout) {
        (Some(path), false) => {
            let written = fileio::write_output(path, data, opts.force);
            written.map_err(|e| output_error(path, e))
        }
        _ => {
            let mut out = BufWriter::with_capacity(BUF_SIZE, io::stdout().lock());
            out.write_all(data)
                .and_then(|()| out.flush())
                .map_err(|e| format!("write error: {e}"))
        }
    }
}

fn report_stats(opts: &Options, stats: &FileStats) {
    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "digirle: {}: input size: {}, output size: {}, tokens: {}, framed: {}",
            stats.direction.name(),
            stats.input_size,
            stats.output_size,
            stats.tokens,
            stats.framed
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": stats.direction.name(),
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "tokens": stats.tokens,
            "framed": stats.framed,
            "raw_sha256": stats.raw_sha256.map(|h| hex(&h)),
        });
        eprintln!("{json:#}");
    }
}

fn cmd_transform(direction: Direction, opts: &Options) -> i32 {
    let input = match read_input(opts) {
        Ok(data) => data,
        Err(msg) => {
            eprintln!("digirle: {msg}");
            return 1;
        }
    };

    let file_opts = build_file_options(opts);
    let result = match direction {
        Direction::Compress => fileio::compress_bytes(&input, &file_opts),
        Direction::Decompress => fileio::decompress_bytes(&input, &file_opts),
    };
    let (output, stats) = match result {
        Ok(r) => r,
        Err(e @ (IoError::AlreadyEncoded(_) | IoError::NotEncoded)) => {
            eprintln!(
                "digirle: {}: {e} (use --no-guard to override)",
                direction.name()
            );
            return 1;
        }
        Err(e) => {
            eprintln!("digirle: {}: {e}", direction.name());
            return 1;
        }
    };

    if let Err(msg) = write_result(opts, &output) {
        eprintln!("digirle: {msg}");
        return 1;
    }
    report_stats(opts, &stats);
    0
}

// ---------------------------------------------------------------------------
// Inspect command
// ---------------------------------------------------------------------------

fn cmd_inspect(opts: &Options) -> i32 {
    let Some(path) = &opts.input_file else {
        eprintln!("digirle: inspect requires an input file");
        return 1;
    };
    let data = match fs::read(path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("digirle: {}: {e}", path.display());
            return 1;
        }
    };

    let report = rle::inspect(&data);
    let yes_no = |b: bool| if b { "yes" } else { "no" };

    println!("format:             {}", report.format);
    println!("size:               {}", report.len);
    if let Some(hdr) = &report.header {
        println!("frame raw length:   {}", hdr.raw_len);
        match hdr.adler32 {
            Some(cksum) => println!("frame adler32:      {cksum:08X}"),
            None => println!("frame adler32:      none"),
        }
    }
    println!("tokens:             {}", report.token_count());
    println!("well-formed:        {}", yes_no(report.well_formed));
    println!(
        "looks encoded:      {} (digit heuristic)",
        yes_no(rle::looks_encoded(&data))
    );
    match &report.decoded {
        Ok(n) => println!("decoded size:       {n}"),
        Err(e) => println!("decoded size:       invalid ({e})"),
    }
    if let Some(ratio) = report.ratio() {
        println!("ratio:              {ratio:.3}");
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "inspect",
            "format": report.format.name(),
            "size": report.len,
            "framed": report.header.is_some(),
            "tokens": report.token_count(),
            "well_formed": report.well_formed,
            "decoded_size": report.decoded.as_ref().ok(),
            "error": report.decoded.as_ref().err(),
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Shell command
// ---------------------------------------------------------------------------

fn cmd_shell(opts: &Options) -> i32 {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(stdin.lock(), stdout.lock(), build_file_options(opts));
    match shell.run() {
        Ok(summary) => {
            if opts.verbose > 0 && !opts.quiet {
                eprintln!(
                    "digirle: shell: succeeded: {}, failed: {}, invalid choices: {}",
                    summary.succeeded, summary.failed, summary.invalid_choices
                );
            }
            0
        }
        Err(e) => {
            eprintln!("digirle: shell: {e}");
            1
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    let default_filter = match opts.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    // Warn if -c overrides output filename.
    if opts.use_stdout
        && let Some(path) = opts.output_file.take()
        && !opts.quiet
    {
        eprintln!(
            "digirle: warning: -c option overrides output filename: {}",
            path.display()
        );
    }

    let exit_code = match opts.command {
        Command::Compress => cmd_transform(Direction::Compress, &opts),
        Command::Decompress => cmd_transform(Direction::Decompress, &opts),
        Command::Inspect => cmd_inspect(&opts),
        Command::Config => cmd_config(),
        Command::Shell => cmd_shell(&opts),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rle::ZeroCount;

    fn parse_opts(args: &[&str]) -> Options {
        let argv: Vec<String> = std::iter::once("digirle".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        let cli = Cli::try_parse_from(argv).expect("cli parse failed");
        resolve_options(cli)
    }

    fn parse_fails(args: &[&str]) -> bool {
        let argv = std::iter::once("digirle").chain(args.iter().copied());
        Cli::try_parse_from(argv).is_err()
    }

    #[test]
    fn compress_subcommand_maps_correctly() {
        let opts = parse_opts(&["compress", "--frame", "--no-guard", "in.txt", "out.rle"]);
        assert_eq!(opts.command, Command::Compress);
        assert!(opts.frame);
        assert!(opts.checksum);
        assert!(!opts.guard);
        assert_eq!(opts.input_file, Some(PathBuf::from("in.txt")));
        assert_eq!(opts.output_file, Some(PathBuf::from("out.rle")));
    }

    #[test]
    fn decompress_subcommand_maps_correctly() {
        let opts = parse_opts(&[
            "--quiet",
            "decompress",
            "--strict",
            "--check-only",
            "--input",
            "in.rle",
        ]);
        assert_eq!(opts.command, Command::Decompress);
        assert!(opts.strict);
        assert!(opts.no_output);
        assert!(opts.quiet);
        assert!(opts.guard);
        assert_eq!(opts.input_file, Some(PathBuf::from("in.rle")));
        assert_eq!(opts.output_file, None);
    }

    #[test]
    fn global_stdio_and_force_flags() {
        let opts = parse_opts(&["--force", "compress", "--stdout", "in", "out"]);
        assert!(opts.use_stdout);
        assert!(opts.force);
    }

    #[test]
    fn verbose_is_capped() {
        let verbose = parse_opts(&["-vvv", "compress", "in", "out"]);
        assert_eq!(verbose.verbose, 2);
    }

    #[test]
    fn no_checksum_requires_frame() {
        assert!(parse_fails(&["compress", "--no-checksum", "in", "out"]));
        let opts = parse_opts(&["compress", "--frame", "--no-checksum", "in", "out"]);
        assert!(!opts.checksum);
    }

    #[test]
    fn input_flag_conflicts_with_positional() {
        assert!(parse_fails(&["compress", "--input", "a", "b"]));
        assert!(parse_fails(&["--quiet", "--verbose", "config"]));
    }

    #[test]
    fn other_commands_map() {
        assert_eq!(parse_opts(&["config"]).command, Command::Config);
        assert_eq!(parse_opts(&["shell"]).command, Command::Shell);
        let inspect = parse_opts(&["inspect", "file.rle"]);
        assert_eq!(inspect.command, Command::Inspect);
        assert_eq!(inspect.input_file, Some(PathBuf::from("file.rle")));
    }

    #[test]
    fn file_options_mapping() {
        let c = build_file_options(&parse_opts(&[
            "-f",
            "compress",
            "--frame",
            "--no-checksum",
            "in",
            "out",
        ]));
        assert_eq!(c.frame, Some(FrameOptions { checksum: false }));
        assert!(c.overwrite);
        assert!(c.guard);

        let d = build_file_options(&parse_opts(&["decompress", "--strict", "in", "out"]));
        assert_eq!(d.frame, None);
        assert_eq!(d.decode.zero_count, ZeroCount::Reject);
        assert!(!d.overwrite);
    }

    #[test]
    fn fuzz_entry_tolerates_garbage() {
        fuzz_try_parse_args(&["--bogus".to_string()]);
        fuzz_try_parse_args(&["compress".to_string(), "--frame".to_string()]);
    }

    #[test]
    fn hex_formats_lowercase() {
        assert_eq!(hex(&FRAME_MAGIC), "d2ccc500");
    }
}
