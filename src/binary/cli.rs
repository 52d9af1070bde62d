//! Command-line parsing for binec.
//!
//! Arguments are validated once here and turned into an [`Options`] value
//! that the codec receives by value.

use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

use super::core::EncodeOptions;
use super::error::BinecError;

#[derive(Parser, Debug)]
#[command(name = "binec", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Decode the text from FILE
    #[arg(short = 'd', long = "decode")]
    decode: bool,

    /// When encoding, insert DELIM between each encoded byte
    #[arg(long = "delim", value_name = "DELIM")]
    delim: Option<OsString>,

    /// Print a newline every NUM encoded bytes
    #[arg(short = 'n', long = "newline-interval", value_name = "NUM")]
    interval: Option<NonZeroUsize>,

    /// Never print newlines; overrides -n
    #[arg(short = 'e', long = "exclude-newlines")]
    exclude_newlines: bool,

    /// Print version information
    #[arg(long = "version")]
    version: bool,

    /// File to process (reads stdin if omitted)
    file: Option<PathBuf>,
}

/// Whether the input is turned into binary digits or back into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encode,
    Decode,
}

/// Where input bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

/// A fully validated invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub mode: Mode,
    pub encode: EncodeOptions,
    pub input: Input,
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Run(Options),
    Help,
    Version,
}

/// Usage text shown for `--help` and for any malformed invocation.
pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--decode] [--delim DELIM] [-neh] [FILE]\n\n\
         Either encodes or decodes the file into or out of binary represented in ASCII.\n\
         When FILE is not specified, it defaults to STDIN.\n\n\
         \x20   -d  --decode                Decodes the text from file.\n\
         \x20       --delim DELIM           When encoding, this inserts a specified\n\
         \x20                               delimiter between each encoded byte.\n\
         \x20   -n  --newline-interval NUM  Prints a newline every NUM encoded bytes\n\
         \x20                               (default 8).\n\
         \x20   -e  --exclude-newlines      Makes it so that it doesn't print newlines\n\
         \x20                               between bytes or at the end. Overrides\n\
         \x20                               the -n argument.\n\
         \x20   -h  --help                  Prints this message.\n\
         \x20       --version               Prints version information.\n"
    )
}

/// Flags accepted on the command line, each exactly once and never bundled.
const FLAGS: &[&[u8]] = &[
    b"-d",
    b"--decode",
    b"--delim",
    b"-n",
    b"--newline-interval",
    b"-e",
    b"--exclude-newlines",
    b"--version",
];

/// Flags that consume the following argument as their value.
const TAKES_VALUE: &[&[u8]] = &[b"--delim", b"-n", b"--newline-interval"];

/// Canonical spelling of a flag, so `-d` and `--decode` count as one.
fn canonical(flag: &[u8]) -> &[u8] {
    match flag {
        b"-d" => b"--decode",
        b"-n" => b"--newline-interval",
        b"-e" => b"--exclude-newlines",
        other => other,
    }
}

/// Walk the arguments in order the way the tool always has, before clap
/// builds typed values from them.
///
/// Anything starting with `-` must be one of [`FLAGS`] spelled out in full
/// (no bundling, no `--opt=value`, no bare `-` or `--`). A value for
/// `--delim` or `-n` may not start with `-`. `-h`/`--help` stops the walk
/// and wins, but only if no earlier argument was already malformed.
fn scan(args: &[OsString]) -> Result<bool, BinecError> {
    let mut seen: Vec<&[u8]> = Vec::new();
    let mut pending: Option<&[u8]> = None;
    let mut positionals = 0;

    for arg in args {
        let bytes = arg.as_encoded_bytes();
        if bytes.starts_with(b"-") {
            if bytes == b"-h" || bytes == b"--help" {
                return Ok(true);
            }
            if let Some(flag) = pending {
                return Err(BinecError::Usage(format!(
                    "option '{}' needs a value",
                    String::from_utf8_lossy(flag)
                )));
            }
            if !FLAGS.contains(&bytes) {
                return Err(BinecError::Usage(format!(
                    "unrecognized option '{}'",
                    arg.to_string_lossy()
                )));
            }
            let name = canonical(bytes);
            if seen.contains(&name) {
                return Err(BinecError::Usage(format!(
                    "option '{}' given more than once",
                    String::from_utf8_lossy(name)
                )));
            }
            seen.push(name);
            if TAKES_VALUE.contains(&bytes) {
                pending = Some(bytes);
            }
        } else if pending.take().is_none() {
            positionals += 1;
            if positionals > 1 {
                return Err(BinecError::Usage(format!(
                    "unexpected extra file '{}'",
                    arg.to_string_lossy()
                )));
            }
        }
    }

    match pending {
        Some(flag) => Err(BinecError::Usage(format!(
            "option '{}' needs a value",
            String::from_utf8_lossy(flag)
        ))),
        None => Ok(false),
    }
}

/// Parse the arguments that follow the program name.
pub fn parse_args<I, T>(args: I) -> Result<Parsed, BinecError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if scan(&args)? {
        return Ok(Parsed::Help);
    }

    let cli = Cli::try_parse_from(std::iter::once(OsString::from("binec")).chain(args))
        .map_err(|e| BinecError::Usage(first_line(&e.to_string())))?;
    log::debug!("parsed arguments: {cli:?}");

    if cli.version {
        return Ok(Parsed::Version);
    }

    let mut encode = EncodeOptions::default();
    if let Some(delim) = cli.delim {
        encode.delimiter = delim.into_encoded_bytes();
    }
    if let Some(interval) = cli.interval {
        encode.interval = interval;
    }
    encode.newlines = !cli.exclude_newlines;

    let input = match cli.file {
        Some(path) => Input::File(path),
        None => Input::Stdin,
    };

    Ok(Parsed::Run(Options {
        mode: if cli.decode { Mode::Decode } else { Mode::Encode },
        encode,
        input,
    }))
}

fn first_line(msg: &str) -> String {
    let line = msg.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}
