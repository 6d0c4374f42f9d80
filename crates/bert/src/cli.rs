//! Core logic behind the `bert-unpack` binary.
//!
//! - `unpack`       decode a BERT message to JSON or Erlang term text
//! - `init_logging` stderr subscriber filtered by `BERT_LOG`

use serde_json::Value;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{BertDecoder, BertError, DecodeOptions};

/// Environment variable holding a `tracing` target filter, e.g.
/// `BERT_LOG=bert=trace`.
pub const LOG_ENV: &str = "BERT_LOG";

#[derive(Debug)]
pub enum CliError {
    Json(serde_json::Error),
    Bert(BertError),
    UnknownFormat(String),
    BadArgument(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Json(e) => write!(f, "{e}"),
            CliError::Bert(e) => write!(f, "{e}"),
            CliError::UnknownFormat(e) => write!(f, "Unknown format: {e}"),
            CliError::BadArgument(e) => write!(f, "Bad argument: {e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<BertError> for CliError {
    fn from(e: BertError) -> Self {
        CliError::Bert(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Term,
}

impl std::str::FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "term" | "erlang" => Ok(OutputFormat::Term),
            other => Err(CliError::UnknownFormat(other.to_string())),
        }
    }
}

/// Decode a BERT message and render it in `format`.
pub fn unpack(bytes: &[u8], format: OutputFormat, options: DecodeOptions) -> Result<String, CliError> {
    let value = BertDecoder::new(options).decode(bytes)?;
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&Value::from(value))?),
        OutputFormat::Term => Ok(value.to_string()),
    }
}

/// Parsed `bert-unpack` command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Args {
    pub format: OutputFormat,
    pub options: DecodeOptions,
}

/// Parse flags following the program name.
pub fn parse_args<I, S>(args: I) -> Result<Args, CliError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_ref() {
            "--format" => {
                let f = args
                    .next()
                    .ok_or_else(|| CliError::BadArgument("--format needs a value".to_string()))?;
                parsed.format = f.as_ref().parse()?;
            }
            "--term" => parsed.format = OutputFormat::Term,
            "--max-depth" => {
                let n = args
                    .next()
                    .ok_or_else(|| CliError::BadArgument("--max-depth needs a value".to_string()))?;
                let depth = n
                    .as_ref()
                    .parse::<usize>()
                    .map_err(|_| CliError::BadArgument(format!("--max-depth {}", n.as_ref())))?;
                parsed.options = parsed.options.with_max_depth(depth);
            }
            "--max-atoms" => {
                let n = args
                    .next()
                    .ok_or_else(|| CliError::BadArgument("--max-atoms needs a value".to_string()))?;
                let limit = n
                    .as_ref()
                    .parse::<usize>()
                    .map_err(|_| CliError::BadArgument(format!("--max-atoms {}", n.as_ref())))?;
                parsed.options = parsed.options.with_max_atoms(limit);
            }
            "--no-intern" => parsed.options = parsed.options.with_intern_atoms(false),
            other => return Err(CliError::BadArgument(other.to_string())),
        }
    }
    Ok(parsed)
}

/// Install a stderr `fmt` subscriber. The filter comes from [`LOG_ENV`] and
/// defaults to `warn`. Does nothing if a subscriber is already set.
pub fn init_logging() {
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|s| s.parse::<Targets>().ok())
        .unwrap_or_else(|| Targets::new().with_default(tracing::Level::WARN));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    const BERT_TRUE: [u8; 17] = [
        131, 104, 2, 100, 0, 4, b'b', b'e', b'r', b't', 100, 0, 4, b't', b'r', b'u', b'e',
    ];

    #[test]
    fn unpack_renders_json_and_terms() {
        let json = unpack(&BERT_TRUE, OutputFormat::Json, DecodeOptions::default()).unwrap();
        assert_eq!(json, "true");
        let term = unpack(&BERT_TRUE, OutputFormat::Term, DecodeOptions::default()).unwrap();
        assert_eq!(term, "{bert,true}");
    }

    #[test]
    fn unpack_reports_decode_errors() {
        let err = unpack(&[200], OutputFormat::Json, DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, CliError::Bert(BertError::InvalidMagic(200))));
        assert_eq!(err.to_string(), "invalid magic value (200) for BERT string");
    }

    #[test]
    fn parses_flags() {
        let args = parse_args([
            "--format", "term", "--max-depth", "8", "--max-atoms", "16", "--no-intern",
        ])
        .unwrap();
        assert_eq!(args.format, OutputFormat::Term);
        assert_eq!(args.options.max_depth, 8);
        assert_eq!(args.options.max_atoms, 16);
        assert!(!args.options.intern_atoms);

        assert_eq!(parse_args(Vec::<String>::new()).unwrap(), Args::default());
    }

    #[test]
    fn rejects_bad_flags() {
        assert!(matches!(parse_args(["--format", "xml"]), Err(CliError::UnknownFormat(_))));
        assert!(matches!(parse_args(["--max-depth", "deep"]), Err(CliError::BadArgument(_))));
        assert!(matches!(parse_args(["--max-depth"]), Err(CliError::BadArgument(_))));
        assert!(matches!(parse_args(["extra"]), Err(CliError::BadArgument(_))));
    }
}
