//! `bert-unpack`: decode a BERT message (stdin) to JSON or Erlang terms (stdout).
//!
//! Usage:
//!   bert-unpack [--format json|term] [--term] [--max-depth N] [--max-atoms N] [--no-intern]
//!
//! Set `BERT_LOG` (e.g. `BERT_LOG=bert=trace`) to see decoder logs on stderr.

use std::io::{self, Read, Write};

use bert::cli::{init_logging, parse_args, unpack};

fn main() {
    init_logging();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let mut buf = Vec::new();
    if let Err(e) = io::stdin().read_to_end(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match unpack(&buf, args.format, args.options) {
        Ok(text) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{text}") {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "decode failed");
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
