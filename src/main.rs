//! ESR Engine CLI
//!
//! Command-line interface for scanning payment-slip code lines and
//! exporting DTA batch files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- scan fragments.txt > decoded.csv
//! cargo run -- scan --format es-iban - < fragments.txt
//! cargo run -- export --iban CH9300762011623852957 \
//!     --address "Max Muster;8000 Zuerich" --execution-day 26 history.csv
//! ```
//!
//! The scan command reads one recognized text fragment per line, feeds
//! them through the incremental validator and prints a decoded CSV row
//! for every completed code. The export command builds the DTA file from
//! a history CSV and writes it into the output directory.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (file not found, invalid sender profile, bad entry, etc.)

use chrono::Local;
use esr_engine::cli::{self, Command};
use esr_engine::core::DtaEncoder;
use std::fs::File;
use std::io::BufReader;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    let result = match &args.command {
        Command::Scan { input, format } => {
            let mut output = std::io::stdout();

            if input.as_os_str() == "-" {
                let stdin = std::io::stdin();
                cli::run_scan(stdin.lock(), (*format).into(), &mut output)
            } else {
                match File::open(input) {
                    Ok(file) => {
                        cli::run_scan(BufReader::new(file), (*format).into(), &mut output)
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
        Command::Export {
            input,
            iban,
            address,
            execution_day,
            output_dir,
        } => {
            let profile = cli::sender_profile(iban, address, *execution_day);
            let encoder = DtaEncoder::new(profile);
            let today = Local::now().date_naive();

            cli::run_export(input, &encoder, output_dir, today).map(|path| {
                println!("{}", path.display());
            })
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
