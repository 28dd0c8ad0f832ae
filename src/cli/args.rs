use crate::types::{CodeFormat, SenderProfile, DEFAULT_EXECUTION_DAY};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Scan, validate and export Swiss payment-slip code lines
#[derive(Parser, Debug)]
#[command(name = "esr-engine")]
#[command(about = "Scan, validate and export Swiss payment-slip code lines", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate recognized text fragments and decode completed codes
    Scan {
        /// Path to a file with one recognized fragment per line, or '-' for stdin
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Code format to scan for
        #[arg(
            long = "format",
            value_name = "FORMAT",
            default_value = "esr",
            help = "Code format: 'esr' for orange slips or 'es-iban' for red slips"
        )]
        format: FormatArg,
    },

    /// Build a DTA batch file from scanned history entries
    Export {
        /// Path to the history CSV file (columns: code,amount,address)
        #[arg(value_name = "HISTORY")]
        input: PathBuf,

        /// Sender IBAN the payments are debited from
        #[arg(long, value_name = "IBAN")]
        iban: String,

        /// Sender address; separate lines with ';'
        #[arg(long, value_name = "ADDRESS")]
        address: String,

        /// Desired day-of-month for execution (rolled forward as needed)
        #[arg(long = "execution-day", value_name = "DAY", default_value_t = DEFAULT_EXECUTION_DAY)]
        execution_day: u8,

        /// Directory the DTA file is written to
        #[arg(long = "output-dir", value_name = "DIR", default_value = ".")]
        output_dir: PathBuf,
    },
}

/// Code format choice on the command line
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    Esr,
    EsIban,
}

impl From<FormatArg> for CodeFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Esr => CodeFormat::Esr,
            FormatArg::EsIban => CodeFormat::EsIban,
        }
    }
}

/// Build a `SenderProfile` from the export arguments
///
/// Semicolons in the address argument become line breaks, so a
/// multi-line address fits into a single shell argument.
pub fn sender_profile(iban: &str, address: &str, execution_day: u8) -> SenderProfile {
    SenderProfile {
        iban: iban.to_string(),
        address: address.replace(';', "\n"),
        execution_day,
    }
}
