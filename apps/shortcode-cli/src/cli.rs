//! CLI argument parsing via clap.

use clap::{Parser, Subcommand};

/// Short-code codec and formatting helpers of the URL Shortener.
///
/// The alphabet comes from SHORTURL_CHARSET or URL_CONVERT (36 or 62).
#[derive(Debug, Parser)]
#[command(name = "shortcode", version)]
pub struct Args {
    /// Print machine-readable JSON instead of plain text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encode link ids as short codes.
    Encode {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Decode short codes back to link ids.
    Decode {
        #[arg(required = true)]
        codes: Vec<String>,
    },
    /// Print the character-class patterns for the configured alphabet.
    Pattern,
    /// Strip characters outside the alphabet from a keyword.
    Sanitize { input: String },
    /// Check whether input is legacy serialized data.
    Sniff {
        input: String,
        /// Accept malformed boolean fragments such as `b:4;`.
        #[arg(long)]
        legacy: bool,
    },
    /// Shorten long text for display.
    Trim {
        text: String,
        /// Maximum length in characters (default: TRIM_LENGTH).
        #[arg(short = 'l', long = "length")]
        length: Option<usize>,
        /// Marker appended to trimmed text (default: TRIM_SUFFIX).
        #[arg(short = 's', long = "suffix")]
        suffix: Option<String>,
    },
}
