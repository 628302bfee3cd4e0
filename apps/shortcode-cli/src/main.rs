//! shortcode - command-line front end for the URL Shortener formatting helpers.
//!
//! Encodes link ids to short codes and back, prints the validation patterns
//! for the configured alphabet, sanitizes keywords, sniffs legacy serialized
//! data and trims long strings.
//!
//! Run:
//! ```bash
//! # base36 alphabet (default)
//! cargo run -p shortcode-cli -- encode 1337
//!
//! # custom alphabet, JSON logs at debug level
//! SHORTURL_CHARSET=0123456789bcdfghjklmnpqrstvwxyz LOG_FORMAT=json RUST_LOG=debug \
//!   cargo run -p shortcode-cli -- decode 1d4
//! ```
//!
//! Configuration: See `config.rs` for all environment variables.

mod cli;
mod config;

use std::io::{self, Write};
use std::process;

use clap::Parser;
use domain::pattern::build_validation_pattern;
use domain::sanitize::Sanitizer;
use domain::serialized::{parse_with, Dialect, SerializedValue};
use domain::trim::trim_long_string;
use serde::Serialize;
use tracing::{debug, error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::{Args, Command};
use crate::config::Config;

#[derive(Serialize)]
struct CodeReport<'a> {
    id: u64,
    code: &'a str,
}

#[derive(Serialize)]
struct PatternReport {
    charset: String,
    radix: usize,
    class: String,
    negated: String,
    anchored: String,
}

#[derive(Serialize)]
struct SniffReport<'a> {
    serialized: bool,
    dialect: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a SerializedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("json encoding failed: {}", e))
}

fn emit(out: &mut impl Write, line: &str) -> Result<(), String> {
    writeln!(out, "{}", line).map_err(|e| format!("write failed: {}", e))
}

fn run(
    args: &Args,
    cfg: &Config,
    sanitizer: &Sanitizer,
    out: &mut impl Write,
) -> Result<(), String> {
    match &args.command {
        Command::Encode { ids } => {
            let codes: Vec<String> = ids.iter().map(|&id| sanitizer.encode(id)).collect();
            for (id, code) in ids.iter().zip(&codes) {
                debug!(id, code = %code, "encode ok");
            }
            if args.json {
                let reports: Vec<CodeReport> = ids
                    .iter()
                    .zip(&codes)
                    .map(|(&id, code)| CodeReport { id, code })
                    .collect();
                emit(out, &to_json(&reports)?)
            } else {
                codes.iter().try_for_each(|code| emit(out, code))
            }
        }
        Command::Decode { codes } => {
            let mut reports = Vec::with_capacity(codes.len());
            for code in codes {
                match sanitizer.decode(code) {
                    Ok(id) => {
                        debug!(code = %code, id, "decode ok");
                        reports.push(CodeReport { id, code });
                    }
                    Err(e) if e.is_invalid_code() => {
                        warn!(code = %code, err = %e, "decode rejected");
                        return Err(format!("invalid short code '{}': {}", code, e));
                    }
                    Err(e) => {
                        error!(err = ?e, "decode error");
                        return Err(format!("decode failed: {}", e));
                    }
                }
            }
            if args.json {
                emit(out, &to_json(&reports)?)
            } else {
                reports
                    .iter()
                    .try_for_each(|r| emit(out, &r.id.to_string()))
            }
        }
        Command::Pattern => {
            let pattern = build_validation_pattern(&cfg.alphabet);
            let report = PatternReport {
                charset: cfg.alphabet.to_string(),
                radix: cfg.alphabet.len(),
                class: pattern.class(),
                negated: pattern.negated_class(),
                anchored: pattern.anchored(),
            };
            if args.json {
                emit(out, &to_json(&report)?)
            } else {
                emit(out, &format!("charset:  {}", report.charset))?;
                emit(out, &format!("radix:    {}", report.radix))?;
                emit(out, &format!("class:    {}", report.class))?;
                emit(out, &format!("negated:  {}", report.negated))?;
                emit(out, &format!("anchored: {}", report.anchored))
            }
        }
        Command::Sanitize { input } => {
            let keyword = sanitizer.sanitize(input);
            debug!(input = %input, keyword = %keyword, "sanitize ok");
            if args.json {
                emit(out, &to_json(&serde_json::json!({ "input": input, "keyword": keyword }))?)
            } else {
                emit(out, &keyword)
            }
        }
        Command::Sniff { input, legacy } => {
            let dialect = if *legacy {
                Dialect::Legacy
            } else {
                Dialect::Strict
            };
            let parsed = parse_with(input, dialect);
            if let Err(e) = &parsed {
                debug!(err = %e, "not serialized");
            }
            if args.json {
                let report = SniffReport {
                    serialized: parsed.is_ok(),
                    dialect: if *legacy { "legacy" } else { "strict" },
                    value: parsed.as_ref().ok(),
                    error: parsed.as_ref().err().map(|e| e.to_string()),
                };
                emit(out, &to_json(&report)?)
            } else {
                match &parsed {
                    Ok(value) => emit(out, &format!("serialized ({})", value.type_name())),
                    Err(e) => emit(out, &format!("not serialized: {}", e)),
                }
            }
        }
        Command::Trim {
            text,
            length,
            suffix,
        } => {
            let max_len = length.unwrap_or(cfg.trim_length);
            let suffix = suffix.as_deref().unwrap_or(&cfg.trim_suffix);
            let trimmed = trim_long_string(text, max_len, suffix);
            if args.json {
                emit(
                    out,
                    &to_json(&serde_json::json!({ "text": trimmed, "max_length": max_len }))?,
                )
            } else {
                emit(out, &trimmed)
            }
        }
    }
}

fn init_tracing(cfg: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr; stdout carries command output.
    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(io::stderr),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(io::stderr),
                )
                .init();
        }
    }
}

fn main() {
    let args = Args::parse();

    // Load and validate config first (fail fast on misconfiguration)
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    init_tracing(&cfg);
    debug!(radix = cfg.alphabet.len(), url_convert = ?cfg.url_convert, "{}", domain::about());
    cfg.warn_if_unusual();

    let sanitizer = match cfg.sanitizer() {
        Ok(s) => s,
        Err(e) => {
            error!(field = e.field, "{}", e.message);
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(msg) = run(&args, &cfg, &sanitizer, &mut out) {
        eprintln!("error: {}", msg);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    fn exec(argv: &[&str], cfg: &Config) -> Result<String, String> {
        let mut full = vec!["shortcode"];
        full.extend_from_slice(argv);
        let args = Args::parse_from(full);
        let sanitizer = cfg.sanitizer().unwrap();
        let mut out = Vec::new();
        run(&args, cfg, &sanitizer, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn encode_then_decode() {
        let cfg = config(&[]);
        assert_eq!(exec(&["encode", "0", "1337"], &cfg).unwrap(), "0\n115\n");
        assert_eq!(exec(&["decode", "115", "0"], &cfg).unwrap(), "1337\n0\n");
    }

    #[test]
    fn custom_alphabet_example() {
        let cfg = config(&[("SHORTURL_CHARSET", "0123456789bcdfghjklmnpqrstvwxyz")]);
        assert_eq!(exec(&["encode", "1337"], &cfg).unwrap(), "1d4\n");
        assert_eq!(exec(&["decode", "1d4"], &cfg).unwrap(), "1337\n");
    }

    #[test]
    fn decode_rejects_foreign_characters() {
        let cfg = config(&[]);
        let err = exec(&["decode", "11-5"], &cfg).unwrap_err();
        assert!(err.contains("invalid short code '11-5'"));
    }

    #[test]
    fn encode_json_output() {
        let cfg = config(&[("URL_CONVERT", "62")]);
        let out = exec(&["encode", "1337", "--json"], &cfg).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v[0]["id"], 1337);
        assert_eq!(v[0]["code"], "lz");
    }

    #[test]
    fn pattern_output_escapes_specials() {
        let cfg = config(&[("SHORTURL_CHARSET", "ab]-")]);
        let out = exec(&["pattern", "--json"], &cfg).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["class"], "[ab\\]\\-]");
        assert_eq!(v["radix"], 4);
    }

    #[test]
    fn sanitize_strips() {
        let cfg = config(&[]);
        assert_eq!(exec(&["sanitize", "Hello, World!"], &cfg).unwrap(), "elloorld\n");
    }

    #[test]
    fn sniff_reports_both_dialects() {
        let cfg = config(&[]);
        assert_eq!(exec(&["sniff", "i:25;"], &cfg).unwrap(), "serialized (int)\n");
        assert!(exec(&["sniff", "b:4;"], &cfg)
            .unwrap()
            .starts_with("not serialized"));
        assert_eq!(
            exec(&["sniff", "b:4;", "--legacy"], &cfg).unwrap(),
            "serialized (bool)\n"
        );

        let out = exec(&["sniff", "a string", "--json"], &cfg).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["serialized"], false);
        assert!(v.get("value").is_none());
        assert!(v["error"].is_string());
    }

    #[test]
    fn trim_uses_config_defaults_and_overrides() {
        let long = "The Plague That Makes Your Booty Move... It's The Infectious Grooves";
        let cfg = config(&[("TRIM_LENGTH", "37")]);
        assert_eq!(
            exec(&["trim", long], &cfg).unwrap(),
            "The Plague That Makes Your Booty[...]\n"
        );
        assert_eq!(
            exec(&["trim", long, "--suffix", ".."], &cfg).unwrap(),
            "The Plague That Makes Your Booty Mo..\n"
        );
        assert_eq!(exec(&["trim", "short", "-l", "60"], &cfg).unwrap(), "short\n");
    }
}
