mod render;

use std::fs;
use std::io::{self, Read};
use std::num::NonZeroUsize;
use std::process;

use anyhow::{Context, Result, anyhow};
use at_parser_core::{
    AtParser, AtParserError, Diagnostic, ScanConfig, ScanResult, Severity, scan_with_config,
};
use clap::{Parser, Subcommand, ValueEnum};

use crate::render::{Format, print_summary, print_tokens, render_diagnostics};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "at-parse",
    version,
    about = "Inspect modem AT commands and responses: tokens, counts, values, checks"
)]
struct Cli {
    /// Output mode. Defaults to "pretty" when stdout is a TTY, "json"
    /// otherwise.
    #[arg(long, global = true, value_enum)]
    output: Option<Format>,

    /// Report malformed lines as errors instead of warnings.
    #[arg(long, global = true)]
    strict: bool,

    /// Stop scanning after this many lines.
    #[arg(long, global = true)]
    max_lines: Option<NonZeroUsize>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print every line's tokens. Use `-` to read stdin.
    Tokens { file: String },

    /// Print the number of tokens on each line, command included.
    Count { file: String },

    /// Print one subparameter value.
    Get {
        file: String,
        /// Zero-based line number.
        #[arg(long, default_value_t = 0)]
        line: usize,
        /// Zero-based token index; 0 is the command or notification.
        #[arg(long)]
        index: usize,
        /// How to read the value.
        #[arg(long = "as", value_enum, default_value_t = ValueType::Str)]
        value_type: ValueType,
    },

    /// Check for malformed lines (exit 1 if any).
    Check { file: String },

    /// Explain a diagnostic ID (e.g. AT1001).
    Explain { id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ValueType {
    /// 64-bit integer, signed unless it only fits as unsigned.
    Int,
    /// String, command name or array text.
    Str,
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output);
    let config = ScanConfig::default()
        .with_strict(cli.strict)
        .with_max_lines(cli.max_lines);

    match cli.cmd {
        Cmd::Tokens { file } => cmd_tokens(&file, &config, format)?,
        Cmd::Count { file } => cmd_count(&file, &config, format)?,
        Cmd::Get {
            file,
            line,
            index,
            value_type,
        } => cmd_get(&file, line, index, value_type, format)?,
        Cmd::Check { file } => cmd_check(&file, &config.with_strict(true), format)?,
        Cmd::Explain { id } => cmd_explain(&id, format)?,
    }

    Ok(())
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_tokens(file: &str, config: &ScanConfig, format: Format) -> Result<()> {
    let input = read_input(file)?;
    let res = scan_with_config(&input, config);

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&res)?),
        Format::Pretty => {
            print_tokens(&res);
            report(&input, file, &res, format)?;
        }
    }

    exit_on_errors(&res.diagnostics);
    Ok(())
}

fn cmd_count(file: &str, config: &ScanConfig, format: Format) -> Result<()> {
    let input = read_input(file)?;
    let res = scan_with_config(&input, config);
    let counts: Vec<usize> = res.lines.iter().map(|l| l.len()).collect();

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "counts": counts,
                "diagnostics": res.diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            for count in &counts {
                println!("{count}");
            }
            report(&input, file, &res, format)?;
        }
    }

    exit_on_errors(&res.diagnostics);
    Ok(())
}

fn cmd_get(
    file: &str,
    line: usize,
    index: usize,
    value_type: ValueType,
    format: Format,
) -> Result<()> {
    let input = read_input(file)?;
    let mut parser = AtParser::new(&input);
    for n in 0..line {
        parser
            .next_command()
            .map_err(|e| anyhow!("{file}: no line {} ({e}) [{}]", n + 1, e.code()))?;
    }

    let fail = |e: AtParserError| {
        anyhow!("{file}: line {line}, index {index}: {e} [{}]", e.code())
    };
    let value = match value_type {
        ValueType::Int => match parser.get_i64(index) {
            Ok(v) => serde_json::Value::from(v),
            Err(AtParserError::OutOfRange) => {
                serde_json::Value::from(parser.get_u64(index).map_err(fail)?)
            }
            Err(e) => return Err(fail(e)),
        },
        ValueType::Str => serde_json::Value::from(parser.get_str(index).map_err(fail)?),
    };

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "line": line,
                "index": index,
                "value": value,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => match value {
            serde_json::Value::String(s) => println!("{s}"),
            other => println!("{other}"),
        },
    }
    Ok(())
}

fn cmd_check(file: &str, config: &ScanConfig, format: Format) -> Result<()> {
    let input = read_input(file)?;
    let res = scan_with_config(&input, config);
    let ok = !res.has_errors();

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": ok,
                "lines": res.lines.len(),
                "final_response": res.final_response,
                "diagnostics": res.diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            report(&input, file, &res, format)?;
            if ok {
                eprintln!("{file}: ok ({} lines)", res.lines.len());
            }
        }
    }

    exit_on_errors(&res.diagnostics);
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    let text = at_parser_diagnostics::explain(id);
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "known": text.is_some(),
                "explanation": text,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            use ariadne::Fmt;
            match text {
                Some(text) => println!("{}: {text}", id.fg(ariadne::Color::Cyan)),
                None => println!("{id}: (no explanation available)"),
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Read a file, or stdin for `-`.
fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(file).with_context(|| format!("failed to read '{file}'"))
}

/// Diagnostics and summary on stderr.
fn report(input: &str, file: &str, res: &ScanResult<'_>, format: Format) -> Result<()> {
    let name = if file == "-" { "<stdin>" } else { file };
    render_diagnostics(input, name, &res.diagnostics, format)?;
    print_summary(&res.diagnostics);
    Ok(())
}

/// Exit with code 1 if any diagnostic is an error.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
    {
        process::exit(1);
    }
}
