//! Terminal and JSON rendering for `at-parse`.
//!
//! Diagnostics go through ariadne for source-annotated output on stderr; the
//! token listing is plain text on stdout so it can be piped.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Fmt, Label, Report, ReportKind, Source};
use at_parser_core::{Diagnostic, ScanResult, Severity, TokenKind};
use clap::ValueEnum;

// ── Output format ───────────────────────────────────────────────────────

/// Output format selected with `--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// Coloured, human-readable output.
    Pretty,
    /// Machine-readable JSON on stdout.
    Json,
}

impl Format {
    /// Use the explicit choice, else pretty for a terminal and JSON for pipes.
    pub(crate) fn resolve_or_detect(explicit: Option<Format>) -> Self {
        explicit.unwrap_or_else(|| {
            if io::stdout().is_terminal() {
                Format::Pretty
            } else {
                Format::Json
            }
        })
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Info => ReportKind::Advice,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Info => Color::Blue,
        _ => Color::Yellow,
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Info => "info",
        _ => "warning",
    }
}

fn kind_color(kind: TokenKind) -> Color {
    match kind {
        TokenKind::CmdTest | TokenKind::CmdRead | TokenKind::CmdSet => Color::Magenta,
        TokenKind::Notification => Color::Cyan,
        TokenKind::Int => Color::Green,
        TokenKind::QuotedString | TokenKind::String => Color::Yellow,
        TokenKind::Array => Color::Blue,
        TokenKind::Empty => Color::White,
    }
}

// ── Diagnostics ─────────────────────────────────────────────────────────

/// `key=value` pairs from the diagnostic context, if any.
fn context_note(diag: &Diagnostic) -> Option<String> {
    let ctx = diag.context.as_ref().filter(|c| !c.is_empty())?;
    Some(
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn render_diagnostics_pretty(source: &str, filename: &str, diagnostics: &[Diagnostic]) {
    let config = Config::default().with_compact(false);
    let mut cache = (filename, Source::from(source));

    for diag in diagnostics {
        let note = context_note(diag);
        let Some(span) = diag.span else {
            eprintln!(
                "{}[{}]: {}",
                severity_label(diag.severity),
                diag.id,
                diag.message
            );
            if let Some(note) = &note {
                eprintln!("  = note: {note}");
            }
            if let Some(help) = diag.explain() {
                eprintln!("  = help: {help}");
            }
            continue;
        };

        // Spans from truncated input may run past the end.
        let start = span.start.min(source.len());
        let end = span.end.min(source.len()).max(start);

        let mut builder = Report::build(report_kind(diag.severity), (filename, start..end))
            .with_code(diag.id.as_ref())
            .with_message(&diag.message)
            .with_config(config)
            .with_label(
                Label::new((filename, start..end))
                    .with_message(note.clone().unwrap_or_else(|| diag.message.clone()))
                    .with_color(severity_color(diag.severity)),
            );
        if let Some(help) = diag.explain() {
            builder = builder.with_help(help);
        }
        builder.finish().eprint(&mut cache).ok();
    }
}

/// Render diagnostics: ariadne reports on stderr, or a JSON array on stdout.
pub(crate) fn render_diagnostics(
    source: &str,
    filename: &str,
    diagnostics: &[Diagnostic],
    format: Format,
) -> anyhow::Result<()> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    match format {
        Format::Pretty => render_diagnostics_pretty(source, filename, diagnostics),
        Format::Json => println!("{}", serde_json::to_string_pretty(diagnostics)?),
    }
    Ok(())
}

/// Print `2 errors, 1 warning, 1 info` to stderr. Prints nothing when empty.
pub(crate) fn print_summary(diagnostics: &[Diagnostic]) {
    let (mut errors, mut warnings, mut infos) = (0usize, 0usize, 0usize);
    for d in diagnostics {
        match d.severity {
            Severity::Error => errors += 1,
            Severity::Info => infos += 1,
            _ => warnings += 1,
        }
    }

    let plural = |n: usize| if n == 1 { "" } else { "s" };
    let mut parts = Vec::new();
    if errors > 0 {
        let text = format!("{errors} error{}", plural(errors));
        parts.push(text.fg(Color::Red).to_string());
    }
    if warnings > 0 {
        let text = format!("{warnings} warning{}", plural(warnings));
        parts.push(text.fg(Color::Yellow).to_string());
    }
    if infos > 0 {
        parts.push(format!("{infos} info").fg(Color::Blue).to_string());
    }
    if !parts.is_empty() {
        eprintln!("{}", parts.join(", "));
    }
}

// ── Token listing ───────────────────────────────────────────────────────

/// Print every scanned line with its tokens to stdout.
///
/// ```text
/// line 0  bytes 0..30
///   [0] notification   +CEREG
///   [1] int            2
/// ```
pub(crate) fn print_tokens(res: &ScanResult<'_>) {
    for (n, line) in res.lines.iter().enumerate() {
        println!("line {n}  bytes {}..{}", line.start, line.end);
        for (i, token) in line.tokens.iter().enumerate() {
            let kind = format!("{:<14}", token.kind.as_str());
            let text = match token.kind {
                TokenKind::QuotedString => format!("\"{}\"", token.text),
                _ => token.text.to_string(),
            };
            println!("  [{i}] {} {text}", kind.fg(kind_color(token.kind)));
        }
        if let Some(offset) = line.malformed_at {
            println!("  {} at byte {offset}", "malformed".fg(Color::Red));
        }
    }
    if let Some(result) = res.final_response {
        let color = if result.is_error() {
            Color::Red
        } else {
            Color::Green
        };
        println!("final response: {}", result.fg(color));
    }
}
