// src/report.rs
// =============================================================================
// Turning the ordered crawl results into something a person can read.
//
// Two outputs:
// - A ReportSink, which durably records the report (TextFileSink writes one
//   line per URL, e.g. "Err:true, 404 - Not Found :\thttp://...")
// - Console output: a table with a summary, or JSON with --json (the
//   settings the crawl ran with plus the ordered entries)
// =============================================================================

use crate::config::{CrawlConfig, ResourcePolicy, ScopePolicy};
use crate::crawl::{CrawlSummary, Outcome, ResultEntry};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("could not write report to {}: {source}", .path.display())]
pub struct SinkError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

/// Somewhere the final report can be recorded.
pub trait ReportSink {
    fn write_report(&mut self, entries: &[ResultEntry]) -> Result<(), SinkError>;
}

/// Writes the report as a line-oriented text file, replacing any old one.
pub struct TextFileSink {
    path: PathBuf,
}

impl TextFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for TextFileSink {
    fn write_report(&mut self, entries: &[ResultEntry]) -> Result<(), SinkError> {
        let wrap = |source| SinkError {
            path: self.path.clone(),
            source,
        };

        let file = File::create(&self.path).map_err(wrap)?;
        let mut writer = BufWriter::new(file);
        write_lines(&mut writer, entries).map_err(wrap)?;
        writer.flush().map_err(wrap)
    }
}

/// One line per entry: error flag, status code, status text, URL.
pub fn write_lines<W: Write>(writer: &mut W, entries: &[ResultEntry]) -> io::Result<()> {
    for entry in entries {
        writeln!(
            writer,
            "Err:{}, {} - {} :\t{}",
            entry.outcome.is_error, entry.outcome.status_code, entry.outcome.status_text, entry.url
        )?;
    }
    Ok(())
}

/// Shape of the --json output
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    seed: &'a str,
    scope: ScopePolicy,
    resources: ResourcePolicy,
    max_depth: usize,
    cancelled: bool,
    abandoned: usize,
    entries: &'a [ResultEntry],
}

pub fn json_report(summary: &CrawlSummary, config: &CrawlConfig) -> serde_json::Result<String> {
    let report = JsonReport {
        seed: config.seed.as_str(),
        scope: config.scope,
        resources: config.resources,
        max_depth: config.max_depth,
        cancelled: summary.cancelled,
        abandoned: summary.abandoned,
        entries: &summary.entries,
    };
    serde_json::to_string_pretty(&report)
}

/// Prints the results either as a table or JSON
pub fn print_results(
    summary: &CrawlSummary,
    config: &CrawlConfig,
    json: bool,
) -> serde_json::Result<()> {
    if json {
        let json_output = json_report(summary, config)?;
        println!("{}", json_output);
    } else {
        print_table(summary);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal
fn print_table(summary: &CrawlSummary) {
    println!("{:<60} {:<8} {:<30}", "URL", "STATUS", "MESSAGE");
    println!("{}", "=".repeat(98));

    for entry in &summary.entries {
        println!(
            "{:<60} {:<8} {:<30}",
            truncate_url(&entry.url, 57),
            format_status(&entry.outcome),
            entry.outcome.status_text
        );
    }

    println!();

    let broken = summary.error_count();
    println!("📊 Summary:");
    println!("   ✅ OK: {}", summary.entries.len() - broken);
    println!("   ❌ Broken: {}", broken);
    println!("   📋 Total: {}", summary.entries.len());
    if summary.cancelled {
        println!(
            "   ⏱️  Deadline reached: {} admitted URL(s) were not checked",
            summary.abandoned
        );
    }
}

fn format_status(outcome: &Outcome) -> String {
    let code = match outcome.status_code {
        0 => "---".to_string(),
        code => code.to_string(),
    };
    let mark = if outcome.is_error { "❌" } else { "✅" };
    format!("{} {}", mark, code)
}

// Truncate on a char boundary so multi-byte URLs don't panic
fn truncate_url(url: &str, max_chars: usize) -> String {
    if url.chars().count() > max_chars {
        let head: String = url.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::TransportError;

    fn entries() -> Vec<ResultEntry> {
        vec![
            ResultEntry {
                url: "http://example.test/missing".to_string(),
                outcome: Outcome::from_status(404, "Not Found", 203),
            },
            ResultEntry {
                url: "http://example.test/".to_string(),
                outcome: Outcome::from_status(200, "OK", 203),
            },
        ]
    }

    #[test]
    fn test_line_format() {
        let mut out = Vec::new();
        write_lines(&mut out, &entries()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Err:true, 404 - Not Found :\thttp://example.test/missing\n\
             Err:false, 200 - OK :\thttp://example.test/\n"
        );
    }

    #[test]
    fn test_text_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = TextFileSink::new(dir.path().join("results.txt"));
        sink.write_report(&entries()).unwrap();

        let written = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(written.lines().count(), 2);
        assert!(written.starts_with("Err:true, 404"));
    }

    #[test]
    fn test_sink_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = TextFileSink::new(dir.path().join("no/such/dir/results.txt"));
        let err = sink.write_report(&entries()).unwrap_err();
        assert!(err.to_string().contains("results.txt"));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(&entries()[0]).unwrap();
        assert_eq!(json["url"], "http://example.test/missing");
        assert_eq!(json["status_code"], 404);
        assert_eq!(json["is_error"], true);
    }

    #[test]
    fn test_json_report_carries_settings() {
        let config = CrawlConfig::new("https://example.test/docs/")
            .unwrap()
            .with_scope(ScopePolicy::Endpoint)
            .with_max_depth(1);
        let summary = CrawlSummary {
            entries: entries(),
            admitted: 3,
            abandoned: 1,
            cancelled: true,
            elapsed: std::time::Duration::from_secs(1),
        };

        let json: serde_json::Value =
            serde_json::from_str(&json_report(&summary, &config).unwrap()).unwrap();
        assert_eq!(json["seed"], "https://example.test/docs/");
        assert_eq!(json["scope"], "endpoint");
        assert_eq!(json["resources"], "expand");
        assert_eq!(json["max_depth"], 1);
        assert_eq!(json["cancelled"], true);
        assert_eq!(json["abandoned"], 1);
        assert_eq!(json["entries"][0]["status_code"], 404);
        assert_eq!(json["entries"][1]["url"], "http://example.test/");
    }

    #[test]
    fn test_format_status() {
        assert_eq!(format_status(&Outcome::from_status(200, "OK", 203)), "✅ 200");
        assert_eq!(
            format_status(&Outcome::from_transport(&TransportError::Dns)),
            "❌ ---"
        );
    }

    #[test]
    fn test_truncate_url() {
        assert_eq!(truncate_url("http://a.test/", 57), "http://a.test/");
        assert_eq!(truncate_url("http://a.test/ünïcode", 10), "http://a.t...");
    }
}
