//! Report formatting for the command line

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::runner::{ProbeReport, SuiteReport};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Plain text format
    Plain,
}

/// Rows for table and plain output
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl TableDisplay for ProbeReport {
    fn headers() -> Vec<&'static str> {
        vec!["Probe", "Tag", "Variant", "Result", "Duration", "Detail"]
    }

    fn row(&self) -> Vec<String> {
        let result = match self.error_kind {
            None => "✅ pass".to_string(),
            Some(kind) => format!("❌ {}", kind),
        };
        let detail = self
            .error
            .as_deref()
            .or(self.detail.as_deref())
            .unwrap_or_default()
            .to_string();

        vec![
            self.name.clone(),
            self.tag.clone(),
            self.variant.clone(),
            result,
            format!("{} ms", self.duration_ms),
            detail,
        ]
    }
}

/// Render a suite report
pub fn render_suite(report: &SuiteReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(ProbeReport::headers());
            for result in &report.results {
                table.add_row(result.row());
            }

            format!("{table}\n{}", summary_line(report))
        }
        OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Plain => {
            let mut out = String::new();
            for (i, result) in report.results.iter().enumerate() {
                if i > 0 {
                    out.push_str("---\n");
                }
                for (header, value) in ProbeReport::headers().iter().zip(result.row()) {
                    out.push_str(&format!("{}: {}\n", header, value));
                }
            }
            out.push_str(&summary_line(report));
            out
        }
    }
}

fn summary_line(report: &SuiteReport) -> String {
    format!(
        "{} passed, {} failed ({} ms)",
        report.passed, report.failed, report.duration_ms
    )
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}
