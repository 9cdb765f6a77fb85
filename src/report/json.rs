use crate::rules::{DepthSummary, Finding, Report, Severity};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, report: &Report) -> Result<()> {
        let json = self.render(report)?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }

    pub fn render(&self, report: &Report) -> Result<String> {
        serde_json::to_string_pretty(&JsonReport::from_report(report)).into_diagnostic()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    modules_analyzed: usize,
    total_findings: usize,
    findings: Vec<JsonFinding<'a>>,
    summary: JsonSummary,
    #[serde(skip_serializing_if = "no_depths")]
    depths: &'a [DepthSummary],
}

fn no_depths(depths: &&[DepthSummary]) -> bool {
    depths.is_empty()
}

#[derive(Serialize)]
struct JsonFinding<'a> {
    code: &'static str,
    #[serde(flatten)]
    finding: &'a Finding,
}

#[derive(Serialize)]
struct JsonSummary {
    errors: usize,
    warnings: usize,
    infos: usize,
    by_rule: BTreeMap<&'static str, usize>,
}

impl<'a> JsonReport<'a> {
    fn from_report(report: &'a Report) -> Self {
        let mut summary = JsonSummary {
            errors: 0,
            warnings: 0,
            infos: 0,
            by_rule: BTreeMap::new(),
        };

        let findings = report
            .findings
            .iter()
            .map(|finding| {
                match finding.severity {
                    Severity::Error => summary.errors += 1,
                    Severity::Warning => summary.warnings += 1,
                    Severity::Info => summary.infos += 1,
                }
                *summary.by_rule.entry(finding.rule.as_str()).or_default() += 1;

                JsonFinding {
                    code: finding.rule.code(),
                    finding,
                }
            })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION"),
            modules_analyzed: report.modules_analyzed,
            total_findings: report.findings.len(),
            findings,
            summary,
            depths: &report.depths,
        }
    }
}
