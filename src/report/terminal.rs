use crate::model::ModulePath;
use crate::rules::{Finding, Report, RuleId, Severity};
use colored::Colorize;
use miette::Result;
use std::collections::BTreeMap;

/// How many of the deepest modules the summary lists
const DEPTH_LIMIT: usize = 5;

/// Terminal reporter with colored output
pub struct TerminalReporter;

impl TerminalReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report(&self, report: &Report) -> Result<()> {
        if report.findings.is_empty() {
            println!(
                "{}",
                format!("No dependency issues in {} modules!", report.modules_analyzed)
                    .green()
                    .bold()
            );
        } else {
            self.print_findings(report);
        }

        if !report.depths.is_empty() {
            self.print_depths(report);
        }

        Ok(())
    }

    fn print_findings(&self, report: &Report) {
        let mut by_module: BTreeMap<&ModulePath, Vec<&Finding>> = BTreeMap::new();
        for finding in &report.findings {
            by_module.entry(&finding.module).or_default().push(finding);
        }

        println!();
        println!(
            "{}",
            format!(
                "Found {} dependency issues in {} modules:",
                report.findings.len(),
                by_module.len()
            )
            .yellow()
            .bold()
        );
        println!();

        for (module, findings) in &by_module {
            println!("{}", module.as_str().cyan().bold());
            for finding in findings {
                self.print_finding(finding);
            }
            println!();
        }

        self.print_summary(report);
    }

    fn print_finding(&self, finding: &Finding) {
        let severity = match finding.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Info => "info".blue().bold(),
        };

        println!(
            "  {} [{}] {}",
            severity,
            finding.rule.code().dimmed(),
            finding.message
        );

        let mut detail = format!("{}({})", finding.configuration, finding.dependency);
        if let Some(source) = &finding.source {
            detail.push_str(&format!(" via {}", source));
        }
        println!("    {} {}", "→".dimmed(), detail.white());
    }

    fn print_summary(&self, report: &Report) {
        let mut errors = 0;
        let mut warnings = 0;
        let mut infos = 0;
        for finding in &report.findings {
            match finding.severity {
                Severity::Error => errors += 1,
                Severity::Warning => warnings += 1,
                Severity::Info => infos += 1,
            }
        }

        println!("{}", "─".repeat(60).dimmed());

        let mut severity_parts = Vec::new();
        if errors > 0 {
            severity_parts.push(format!("{} errors", errors).red().to_string());
        }
        if warnings > 0 {
            severity_parts.push(format!("{} warnings", warnings).yellow().to_string());
        }
        if infos > 0 {
            severity_parts.push(format!("{} info", infos).blue().to_string());
        }
        println!("Summary: {}", severity_parts.join(", "));

        for rule in RuleId::ALL {
            let count = report.count(rule);
            if count > 0 {
                println!("  {} {}", format!("{:>4}", count).bold(), rule.as_str().dimmed());
            }
        }
        println!();
    }

    fn print_depths(&self, report: &Report) {
        println!("{}", "Deepest modules:".dimmed());
        for depth in report.depths.iter().take(DEPTH_LIMIT) {
            let chain: Vec<&str> = depth.longest_path.iter().map(ModulePath::as_str).collect();
            println!(
                "  {} {} {}",
                format!("{:>3}", depth.depth).bold(),
                depth.module.as_str().cyan(),
                chain.join(" → ").dimmed()
            );
        }
        println!();
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
