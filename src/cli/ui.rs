use console::style;

use crate::types::severity::{Severity, TrustLevel};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

/// Severity label colored by weight.
pub fn severity_label(severity: Severity) -> String {
    let label = severity.to_string();
    match severity {
        Severity::Critical => style(label).red().bold().to_string(),
        Severity::High => style(label).red().to_string(),
        Severity::Medium => style(label).yellow().to_string(),
        Severity::Low => style(label).blue().to_string(),
    }
}

/// Trust label colored by rank.
pub fn trust_label(trust: TrustLevel) -> String {
    let label = trust.to_string();
    match trust {
        TrustLevel::Trusted => style(label).green().to_string(),
        TrustLevel::Known => style(label).yellow().to_string(),
        TrustLevel::Unknown => style(label).red().to_string(),
    }
}
