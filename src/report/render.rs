// src/report/render.rs
use super::{CheckReport, DashboardReport, EndpointReport};
use crate::check::CheckStatus;
use crate::poller::EndpointStatus;
use colored::{ColoredString, Colorize};
use std::fmt::Write;

const NAME_WIDTH: usize = 16;

/// Colour only when it is wanted and stdout is a terminal.
pub fn color_enabled(configured: bool, stdout_is_terminal: bool) -> bool {
    configured && stdout_is_terminal
}

pub fn render_text(report: &DashboardReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", "Checks".bold());
    for check in &report.checks {
        render_check(&mut out, check);
    }

    render_endpoints(&mut out, "Services", &report.services);
    render_endpoints(&mut out, "Dependencies", &report.dependencies);

    let _ = writeln!(
        out,
        "\n{}",
        format!("Checked at {}", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")).dimmed()
    );
    out
}

pub fn render_json(report: &DashboardReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

fn render_check(out: &mut String, check: &CheckReport) {
    let mark = match check.status {
        CheckStatus::Pending => "…".yellow(),
        CheckStatus::Succeeded => "✔".green(),
        CheckStatus::Failed => "✘".red(),
    };

    match &check.error {
        Some(error) => {
            let _ = writeln!(out, "  {} {}: {}", mark, check.summary, error);
        }
        None => {
            let _ = writeln!(out, "  {} {}", mark, check.summary);
        }
    }

    if let Some(instructions) = check.instructions {
        let _ = writeln!(out, "      {}", instructions.italic());
    }
}

fn render_endpoints(out: &mut String, title: &str, endpoints: &[EndpointReport]) {
    if endpoints.is_empty() {
        return;
    }

    let _ = writeln!(out, "\n{}", title.bold());
    for endpoint in endpoints {
        let port = endpoint
            .port
            .map(|port| port.to_string())
            .unwrap_or_default();
        let (mark, port): (ColoredString, ColoredString) = match endpoint.status {
            EndpointStatus::Pending => ("…".yellow(), port.normal()),
            EndpointStatus::Healthy => ("✔".green(), port.green()),
            EndpointStatus::Unhealthy => ("✘".red(), port.red()),
        };
        let _ = writeln!(
            out,
            "  {} {:<width$} {}",
            mark,
            endpoint.name,
            port,
            width = NAME_WIDTH
        );
    }
}
