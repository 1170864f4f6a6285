//! Rendering of plan reports for stdout.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// Output format for plan reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One `path:`/`cost:` block per plan.
    #[default]
    Text,
    /// Pretty-printed JSON array of reports.
    Json,
}

/// Result of one planning cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    /// Scenario event applied just before this cycle, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    pub source: String,
    pub goal: String,
    /// Node names from source to goal, or `None` when the goal is
    /// unreachable.
    pub path: Option<Vec<String>>,
    pub cost: Option<f64>,
    /// Propagation steps this cycle needed.
    pub steps: usize,
}

pub fn render(reports: &[PlanReport], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(reports)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(reports)?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn render_text(reports: &[PlanReport]) -> String {
    let mut out = String::new();
    for report in reports {
        if let Some(event) = &report.event {
            out.push_str(&format!("after {event}:\n"));
        }
        match (&report.path, report.cost) {
            (Some(path), Some(cost)) => {
                out.push_str(&format!("path: {}\n", path.join(" -> ")));
                out.push_str(&format!("cost: {cost}\n"));
            }
            _ => out.push_str(&format!(
                "no path from {} to {}\n",
                report.source, report.goal
            )),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(path: Option<&[&str]>, cost: Option<f64>, event: Option<&str>) -> PlanReport {
        PlanReport {
            event: event.map(str::to_string),
            source: "A".to_string(),
            goal: "D".to_string(),
            path: path.map(|nodes| nodes.iter().map(|n| n.to_string()).collect()),
            cost,
            steps: 3,
        }
    }

    #[test]
    fn text_lists_path_and_cost() {
        let reports = [report(Some(&["A", "C", "D"]), Some(2.0), None)];
        let text = render(&reports, OutputFormat::Text).expect("renders");
        assert_eq!(text, "path: A -> C -> D\ncost: 2\n");
    }

    #[test]
    fn text_reports_missing_path() {
        let reports = [report(None, None, Some("remove edge C -> D"))];
        let text = render(&reports, OutputFormat::Text).expect("renders");
        assert_eq!(text, "after remove edge C -> D:\nno path from A to D\n");
    }

    #[test]
    fn json_skips_absent_event() {
        let reports = [report(Some(&["A", "D"]), Some(1.5), None)];
        let json = render(&reports, OutputFormat::Json).expect("renders");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value[0]["cost"], 1.5);
        assert_eq!(value[0]["path"][1], "D");
        assert!(value[0].get("event").is_none());
    }
}
