//! Run summary printed at the end of a run.

use console::style;

use crate::error::PushcartError;
use crate::state::StepStatus;
use crate::steps::StepId;

/// Outcome of one step in the final report.
#[derive(Debug, Clone, Copy)]
pub struct StepReport {
    pub id: StepId,
    pub name: &'static str,
    pub status: StepStatus,
}

/// Result of one pipeline run.
///
/// The report always lists every requested step, whatever happened to it.
/// A retry-exhausted failure ends the run but still produces a full report,
/// carried in [`RunReport::failure`].
#[derive(Debug)]
pub struct RunReport {
    /// Task identifier (resolved id, or the placeholder if discovery never ran).
    pub task: String,
    /// Per-step outcomes, in requested order.
    pub steps: Vec<StepReport>,
    /// Set when the publish guard ended a phase early.
    pub guarded: bool,
    /// The failure that ended the run, if any.
    pub failure: Option<PushcartError>,
}

impl RunReport {
    /// Whether the run finished with every executed step done.
    pub fn success(&self) -> bool {
        self.failure.is_none()
            && !self
                .steps
                .iter()
                .any(|s| s.status == StepStatus::Failed)
    }

    /// Render the report for the terminal.
    pub fn render(&self) -> String {
        let mut out = format!("Task {}\n", style(&self.task).bold());

        for step in &self.steps {
            let icon = match step.status {
                StepStatus::Done => style("✓").green(),
                StepStatus::Failed => style("✗").red(),
                StepStatus::Skipped => style("⊘").yellow(),
                StepStatus::Pending => style("·").dim(),
            };
            out.push_str(&format!(
                "  {icon} [{:>2}] {:<22} {}\n",
                step.id,
                step.name,
                style(step.status.label()).dim()
            ));
        }

        if self.guarded {
            out.push_str(&format!(
                "  {} listing already submitted, publish phase not re-run\n",
                style("!").yellow()
            ));
        }

        match &self.failure {
            Some(err) => out.push_str(&format!("\n{} {err}\n", style("error:").red().bold())),
            None if self.success() => {
                out.push_str(&format!("\n{}\n", style("Run complete.").green()))
            }
            None => {}
        }

        out
    }
}
