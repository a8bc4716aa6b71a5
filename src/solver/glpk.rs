//! Adapter for the GLPK `glpsol` command-line solver.
//!
//! The model is written as a CPLEX LP file, solved with
//! `glpsol --lp <model> --write <solution>`, and the raw MIP solution is read
//! back. Raw solution lines used:
//!
//! ```text
//! s mip ROWS COLS STATUS OBJ     STATUS: o optimal, f feasible, n none, u undefined
//! j COL VALUE                    one per column, 1-based
//! ```

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use super::{SolveResult, SolveStatus, SolverAdapter};
use crate::config::SolveOptions;
use crate::formulation::{Assignment, Model, VariableLayout};

static NEXT_RUN: AtomicUsize = AtomicUsize::new(0);

/// Runs `glpsol` on a temporary LP file.
///
/// Every call uses its own file pair, so one adapter can serve parallel runs.
#[derive(Debug, Clone)]
pub struct GlpkSolver {
    program: PathBuf,
    work_dir: PathBuf,
}

impl GlpkSolver {
    /// Uses `glpsol` from `PATH` and the system temp directory.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("glpsol"),
            work_dir: std::env::temp_dir(),
        }
    }

    /// Uses another `glpsol` executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Directory for the LP and solution files.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    fn try_solve(&self, model: &Model, options: &SolveOptions) -> io::Result<SolveResult> {
        let stem = format!(
            "u-cvrptw-{}-{}",
            std::process::id(),
            NEXT_RUN.fetch_add(1, Ordering::Relaxed)
        );
        let lp_path = self.work_dir.join(format!("{}.lp", stem));
        let sol_path = self.work_dir.join(format!("{}.sol", stem));

        {
            let mut writer = BufWriter::new(File::create(&lp_path)?);
            model.write_lp(&mut writer)?;
            writer.flush()?;
        }

        let mut cmd = Command::new(&self.program);
        cmd.arg("--lp").arg(&lp_path).arg("--write").arg(&sol_path);
        if let Some(limit) = options.time_limit {
            cmd.arg("--tmlim").arg(limit.as_secs().max(1).to_string());
        }
        debug!(program = %self.program.display(), lp = %lp_path.display(), "running glpsol");

        let output = cmd.output();
        let _ = fs::remove_file(&lp_path);
        let output = output?;
        let solution = fs::read_to_string(&sol_path);
        let _ = fs::remove_file(&sol_path);

        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        log.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Ok(SolveResult::error(format!(
                "glpsol exited with {}: {}",
                output.status,
                tail(&log)
            )));
        }

        Ok(match solution {
            Ok(text) => parse_solution(&text, model.layout(), &log),
            Err(_) => classify_log(&log),
        })
    }
}

impl Default for GlpkSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverAdapter for GlpkSolver {
    fn solve(&self, model: &Model, options: &SolveOptions) -> SolveResult {
        self.try_solve(model, options)
            .unwrap_or_else(|e| SolveResult::error(format!("failed to run {}: {}", self.program.display(), e)))
    }
}

fn tail(log: &str) -> String {
    let lines: Vec<&str> = log.lines().collect();
    let start = lines.len().saturating_sub(5);
    lines[start..].join("\n")
}

fn time_limit_hit(log: &str) -> bool {
    log.contains("TIME LIMIT EXCEEDED")
}

/// Status from the solver log alone, when no solution file was written.
fn classify_log(log: &str) -> SolveResult {
    let status = if time_limit_hit(log) {
        SolveStatus::Timeout
    } else if log.contains("NO PRIMAL FEASIBLE") || log.contains("NO INTEGER FEASIBLE") {
        SolveStatus::Infeasible
    } else if log.contains("UNBOUNDED") {
        SolveStatus::Unbounded
    } else {
        SolveStatus::Error
    };
    SolveResult::status(status).with_diagnostic(tail(log))
}

/// Reads a GLPK raw MIP solution.
fn parse_solution(text: &str, layout: &VariableLayout, log: &str) -> SolveResult {
    let mut status = None;
    let mut objective = None;
    let mut values = vec![0.0; layout.len()];

    for line in text.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            ["s", "mip", _rows, cols, stat, obj] => {
                if cols.parse::<usize>().ok() != Some(layout.len()) {
                    return SolveResult::error(format!(
                        "solution has {} columns, model has {}",
                        cols,
                        layout.len()
                    ));
                }
                status = Some(*stat);
                objective = obj.parse::<f64>().ok();
            }
            ["j", col, value] => match (col.parse::<usize>(), value.parse::<f64>()) {
                (Ok(col), Ok(value)) if (1..=layout.len()).contains(&col) => {
                    values[col - 1] = value;
                }
                _ => return SolveResult::error(format!("malformed column line: {}", line)),
            },
            _ => {}
        }
    }

    let assignment = Assignment::from_values(*layout, values);
    match (status, assignment) {
        (Some("o"), Some(a)) => SolveResult::optimal(a, objective.unwrap_or(f64::NAN)),
        (Some("n"), _) => SolveResult::status(SolveStatus::Infeasible),
        (Some("f"), a) if time_limit_hit(log) => SolveResult {
            status: SolveStatus::Timeout,
            assignment: a,
            objective_value: objective,
            diagnostic: Some(tail(log)),
        },
        (Some("u"), _) if time_limit_hit(log) => {
            SolveResult::status(SolveStatus::Timeout).with_diagnostic(tail(log))
        }
        (Some(other), _) => SolveResult::error(format!("glpsol solution status '{}': {}", other, tail(log))),
        (None, _) => SolveResult::error("solution file has no status line"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPTIMAL: &str = "c Problem:\n\
                           c Rows: 7\n\
                           s mip 7 6 o 3.5\n\
                           i 1 1\n\
                           j 1 0\n\
                           j 2 1\n\
                           j 3 0\n\
                           j 4 0\n\
                           j 5 0\n\
                           j 6 3.5\n\
                           e o f\n";

    #[test]
    fn test_parse_optimal() {
        let layout = VariableLayout::new(2, 1);
        let r = parse_solution(OPTIMAL, &layout, "");
        assert_eq!(r.status, SolveStatus::Optimal);
        assert_eq!(r.objective_value, Some(3.5));
        let a = r.assignment.expect("assignment");
        assert_eq!(a.arc(0, 1, 0), 1.0);
        assert_eq!(a.arrival(1, 0), 3.5);
    }

    #[test]
    fn test_parse_infeasible() {
        let layout = VariableLayout::new(2, 1);
        let r = parse_solution("s mip 7 6 n 0\ne o f\n", &layout, "");
        assert_eq!(r.status, SolveStatus::Infeasible);
        assert!(r.assignment.is_none());
    }

    #[test]
    fn test_parse_feasible_after_time_limit() {
        let layout = VariableLayout::new(2, 1);
        let text = OPTIMAL.replace(" o 3.5", " f 3.5");
        let r = parse_solution(&text, &layout, "TIME LIMIT EXCEEDED; SEARCH TERMINATED\n");
        assert_eq!(r.status, SolveStatus::Timeout);
        assert!(r.assignment.is_some());
    }

    #[test]
    fn test_parse_column_mismatch() {
        let layout = VariableLayout::new(3, 1);
        let r = parse_solution(OPTIMAL, &layout, "");
        assert_eq!(r.status, SolveStatus::Error);
    }

    #[test]
    fn test_parse_missing_status() {
        let layout = VariableLayout::new(2, 1);
        let r = parse_solution("j 1 0\n", &layout, "");
        assert_eq!(r.status, SolveStatus::Error);
    }

    #[test]
    fn test_classify_log() {
        assert_eq!(
            classify_log("PROBLEM HAS NO PRIMAL FEASIBLE SOLUTION\n").status,
            SolveStatus::Infeasible
        );
        assert_eq!(classify_log("TIME LIMIT EXCEEDED\n").status, SolveStatus::Timeout);
        assert_eq!(classify_log("glp_intopt: error\n").status, SolveStatus::Error);
    }

    #[test]
    fn test_missing_program_is_error() {
        use crate::config::ModelConfig;
        use crate::formulation::build_model;
        use crate::test_utils::line_instance;

        let inst = line_instance(&[1.0], 1, 10.0, 10.0);
        let model = build_model(&inst, &ModelConfig::default()).expect("builds");
        let solver = GlpkSolver::new().with_program("/nonexistent/u-cvrptw-glpsol");
        let r = solver.solve(&model, &SolveOptions::default());
        assert_eq!(r.status, SolveStatus::Error);
        assert!(r.diagnostic.is_some());
    }

    #[test]
    #[ignore = "needs glpsol on PATH"]
    fn test_glpsol_solves_line_instance() {
        use crate::config::RunConfig;
        use crate::run::run;
        use crate::test_utils::line_instance;

        let inst = line_instance(&[3.0, 4.0], 1, 20.0, 20.0);
        let r = run(&inst, &RunConfig::default(), &GlpkSolver::new()).expect("glpsol runs");
        assert_eq!(r.status, SolveStatus::Optimal);
        let objective = r.objective_value.expect("objective");
        assert!((objective - 3.0).abs() < 1e-6);
        assert!(r.solution.is_valid());
        assert_eq!(r.solution.routes()[0].nodes(), vec![0, 1, 2, 3]);
    }

    #[test]
    #[ignore = "needs glpsol on PATH"]
    fn test_glpsol_reports_infeasible() {
        use crate::config::RunConfig;
        use crate::run::run;
        use crate::test_utils::line_instance;

        let inst = line_instance(&[10.0, 10.0], 1, 15.0, 100.0);
        let r = run(&inst, &RunConfig::default(), &GlpkSolver::new()).expect("glpsol runs");
        assert!(r.is_infeasible());
    }
}
