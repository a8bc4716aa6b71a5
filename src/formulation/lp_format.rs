//! CPLEX LP text export.
//!
//! Every column is listed in the objective (zero coefficients included) in
//! layout order, so solvers that number columns by first appearance number
//! them exactly like [`VarId`](super::VarId).

use std::io::{self, Write};

use super::{LinExpr, Model, VarId, VarKind};

const TERMS_PER_LINE: usize = 8;

impl Model {
    /// Writes the model in CPLEX LP format.
    pub fn write_lp<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let layout = self.layout();
        writeln!(
            out,
            "\\ CVRPTW: {} nodes, {} vehicles, big-M {}",
            layout.num_nodes(),
            layout.num_vehicles(),
            self.big_m()
        )?;

        writeln!(out, "Minimize")?;
        let mut dense = vec![0.0; layout.len()];
        for &(var, coeff) in self.objective().terms() {
            dense[var.index()] += coeff;
        }
        write!(out, " obj:")?;
        let terms: Vec<(VarId, f64)> = layout.ids().zip(dense).collect();
        self.write_terms(out, &terms)?;
        writeln!(out)?;

        writeln!(out, "Subject To")?;
        for c in self.constraints() {
            write!(out, " {}:", c.name())?;
            self.write_expr(out, c.lhs())?;
            writeln!(out, " {} {}", c.sense(), c.rhs())?;
        }

        writeln!(out, "Binary")?;
        for id in layout.ids().filter(|&id| layout.kind(id) == VarKind::Binary) {
            writeln!(out, " {}", layout.name(id))?;
        }
        writeln!(out, "End")
    }

    /// The model as a CPLEX LP string.
    pub fn to_lp_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_lp(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn write_expr<W: Write>(&self, out: &mut W, expr: &LinExpr) -> io::Result<()> {
        if expr.terms().is_empty() {
            return write!(out, " 0 {}", self.layout().name(VarId(0)));
        }
        self.write_terms(out, expr.terms())
    }

    fn write_terms<W: Write>(&self, out: &mut W, terms: &[(VarId, f64)]) -> io::Result<()> {
        for (n, &(var, coeff)) in terms.iter().enumerate() {
            if n > 0 && n % TERMS_PER_LINE == 0 {
                write!(out, "\n   ")?;
            }
            let sign = if coeff < 0.0 { '-' } else { '+' };
            write!(out, " {} {} {}", sign, coeff.abs(), self.layout().name(var))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ModelConfig;
    use crate::formulation::build_model;
    use crate::test_utils::line_instance;

    #[test]
    fn test_sections_in_order() {
        let inst = line_instance(&[1.0], 1, 10.0, 10.0);
        let model = build_model(&inst, &ModelConfig::default()).expect("builds");
        let lp = model.to_lp_string();
        let min = lp.find("Minimize").expect("objective");
        let st = lp.find("Subject To").expect("constraints");
        let bin = lp.find("Binary").expect("binaries");
        let end = lp.rfind("End").expect("end");
        assert!(min < st && st < bin && bin < end);
    }

    #[test]
    fn test_constraint_lines() {
        let inst = line_instance(&[1.0], 1, 10.0, 10.0);
        let model = build_model(&inst, &ModelConfig::default()).expect("builds");
        let lp = model.to_lp_string();
        assert!(lp.contains(" single_visit_1: + 1 x_1_0_0 + 1 x_1_1_0 + 1 x_1_2_0 = 1\n"));
        assert!(lp.contains(" depot_return_0: + 1 x_0_2_0 + 1 x_1_2_0 + 1 x_2_2_0 = 1\n"));
        assert!(lp.contains(" x_2_2_0\n"));
        assert!(!lp.contains(" s_0_0\n"));
    }

    #[test]
    fn test_objective_lists_every_column_in_order() {
        let inst = line_instance(&[1.0], 2, 10.0, 10.0);
        let model = build_model(&inst, &ModelConfig::default()).expect("builds");
        let lp = model.to_lp_string();
        let start = lp.find(" obj:").expect("objective");
        let end = lp.find("Subject To").expect("constraints");
        let names: Vec<&str> = lp[start..end]
            .split_whitespace()
            .filter(|t| t.starts_with("x_") || t.starts_with("s_"))
            .collect();
        let expected: Vec<String> = model.layout().ids().map(|id| model.layout().name(id)).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_negative_coefficients() {
        let inst = line_instance(&[1.0], 1, 10.0, 10.0);
        let model = build_model(&inst, &ModelConfig::default()).expect("builds");
        let lp = model.to_lp_string();
        assert!(lp.contains(" flow_1_0: + 1 x_0_1_0 + 1 x_2_1_0 - 1 x_1_0_0 - 1 x_1_2_0 = 0\n"));
    }

    #[test]
    fn test_rows_name_each_column_once() {
        let inst = line_instance(&[1.0, 2.0], 2, 10.0, 10.0);
        let model = build_model(&inst, &ModelConfig::default()).expect("builds");
        let lp = model.to_lp_string();
        let start = lp.find("Subject To").expect("constraints");
        let end = lp.find("Binary").expect("binaries");

        // A row may wrap onto continuation lines starting with spaces only.
        let mut rows: Vec<String> = Vec::new();
        for line in lp[start..end].lines().skip(1) {
            if line.starts_with("   ") {
                if let Some(last) = rows.last_mut() {
                    last.push_str(line);
                }
            } else {
                rows.push(line.to_string());
            }
        }
        assert_eq!(rows.len(), model.num_constraints());

        for row in &rows {
            let mut names: Vec<&str> = row
                .split_whitespace()
                .filter(|t| t.starts_with("x_") || t.starts_with("s_"))
                .collect();
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), total, "column repeated in row: {}", row);
        }
        assert!(lp.contains(" depot_direction_0: + 1 x_0_0_0 + 1 x_1_0_0 + 1 x_2_0_0 + 2 x_3_0_0"));
    }
}
