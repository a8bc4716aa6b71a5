//! Mixed-integer formulation of the CVRPTW.
//!
//! # Model
//!
//! Binary `x[i,j,k]` selects the arc `i→j` for vehicle `k`; continuous
//! `s[i,k] ≥ 0` is the arrival time of vehicle `k` at node `i`. The depot is
//! indexed twice, node `0` as the route origin and node `N-1` as the route
//! terminus, which keeps every constraint family uniform.
//!
//! Families, in emission order:
//!
//! - single visit: `Σ_j Σ_k x[i,j,k] = 1` per customer
//! - depot departure / return: one arc out of `0` and one into `N-1` per vehicle
//! - flow conservation: `Σ_i x[i,h,k] = Σ_j x[h,j,k]` per customer and vehicle
//! - weight / volume capacity per vehicle
//! - time propagation: `s[i,k] + service(i) + time(i,j) - M·(1 - x[i,j,k]) ≤ s[j,k]`
//! - window lower / upper bounds, optionally gated by visit
//! - no self-loop: `Σ_k x[i,i,k] = 0`
//! - depot direction: no arc into `0`, none out of `N-1`
//!
//! Objective: minimize `Σ distance(i,j)·x[i,j,k]`.
//!
//! The time-propagation constraints also exclude sub-tours whenever every
//! leg takes positive time; zero-time cycles are caught by the decoder.

mod assignment;
mod builder;
mod expr;
mod lp_format;
mod variables;

pub use assignment::Assignment;
pub use builder::{build_model, build_model_from_data, safe_big_m, Model};
pub use expr::{Constraint, ConstraintFamily, LinExpr, Sense};
pub use variables::{VarId, VarKind, Variable, VariableLayout};
