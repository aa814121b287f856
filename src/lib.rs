//! Payroll Element Calculation Engine
//!
//! This crate computes payroll element amounts for a population of employees by
//! combining per-employee configuration (salary elements), jurisdiction-specific
//! statutory rules (contribution ceilings, tax slabs, special-case months), and
//! time-varying inputs (attendance, leave, overtime) into a deterministic map of
//! earnings, deductions and contributions that must survive audit.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod formula;
pub mod models;
