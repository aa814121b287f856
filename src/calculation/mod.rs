//! Statutory calculators and the attendance metrics aggregator.
//!
//! Each calculator is a pure function of (wage inputs, jurisdiction-specific
//! constant table, applicability flags) and returns a structured result; none
//! hold mutable state. Eligibility outcomes are normal results carrying an
//! applicability flag and a human-readable reason; a zero-valued statutory
//! result is always traceable to an explicit reason, never a silent coercion.

mod attendance_metrics;
mod bonus;
mod gratuity;
mod insurance_contribution;
mod provident_fund;
mod slab_tax;
mod welfare_levy;

pub use attendance_metrics::summarize_attendance;
pub use bonus::{calculate_bonus, BonusInput, BonusResult};
pub use gratuity::{calculate_gratuity, service_period, GratuityInput, GratuityResult, ServicePeriod};
pub use insurance_contribution::{
    calculate_insurance_contribution, check_ceiling_breach, InsuranceContributionResult,
};
pub use provident_fund::{calculate_provident_fund, ProvidentFundResult};
pub use slab_tax::{annual_slab_tax, monthly_slab_tax, SlabTaxResult};
pub use welfare_levy::{calculate_welfare_levy, WelfareLevyResult};
