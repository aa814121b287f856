//! Configuration for the payroll engine.
//!
//! Two kinds of configuration feed the engine: statutory constant tables
//! (contribution rates, ceilings, slab tables, levy schedules) and the
//! element/rule definitions. Both are plain data, so adding or editing them
//! requires no code change. Configuration can be loaded from a YAML directory
//! or constructed fully in memory.

mod loader;
mod registry;
mod types;

pub use loader::ConfigLoader;
pub use registry::ElementRegistry;
pub use types::{
    BonusConfig, GratuityConfig, InsuranceConfig, ProvidentFundConfig, StatutoryConfig, TaxSlab,
    WelfareLevyEntry,
};
