//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading statutory
//! tables and element/rule definitions from YAML files. Loading from files is
//! a convenience for deployments that keep configuration in a directory;
//! callers with a configuration store build the same structures in memory and
//! construct an [`ElementRegistry`](super::ElementRegistry) directly.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::{PayrollElementRule, SalaryElement};

use super::registry::ElementRegistry;
use super::types::StatutoryConfig;

#[derive(Debug, Deserialize)]
struct ElementsFile {
    elements: Vec<SalaryElement>,
}

#[derive(Debug, Deserialize)]
struct RulesFile {
    rules: Vec<PayrollElementRule>,
}

/// Loads engine configuration from a directory of YAML files.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── statutory.yaml   # Statutory constant tables
/// ├── elements.yaml    # Salary element definitions
/// └── rules.yaml       # Payroll element rules
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// let registry = loader.registry();
/// assert!(registry.element("basic").is_some());
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    statutory: StatutoryConfig,
    registry: ElementRegistry,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound`/`ConfigParse` when a required file is missing
    /// or malformed, and `InvalidRuleConfiguration` when the element/rule
    /// records fail registry validation.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let statutory: StatutoryConfig = Self::load_yaml(&path.join("statutory.yaml"))?;
        let elements: ElementsFile = Self::load_yaml(&path.join("elements.yaml"))?;
        let rules: RulesFile = Self::load_yaml(&path.join("rules.yaml"))?;

        let registry = ElementRegistry::new(elements.elements, rules.rules)?;

        Ok(Self {
            statutory,
            registry,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParse {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the statutory constant tables.
    pub fn statutory(&self) -> &StatutoryConfig {
        &self.statutory
    }

    /// Returns the validated element registry.
    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Consumes the loader, returning its parts.
    pub fn into_parts(self) -> (StatutoryConfig, ElementRegistry) {
        (self.statutory, self.registry)
    }
}
