//! Error types for the Payroll Element Calculation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during payroll calculation.

use thiserror::Error;

/// The main error type for the Payroll Element Calculation Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// Eligibility outcomes (a gratuity claim below the tenure threshold, an
/// insurance contribution above the wage ceiling) are *not* errors; the
/// statutory calculators return them as normal results carrying an
/// applicability flag and a reason string.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ElementNotFound {
///     code: "hra".to_string(),
/// };
/// assert_eq!(error.to_string(), "Salary element not found: hra");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A formula could not be parsed or evaluated.
    #[error("Formula error in '{expression}': {message}")]
    Formula {
        /// The offending expression text.
        expression: String,
        /// A description of the parse or evaluation failure.
        message: String,
    },

    /// The element dependency graph contains a cycle.
    #[error("Circular dependency detected: {}", cycle.join(" -> "))]
    CircularDependency {
        /// The full cycle path, first node repeated at the end.
        cycle: Vec<String>,
    },

    /// A salary element code was not found in the configuration snapshot.
    #[error("Salary element not found: {code}")]
    ElementNotFound {
        /// The element code that was not found.
        code: String,
    },

    /// A rule's formula payload is malformed for its rule type.
    #[error("Invalid rule configuration for element '{element_code}': {message}")]
    InvalidRuleConfiguration {
        /// The element the rule belongs to.
        element_code: String,
        /// A description of what is malformed.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParse {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
