//! SPS Validator - Check SciELO PS article packages before registration.
//!
//! This crate reads JATS/SciELO PS article XML into an owned [`Article`]
//! model and reconciles a package of articles with the documents already
//! registered for the issue, producing a [`PackageReport`] of findings.
//!
//! # Example
//!
//! ```
//! use sps_validator::config;
//! use sps_validator::Order;
//!
//! // Orders are five digits, taken from the sequence id or the first page
//! assert!(config::validate_order("00012").is_ok());
//! assert_eq!(Order::derive(None, Some("301")).as_str(), "00301");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants, field lists and validation
//! - [`types`]: Severity, dates and language-tagged text
//! - [`error`]: Error types and Result alias
//! - [`xml`]: Node view over a parsed document and XML utilities
//! - [`entities`]: Extractors for contributors, affiliations, titles, references and tables
//! - [`citation`]: Compaction of citation ranges
//! - [`article`]: The article model and its construction
//! - [`reconcile`]: Batch reconciliation engine and report
//! - [`package`]: Loading package files from disk
//! - [`cli`]: Command-line interface

pub mod article;
pub mod citation;
pub mod cli;
pub mod config;
pub mod entities;
pub mod error;
pub mod package;
pub mod reconcile;
pub mod types;
pub mod xml;

// Re-export commonly used items
pub use article::{Article, Order};
pub use config::{ValidationMode, ValidatorConfig};
pub use error::{Result, ValidatorError};
pub use package::Package;
pub use reconcile::{Finding, PackageReport, ReconciliationEngine};
pub use types::Severity;
