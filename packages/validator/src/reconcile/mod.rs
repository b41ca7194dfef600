//! Batch reconciliation of a package against the registered issue.
//!
//! The engine holds the registered and incoming documents of one issue and
//! produces a [`PackageReport`] in a single pass. It never fails: anything
//! wrong with the documents becomes a finding.

pub mod affiliations;
pub mod compare;
pub mod consistency;
pub mod orders;
pub mod pages;
pub mod references;
pub mod report;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::article::Article;
use crate::config::ValidatorConfig;

pub use affiliations::AffiliationTally;
pub use compare::{compare_articles, is_similar, normalize_text, ComparisonOutcome, FieldDifference};
pub use consistency::{
    conflicting_values, duplicated_values, missing_values, package_flags, unique_value_severity,
    value_groups,
};
pub use orders::{reconcile_orders, OrderReconciliation};
pub use pages::{check_pages, PageCheck, PageIssue, PageIssueKind};
pub use references::{ReferenceLocation, ReferenceOverview};
pub use report::{
    ConflictGroup, DuplicateGroup, Finding, FindingCategory, MissingValue, NameChangeRequest,
    NewDocument, OrderChangeRequest, OrderEvent, OrderSlot, PackageFlags, PackageReport,
    SeverityRollup, ValueGroup,
};

/// Reconciles the documents of a package with the registered issue.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use sps_validator::article::Article;
/// use sps_validator::config::ValidatorConfig;
/// use sps_validator::reconcile::ReconciliationEngine;
///
/// let xml = r#"<article article-type="research-article" xml:lang="en">
///   <front><article-meta>
///     <article-id pub-id-type="other">00001</article-id>
///     <volume>3</volume><issue>1</issue><fpage>1</fpage><lpage>9</lpage>
///   </article-meta></front>
/// </article>"#;
/// let article = Article::parse("a01", xml).unwrap();
/// let incoming = BTreeMap::from([("a01".to_string(), article)]);
///
/// let engine = ReconciliationEngine::new(BTreeMap::new(), incoming, ValidatorConfig::default());
/// let report = engine.validate();
/// assert_eq!(report.new_documents.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    registered: BTreeMap<String, Article>,
    incoming: BTreeMap<String, Article>,
    unparsable: Vec<String>,
    config: ValidatorConfig,
}

impl ReconciliationEngine {
    pub fn new(
        registered: BTreeMap<String, Article>,
        incoming: BTreeMap<String, Article>,
        config: ValidatorConfig,
    ) -> Self {
        Self {
            registered,
            incoming,
            unparsable: Vec::new(),
            config,
        }
    }

    /// Names of package files whose markup could not be parsed.
    #[must_use]
    pub fn with_unparsable(mut self, names: Vec<String>) -> Self {
        self.unparsable = names;
        self
    }

    /// Incoming documents that are not marked to delete.
    fn package_documents(&self) -> impl Iterator<Item = &Article> {
        self.incoming.values().filter(|a| !a.marked_to_delete)
    }

    /// Registered documents overlaid with the incoming ones.
    ///
    /// Documents marked to delete and the previous names of approved file
    /// name changes are left out, unless the package still carries a
    /// document under that previous name.
    pub fn merged(&self) -> Vec<&Article> {
        let orders = reconcile_orders(
            &self.registered,
            &self.incoming,
            self.config.mode,
            self.config.similarity_threshold,
        );
        self.merged_with(&orders)
    }

    fn merged_with(&self, orders: &OrderReconciliation) -> Vec<&Article> {
        let replaced: BTreeSet<&str> = orders
            .name_changes
            .iter()
            .filter(|change| change.approved)
            .map(|change| change.previous_name.as_str())
            .filter(|previous| !self.package_documents().any(|a| a.name == *previous))
            .chain(
                self.incoming
                    .values()
                    .filter(|a| a.marked_to_delete)
                    .map(|a| a.name.as_str()),
            )
            .collect();

        let mut merged: BTreeMap<&str, &Article> = self
            .registered
            .iter()
            .map(|(name, article)| (name.as_str(), article))
            .collect();
        merged.extend(self.package_documents().map(|a| (a.name.as_str(), a)));
        merged.retain(|name, _| !replaced.contains(name));
        merged.into_values().collect()
    }

    /// Run every check and collect the results.
    pub fn validate(&self) -> PackageReport {
        let mode = self.config.mode;
        let orders = reconcile_orders(
            &self.registered,
            &self.incoming,
            mode,
            self.config.similarity_threshold,
        );
        let merged = self.merged_with(&orders);
        debug!(
            registered = self.registered.len(),
            incoming = self.incoming.len(),
            merged = merged.len(),
            "Reconciling package"
        );

        let flags = package_flags(&merged);
        debug!(
            aop = flags.is_aop_issue,
            rolling_pass = flags.is_rolling_pass,
            "Package flags"
        );

        let duplicates = duplicated_values(&merged, mode);
        let conflicts = conflicting_values(&merged, &flags);
        let missing = missing_values(&merged);

        let mut by_order = merged.clone();
        by_order.sort_by(|a, b| (&a.order, &a.name).cmp(&(&b.order, &b.name)));
        let pages = check_pages(&by_order);

        let affiliations = AffiliationTally::compile(merged.iter().copied());
        let references = ReferenceOverview::compile(merged.iter().copied());

        let report = PackageReport {
            mode,
            flags,
            documents: merged.iter().map(|a| a.name.clone()).collect(),
            unparsable: self.unparsable.clone(),
            order_changes: orders.order_changes,
            name_changes: orders.name_changes,
            new_documents: orders.new_documents,
            resulting_orders: orders.resulting_orders,
            duplicates,
            conflicts,
            missing,
            pages,
            affiliations,
            references,
        };

        let rollup = report.rollup();
        info!(
            mode = %mode,
            documents = report.documents.len(),
            blocking = rollup.blocking,
            fatal = rollup.fatal,
            error = rollup.error,
            "Package validated"
        );
        report
    }
}
