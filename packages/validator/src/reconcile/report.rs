//! Structured results of a package validation.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::article::Order;
use crate::config::ValidationMode;
use crate::types::Severity;

use super::affiliations::AffiliationTally;
use super::compare::FieldDifference;
use super::pages::PageCheck;
use super::references::ReferenceOverview;

/// Documents sharing one value of a field. `None` groups documents lacking it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueGroup {
    pub value: Option<String>,
    pub documents: Vec<String>,
}

/// A registered document asking for a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderChangeRequest {
    pub name: String,
    pub previous: Order,
    pub requested: Order,
    pub approved: bool,
    pub severity: Severity,
    pub differences: Vec<FieldDifference>,
}

/// An incoming name taking the order of a registered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameChangeRequest {
    pub name: String,
    pub previous_name: String,
    pub order: Order,
    pub approved: bool,
    pub severity: Severity,
    pub differences: Vec<FieldDifference>,
}

/// An incoming name at an order no registered document uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDocument {
    pub name: String,
    pub order: Order,
}

/// Something that happened to an order slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum OrderEvent {
    Registered {
        name: String,
    },
    Excluded {
        name: String,
    },
    NotFoundToExclude {
        name: String,
    },
    FilenameChanged {
        previous: String,
        current: String,
    },
    UnableToChangeFilename {
        previous: String,
        current: String,
        severity: Severity,
        differences: Vec<FieldDifference>,
    },
    OrderChanged {
        name: String,
        previous: Order,
        current: Order,
    },
    UnableToChangeOrder {
        name: String,
        previous: Order,
        current: Order,
        severity: Severity,
        differences: Vec<FieldDifference>,
    },
    NewFilenameAndOrder {
        name: String,
        order: Order,
    },
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered { name } => write!(f, "registered: {name}"),
            Self::Excluded { name } => write!(f, "mark to exclude: {name}"),
            Self::NotFoundToExclude { name } => write!(f, "not found to exclude: {name}"),
            Self::FilenameChanged { previous, current } => {
                write!(f, "filename changed: {previous} to {current}")
            }
            Self::UnableToChangeFilename {
                previous,
                current,
                severity,
                ..
            } => write!(
                f,
                "{severity}: unable to change filename: {previous} to {current}"
            ),
            Self::OrderChanged {
                name,
                previous,
                current,
            } => write!(f, "order changed: {previous} to {current} ({name})"),
            Self::UnableToChangeOrder {
                name,
                previous,
                current,
                severity,
                ..
            } => write!(
                f,
                "{severity}: unable to change order: {previous} to {current} ({name})"
            ),
            Self::NewFilenameAndOrder { name, order } => {
                write!(f, "new filename and order: {name} and {order}")
            }
        }
    }
}

/// Names holding one order once every request is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSlot {
    pub order: Order,
    pub names: Vec<String>,
    pub history: Vec<OrderEvent>,
    /// Set when more than one name holds the order.
    pub severity: Option<Severity>,
}

/// Values of a field that must be unique but are shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub field: String,
    pub severity: Severity,
    pub groups: Vec<ValueGroup>,
}

/// A field that should be the same in every document but is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictGroup {
    pub field: String,
    pub severity: Severity,
    pub groups: Vec<ValueGroup>,
}

/// A required field missing from some documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingValue {
    pub field: String,
    pub documents: Vec<String>,
}

/// How the issue is being published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PackageFlags {
    pub is_aop_issue: bool,
    pub is_rolling_pass: bool,
    pub is_processed_in_batches: bool,
}

/// Area of the package a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingCategory {
    InvalidXml,
    Orders,
    Uniqueness,
    CommonValues,
    RequiredValues,
    Pages,
    Affiliations,
    References,
}

impl FindingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidXml => "invalid-xml",
            Self::Orders => "orders",
            Self::Uniqueness => "uniqueness",
            Self::CommonValues => "common-values",
            Self::RequiredValues => "required-values",
            Self::Pages => "pages",
            Self::Affiliations => "affiliations",
            Self::References => "references",
        }
    }
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One flattened result line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub category: FindingCategory,
    pub severity: Severity,
    pub label: String,
    pub documents: Vec<String>,
    pub values: Vec<String>,
}

impl Finding {
    fn new(category: FindingCategory, severity: Severity, label: impl Into<String>) -> Self {
        Self {
            category,
            severity,
            label: label.into(),
            documents: Vec::new(),
            values: Vec::new(),
        }
    }

    #[must_use]
    fn with_documents(mut self, documents: impl IntoIterator<Item = String>) -> Self {
        self.documents.extend(documents);
        self
    }

    #[must_use]
    fn with_values(mut self, values: impl IntoIterator<Item = String>) -> Self {
        self.values.extend(values);
        self
    }
}

/// Counts of the severities that gate registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityRollup {
    pub blocking: usize,
    pub fatal: usize,
    pub error: usize,
}

impl SeverityRollup {
    pub fn gate_total(&self) -> usize {
        self.blocking + self.fatal + self.error
    }
}

/// Everything a validation pass produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageReport {
    pub mode: ValidationMode,
    pub flags: PackageFlags,
    pub documents: Vec<String>,
    pub unparsable: Vec<String>,
    pub order_changes: Vec<OrderChangeRequest>,
    pub name_changes: Vec<NameChangeRequest>,
    pub new_documents: Vec<NewDocument>,
    pub resulting_orders: Vec<OrderSlot>,
    pub duplicates: Vec<DuplicateGroup>,
    pub conflicts: Vec<ConflictGroup>,
    pub missing: Vec<MissingValue>,
    pub pages: Vec<PageCheck>,
    pub affiliations: AffiliationTally,
    pub references: ReferenceOverview,
}

fn unique_label(field: &str) -> String {
    format!("Unique value for {field} is required for all the documents in the package")
}

fn differences_values(differences: &[FieldDifference]) -> Vec<String> {
    differences
        .iter()
        .flat_map(|d| {
            [
                format!("{} (registered): {}", d.field, d.registered),
                format!("{} (in the package): {}", d.field, d.incoming),
            ]
        })
        .collect()
}

impl PackageReport {
    /// All results as a flat list, in a stable order.
    pub fn findings(&self) -> Vec<Finding> {
        let mut findings = Vec::new();

        if !self.unparsable.is_empty() {
            findings.push(
                Finding::new(
                    FindingCategory::InvalidXml,
                    Severity::Blocking,
                    "Invalid XML files",
                )
                .with_documents(self.unparsable.iter().cloned()),
            );
        }

        for change in &self.order_changes {
            let label = if change.approved {
                format!("order changed: {} to {}", change.previous, change.requested)
            } else {
                format!(
                    "Unable to change order: {} to {}",
                    change.previous, change.requested
                )
            };
            findings.push(
                Finding::new(FindingCategory::Orders, change.severity, label)
                    .with_documents([change.name.clone()])
                    .with_values(differences_values(&change.differences)),
            );
        }

        for change in &self.name_changes {
            let label = if change.approved {
                format!(
                    "filename changed: {} to {}",
                    change.previous_name, change.name
                )
            } else {
                format!(
                    "Unable to change filename: {} to {}",
                    change.previous_name, change.name
                )
            };
            findings.push(
                Finding::new(FindingCategory::Orders, change.severity, label)
                    .with_documents([change.previous_name.clone(), change.name.clone()])
                    .with_values(differences_values(&change.differences)),
            );
        }

        for slot in &self.resulting_orders {
            if let Some(severity) = slot.severity {
                findings.push(
                    Finding::new(FindingCategory::Orders, severity, unique_label("order"))
                        .with_documents(slot.names.iter().cloned())
                        .with_values([slot.order.to_string()]),
                );
            }
        }

        for duplicate in &self.duplicates {
            for group in &duplicate.groups {
                findings.push(
                    Finding::new(
                        FindingCategory::Uniqueness,
                        duplicate.severity,
                        unique_label(&duplicate.field),
                    )
                    .with_documents(group.documents.iter().cloned())
                    .with_values(group.value.clone()),
                );
            }
        }

        for conflict in &self.conflicts {
            let label = format!(
                "same value for {} is required for all the documents in the package",
                conflict.field
            );
            findings.push(
                Finding::new(FindingCategory::CommonValues, conflict.severity, label)
                    .with_documents(conflict.groups.iter().flat_map(|g| g.documents.clone()))
                    .with_values(conflict.groups.iter().map(|g| {
                        format!(
                            "{}: {}",
                            g.value.as_deref().unwrap_or("None"),
                            g.documents.join(", ")
                        )
                    })),
            );
        }

        for missing in &self.missing {
            findings.push(
                Finding::new(
                    FindingCategory::RequiredValues,
                    Severity::Blocking,
                    format!("missing {}", missing.field),
                )
                .with_documents(missing.documents.iter().cloned()),
            );
        }

        for check in &self.pages {
            for issue in &check.issues {
                findings.push(
                    Finding::new(FindingCategory::Pages, issue.severity, issue.kind.to_string())
                        .with_documents(issue.documents.iter().cloned())
                        .with_values(issue.values.iter().cloned()),
                );
            }
        }

        findings.extend(self.affiliations.findings());
        findings.extend(self.references.findings());
        findings
    }

    /// Number of findings per severity.
    pub fn counts(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for finding in self.findings() {
            *counts.entry(finding.severity).or_insert(0) += 1;
        }
        counts
    }

    pub fn rollup(&self) -> SeverityRollup {
        let counts = self.counts();
        let count = |severity: Severity| counts.get(&severity).copied().unwrap_or(0);
        SeverityRollup {
            blocking: count(Severity::Blocking),
            fatal: count(Severity::Fatal),
            error: count(Severity::Error),
        }
    }

    /// Blocking, fatal and error findings together.
    pub fn gate_total(&self) -> usize {
        self.rollup().gate_total()
    }

    /// Whether nothing stops the package from being registered.
    pub fn is_accepted(&self) -> bool {
        let rollup = self.rollup();
        rollup.blocking + rollup.fatal == 0
    }
}

impl Finding {
    pub(crate) fn affiliations(
        severity: Severity,
        label: &str,
        documents: impl IntoIterator<Item = String>,
    ) -> Self {
        Self::new(FindingCategory::Affiliations, severity, label).with_documents(documents)
    }

    pub(crate) fn references(
        severity: Severity,
        label: &str,
        values: impl IntoIterator<Item = String>,
    ) -> Self {
        Self::new(FindingCategory::References, severity, label).with_values(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn empty_report() -> PackageReport {
        PackageReport {
            mode: ValidationMode::Preview,
            flags: PackageFlags::default(),
            documents: Vec::new(),
            unparsable: Vec::new(),
            order_changes: Vec::new(),
            name_changes: Vec::new(),
            new_documents: Vec::new(),
            resulting_orders: Vec::new(),
            duplicates: Vec::new(),
            conflicts: Vec::new(),
            missing: Vec::new(),
            pages: Vec::new(),
            affiliations: AffiliationTally::default(),
            references: ReferenceOverview::default(),
        }
    }

    #[test]
    fn test_empty_report_has_no_findings() {
        let report = empty_report();
        assert!(report.findings().is_empty());
        assert_eq!(report.gate_total(), 0);
        assert!(report.is_accepted());
    }

    #[test]
    fn test_rollup_counts_gating_severities() {
        let mut report = empty_report();
        report.unparsable = vec!["broken".to_string()];
        report.missing = vec![MissingValue {
            field: "journal-title".to_string(),
            documents: vec!["a01".to_string()],
        }];
        report.duplicates = vec![DuplicateGroup {
            field: "fpage-lpage-seq-elocation-id".to_string(),
            severity: Severity::Error,
            groups: vec![ValueGroup {
                value: Some("1-9-None-None".to_string()),
                documents: vec!["a01".to_string(), "a02".to_string()],
            }],
        }];

        assert_eq!(
            report.rollup(),
            SeverityRollup {
                blocking: 2,
                fatal: 0,
                error: 1,
            }
        );
        assert_eq!(report.gate_total(), 3);
        assert!(!report.is_accepted());
    }

    #[test]
    fn test_duplicate_order_slot_is_one_finding() {
        let mut report = empty_report();
        report.resulting_orders = vec![OrderSlot {
            order: "00005".parse().unwrap(),
            names: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            history: vec![OrderEvent::Registered {
                name: "a".to_string(),
            }],
            severity: Some(Severity::Blocking),
        }];

        let findings = report.findings();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].documents, vec!["a", "b", "c"]);
        assert_eq!(findings[0].values, vec!["00005"]);
    }

    #[test]
    fn test_order_event_display() {
        let event = OrderEvent::OrderChanged {
            name: "a01".to_string(),
            previous: "00010".parse().unwrap(),
            current: "00011".parse().unwrap(),
        };
        assert_eq!(event.to_string(), "order changed: 00010 to 00011 (a01)");
    }
}
