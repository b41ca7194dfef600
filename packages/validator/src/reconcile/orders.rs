//! Order and file name reconciliation against the registered issue.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::article::{Article, Order, SummaryField};
use crate::config::ValidationMode;

use super::compare::compare_articles;
use super::consistency::unique_value_severity;
use super::report::{NameChangeRequest, NewDocument, OrderChangeRequest, OrderEvent, OrderSlot};

/// Change requests found in a package and the order table they produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderReconciliation {
    pub order_changes: Vec<OrderChangeRequest>,
    pub name_changes: Vec<NameChangeRequest>,
    pub new_documents: Vec<NewDocument>,
    pub resulting_orders: Vec<OrderSlot>,
}

/// Work out which incoming documents change an order, change a file name
/// or are new, then apply everything to the registered order table.
///
/// Documents marked to delete only remove themselves from the table.
pub fn reconcile_orders(
    registered: &BTreeMap<String, Article>,
    incoming: &BTreeMap<String, Article>,
    mode: ValidationMode,
    threshold: f64,
) -> OrderReconciliation {
    // first registered name per order
    let mut registered_orders: BTreeMap<&Order, &str> = BTreeMap::new();
    for (name, article) in registered {
        registered_orders.entry(&article.order).or_insert(name.as_str());
    }

    let mut result = OrderReconciliation::default();

    for (name, article) in incoming.iter().filter(|(_, a)| !a.marked_to_delete) {
        if let Some(previous) = registered.get(name) {
            if previous.order == article.order {
                continue;
            }
            let outcome = compare_articles(previous, article, threshold);
            debug!(
                name = name.as_str(),
                previous = %previous.order,
                requested = %article.order,
                approved = outcome.approved,
                "Order change requested"
            );
            result.order_changes.push(OrderChangeRequest {
                name: name.clone(),
                previous: previous.order.clone(),
                requested: article.order.clone(),
                approved: outcome.approved,
                severity: outcome.severity,
                differences: outcome.differences,
            });
        } else if let Some(&previous_name) = registered_orders.get(&article.order) {
            let outcome = compare_articles(&registered[previous_name], article, threshold);
            debug!(
                name = name.as_str(),
                previous_name,
                order = %article.order,
                approved = outcome.approved,
                "File name change requested"
            );
            result.name_changes.push(NameChangeRequest {
                name: name.clone(),
                previous_name: previous_name.to_string(),
                order: article.order.clone(),
                approved: outcome.approved,
                severity: outcome.severity,
                differences: outcome.differences,
            });
        } else {
            result.new_documents.push(NewDocument {
                name: name.clone(),
                order: article.order.clone(),
            });
        }
    }

    result.resulting_orders = resulting_orders(registered, incoming, &result, mode);
    result
}

#[derive(Default)]
struct SlotBuilder {
    names: Vec<String>,
    history: Vec<OrderEvent>,
}

fn resulting_orders(
    registered: &BTreeMap<String, Article>,
    incoming: &BTreeMap<String, Article>,
    requests: &OrderReconciliation,
    mode: ValidationMode,
) -> Vec<OrderSlot> {
    let mut slots: BTreeMap<Order, SlotBuilder> = BTreeMap::new();

    for (name, article) in registered {
        let slot = slots.entry(article.order.clone()).or_default();
        slot.names.push(name.clone());
        slot.history.push(OrderEvent::Registered { name: name.clone() });
    }

    for (name, article) in incoming.iter().filter(|(_, a)| a.marked_to_delete) {
        if let Some(slot) = slots.get_mut(&article.order) {
            remove_name(slot, name);
        }
    }

    for change in &requests.name_changes {
        let Some(slot) = slots.get_mut(&change.order) else {
            continue;
        };
        if change.approved {
            for held in slot.names.iter_mut().filter(|n| **n == change.previous_name) {
                held.clone_from(&change.name);
            }
            slot.history.push(OrderEvent::FilenameChanged {
                previous: change.previous_name.clone(),
                current: change.name.clone(),
            });
        } else {
            slot.history.push(OrderEvent::UnableToChangeFilename {
                previous: change.previous_name.clone(),
                current: change.name.clone(),
                severity: change.severity,
                differences: change.differences.clone(),
            });
        }
    }

    for change in &requests.order_changes {
        if !change.approved {
            slots
                .entry(change.previous.clone())
                .or_default()
                .history
                .push(OrderEvent::UnableToChangeOrder {
                    name: change.name.clone(),
                    previous: change.previous.clone(),
                    current: change.requested.clone(),
                    severity: change.severity,
                    differences: change.differences.clone(),
                });
            continue;
        }

        let event = OrderEvent::OrderChanged {
            name: change.name.clone(),
            previous: change.previous.clone(),
            current: change.requested.clone(),
        };
        let previous_slot = slots.entry(change.previous.clone()).or_default();
        remove_name(previous_slot, &change.name);
        previous_slot.history.push(event.clone());

        let new_slot = slots.entry(change.requested.clone()).or_default();
        new_slot.names.push(change.name.clone());
        new_slot.history.push(event);
    }

    for document in &requests.new_documents {
        let slot = slots.entry(document.order.clone()).or_default();
        slot.names.push(document.name.clone());
        slot.history.push(OrderEvent::NewFilenameAndOrder {
            name: document.name.clone(),
            order: document.order.clone(),
        });
    }

    let severity = unique_value_severity(SummaryField::Order, mode);
    slots
        .into_iter()
        .map(|(order, slot)| OrderSlot {
            severity: (slot.names.len() > 1).then_some(severity),
            order,
            names: slot.names,
            history: slot.history,
        })
        .collect()
}

fn remove_name(slot: &mut SlotBuilder, name: &str) {
    if let Some(position) = slot.names.iter().position(|n| n == name) {
        slot.names.remove(position);
        slot.history.push(OrderEvent::Excluded {
            name: name.to_string(),
        });
    } else {
        slot.history.push(OrderEvent::NotFoundToExclude {
            name: name.to_string(),
        });
    }
}
