//! Parameter structures for loadboard operations.
//!
//! These are the framework-free inputs shared by every front end. The CLI
//! wraps them in its own clap structs and converts with `From`; a host-page
//! integration can deserialize them straight from an event payload.

use serde::{Deserialize, Serialize};

use crate::{
    changes::ChangeSet,
    error::{LoadboardError, Result},
    models::{Order, OrderAction, MAX_DRIVERS},
};

/// A batch operation over a set of orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// What to do with every order
    pub action: OrderAction,
    /// The orders, as last seen on the host
    pub orders: Vec<Order>,
    /// Field changes; required for modify and clone, ignored for delete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<ChangeSet>,
}

impl BatchRequest {
    pub fn new(action: OrderAction, orders: Vec<Order>) -> Self {
        Self {
            action,
            orders,
            changes: None,
        }
    }

    pub fn with_changes(mut self, changes: ChangeSet) -> Self {
        self.changes = Some(changes);
        self
    }

    /// Checks the request before any record is attempted.
    ///
    /// # Errors
    ///
    /// * `LoadboardError::InvalidInput` - When there are no orders
    /// * `LoadboardError::InvalidInput` - When modify or clone has no change set
    /// * `LoadboardError::InvalidInput` - When modify has a change set that
    ///   alters nothing
    pub fn validate(&self) -> Result<()> {
        if self.orders.is_empty() {
            return Err(LoadboardError::invalid_input("orders")
                .with_reason(format!("No orders selected to {}", self.action)));
        }

        if self.action.requires_changes() {
            let Some(changes) = &self.changes else {
                return Err(LoadboardError::invalid_input("changes")
                    .with_reason(format!("A change set is required to {}", self.action)));
            };
            if self.action == OrderAction::Modify && changes.is_empty() {
                return Err(LoadboardError::invalid_input("changes")
                    .with_reason("Modify needs at least one field to change"));
            }
        }

        Ok(())
    }

    /// Change set to apply; delete ignores it and clone treats a missing one
    /// as empty after validation.
    pub(crate) fn changes_or_default(&self) -> ChangeSet {
        self.changes.clone().unwrap_or_default()
    }
}

/// Picks orders out of a list by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectOrders {
    /// Order ids to pick, in the order they should be processed
    #[serde(default)]
    pub ids: Vec<String>,
    /// Pick every order instead
    #[serde(default)]
    pub all: bool,
}

impl SelectOrders {
    /// Resolves the selection against `orders`.
    ///
    /// # Errors
    ///
    /// Returns `LoadboardError::InvalidInput` for an id that is not present,
    /// or when nothing is selected.
    pub fn resolve(&self, orders: &[Order]) -> Result<Vec<Order>> {
        let selected: Vec<Order> = if self.all {
            orders.to_vec()
        } else {
            self.ids
                .iter()
                .map(|id| {
                    orders
                        .iter()
                        .find(|order| &order.id == id)
                        .cloned()
                        .ok_or_else(|| {
                            LoadboardError::invalid_input("ids")
                                .with_reason(format!("Order {id} is not in the mirror"))
                        })
                })
                .collect::<Result<_>>()?
        };

        if selected.is_empty() {
            return Err(LoadboardError::invalid_input("ids").with_reason("No orders selected"));
        }
        Ok(selected)
    }
}

/// Form values for posting a truck against a work opportunity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTruck {
    /// Mirrored work opportunity to copy the time window from
    pub work_opportunity_id: String,
    /// Minimum payout; the opportunity payout when absent
    #[serde(default)]
    pub min_payout: Option<String>,
    /// Minimum price per distance unit
    #[serde(default)]
    pub min_price_per_distance: Option<String>,
    /// Stem time in minutes; "none" or absent keeps the default buffer
    #[serde(default)]
    pub stem_time: Option<String>,
    /// Drivers to assign; at most two are kept
    #[serde(default)]
    pub driver_ids: Vec<String>,
}

impl PostTruck {
    /// Driver ids with blanks removed and the list capped.
    pub fn drivers(&self) -> Vec<String> {
        self.driver_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .take(MAX_DRIVERS)
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::sample_order;

    #[test]
    fn test_validate_rejects_empty_orders() {
        let request = BatchRequest::new(OrderAction::Delete, Vec::new());
        match request.validate() {
            Err(LoadboardError::InvalidInput { field, .. }) => assert_eq!(field, "orders"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_delete_ignores_changes() {
        let request = BatchRequest::new(OrderAction::Delete, vec![sample_order("a")]);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_modify_requires_changes() {
        let request = BatchRequest::new(OrderAction::Modify, vec![sample_order("a")]);
        assert!(request.validate().is_err());

        let empty = request.clone().with_changes(ChangeSet::default());
        match empty.validate() {
            Err(LoadboardError::InvalidInput { field, reason }) => {
                assert_eq!(field, "changes");
                assert!(reason.contains("at least one field"));
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }

        let real = request.with_changes(ChangeSet {
            max_stops: Some("2".to_string()),
            ..ChangeSet::default()
        });
        assert!(real.validate().is_ok());
    }

    #[test]
    fn test_validate_clone_accepts_empty_change_set() {
        let request = BatchRequest::new(OrderAction::Clone, vec![sample_order("a")])
            .with_changes(ChangeSet::default());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_select_orders() {
        let orders = vec![sample_order("a"), sample_order("b"), sample_order("c")];

        let picked = SelectOrders {
            ids: vec!["c".to_string(), "a".to_string()],
            all: false,
        }
        .resolve(&orders)
        .unwrap();
        let ids: Vec<&str> = picked.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);

        let all = SelectOrders {
            ids: Vec::new(),
            all: true,
        }
        .resolve(&orders)
        .unwrap();
        assert_eq!(all.len(), 3);

        assert!(SelectOrders {
            ids: vec!["zzz".to_string()],
            all: false,
        }
        .resolve(&orders)
        .is_err());
        assert!(SelectOrders::default().resolve(&orders).is_err());
    }

    #[test]
    fn test_post_truck_drivers_capped() {
        let form = PostTruck {
            driver_ids: vec![" d1 ".to_string(), String::new(), "d2".to_string(), "d3".to_string()],
            ..PostTruck::default()
        };
        assert_eq!(form.drivers(), vec!["d1", "d2"]);
    }
}
