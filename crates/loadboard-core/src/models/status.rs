//! Enumerations for batch actions and driver classification.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The kind of bulk operation applied to a set of orders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderAction {
    /// Cancel the orders on the host
    Delete,

    /// Update the orders in place
    Modify,

    /// Post new orders derived from the selected ones
    Clone,
}

impl OrderAction {
    /// All actions, in the order the UI lists them.
    pub const ALL: [OrderAction; 3] = [OrderAction::Delete, OrderAction::Modify, OrderAction::Clone];

    /// Wire name used as the prefix of notification events.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::Delete => "delete",
            OrderAction::Modify => "modify",
            OrderAction::Clone => "clone",
        }
    }

    /// Whether the action needs a change set to run.
    pub fn requires_changes(&self) -> bool {
        !matches!(self, OrderAction::Delete)
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "delete" => Ok(OrderAction::Delete),
            "modify" => Ok(OrderAction::Modify),
            "clone" => Ok(OrderAction::Clone),
            _ => Err(format!("Invalid order action: {s}")),
        }
    }
}

/// Driver crew classification of an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum DriverType {
    Solo,
    Team,
}

impl DriverType {
    /// TEAM iff more than one driver is assigned.
    pub fn for_driver_count(count: usize) -> Self {
        if count > 1 {
            DriverType::Team
        } else {
            DriverType::Solo
        }
    }
}
