//! Driver model as listed by the host.

use serde::{Deserialize, Serialize};

/// A driver registered with the carrier account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Identifier used in an order's driver list
    pub latest_transient_driver_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub email_id: String,
}

impl Driver {
    /// Only active drivers can be assigned to orders.
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    /// Full name for listings.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
