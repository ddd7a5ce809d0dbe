//! Collection wrapper types for displaying mirrored records.

use std::fmt;

use jiff::tz::TimeZone;

use super::datetime::LocalDateTime;
use crate::{
    models::{Driver, Order, WorkOpportunity},
    region::{format_stem_time, trim_number},
};

/// Orders listed in the order given, with times shown in `time_zone`.
pub struct Orders {
    pub orders: Vec<Order>,
    pub time_zone: TimeZone,
}

impl Orders {
    pub fn new(orders: Vec<Order>, time_zone: TimeZone) -> Self {
        Self { orders, time_zone }
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    fn fmt_order(&self, order: &Order, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if order.alias.is_empty() {
            writeln!(f, "### {}", order.id)?;
        } else {
            writeln!(f, "### {} ({})", order.id, order.alias)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "- Window: {} to {}",
            LocalDateTime::new(&order.start_time, &self.time_zone),
            LocalDateTime::new(&order.end_time, &self.time_zone)
        )?;
        writeln!(
            f,
            "- Min payout: {:.2} {}",
            order.total_cost.value, order.total_cost.unit
        )?;
        writeln!(
            f,
            "- Rate: {:.2} {}/{}",
            order.cost_per_distance.value,
            order.cost_per_distance.currency_unit,
            order.cost_per_distance.distance_unit
        )?;
        writeln!(
            f,
            "- Stem time: {}",
            format_stem_time(order.min_pick_up_buffer_in_minutes)
        )?;
        writeln!(f, "- Max stops: {}", order.max_number_of_stops)?;
        writeln!(
            f,
            "- Radius: {} {} origin, {} {} destination",
            trim_number(order.origin_city_radius.value),
            order.origin_city_radius.unit,
            trim_number(order.destination_city_radius.value),
            order.destination_city_radius.unit
        )?;
        if order.supply_transient_driver_id_list.is_empty() {
            writeln!(f, "- Drivers: none")?;
        } else {
            writeln!(
                f,
                "- Drivers: {}",
                order.supply_transient_driver_id_list.join(", ")
            )?;
        }
        if let Some(status) = &order.status {
            writeln!(f, "- Status: {status}")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Orders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.orders.is_empty() {
            return writeln!(f, "No orders in the mirror.");
        }
        for order in &self.orders {
            self.fmt_order(order, f)?;
        }
        Ok(())
    }
}

/// Drivers as a bullet list with their transient ids.
pub struct Drivers(pub Vec<Driver>);

impl fmt::Display for Drivers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No active drivers in the mirror.");
        }
        for driver in &self.0 {
            write!(f, "- **{}** `{}`", driver.full_name(), driver.latest_transient_driver_id)?;
            if !driver.email_id.is_empty() {
                write!(f, " {}", driver.email_id)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Work opportunities with their window, payout, and distance.
pub struct WorkOpportunities {
    pub items: Vec<WorkOpportunity>,
    pub time_zone: TimeZone,
}

impl WorkOpportunities {
    pub fn new(items: Vec<WorkOpportunity>, time_zone: TimeZone) -> Self {
        Self { items, time_zone }
    }
}

impl fmt::Display for WorkOpportunities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return writeln!(f, "No work opportunities in the mirror.");
        }
        for item in &self.items {
            writeln!(f, "### {}", item.id)?;
            writeln!(f)?;
            if let (Some(start), Some(end)) = (&item.first_pickup_time, &item.last_delivery_time) {
                writeln!(
                    f,
                    "- Window: {} to {}",
                    LocalDateTime::new(start, &self.time_zone),
                    LocalDateTime::new(end, &self.time_zone)
                )?;
            }
            if let Some(payout) = &item.payout {
                writeln!(f, "- Payout: {:.2} {}", payout.value, payout.unit)?;
            }
            if let Some(distance) = &item.total_distance {
                writeln!(
                    f,
                    "- Distance: {} {}",
                    trim_number(distance.value),
                    distance.unit
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
