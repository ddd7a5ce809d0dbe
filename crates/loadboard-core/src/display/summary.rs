//! Summary of the changes a modify or clone is about to apply.

use std::fmt;

use crate::{
    changes::{ChangeSet, DriverDirective},
    models::OrderAction,
    region::{format_stem_time, DomainInfo},
};

/// Markdown summary of a change set, shown before a batch starts.
///
/// Only fields the change set alters are listed. A clone also shows how many
/// orders will be created.
pub struct ChangesSummary<'a> {
    pub changes: &'a ChangeSet,
    pub action: OrderAction,
    pub selected_count: usize,
    pub domain: DomainInfo,
}

impl<'a> ChangesSummary<'a> {
    pub fn new(
        changes: &'a ChangeSet,
        action: OrderAction,
        selected_count: usize,
        domain: DomainInfo,
    ) -> Self {
        Self {
            changes,
            action,
            selected_count,
            domain,
        }
    }

    fn money(&self, raw: &str) -> String {
        match raw.trim().parse::<f64>() {
            Ok(value) => format!(
                "{} {}",
                self.domain.format_currency(value),
                self.domain.region.currency()
            ),
            Err(_) => raw.to_string(),
        }
    }

    fn distance(&self, raw: &str) -> String {
        match raw.trim().parse::<f64>() {
            Ok(value) => self.domain.format_distance(value),
            Err(_) => format!("{raw} {}", self.domain.unit.label()),
        }
    }

    /// `(label, value)` for every altered field, in form order.
    fn lines(&self) -> Vec<(String, String)> {
        let c = self.changes;
        let unit = self.domain.unit.label().trim_end_matches('s');
        let mut lines = Vec::new();
        let mut push = |label: &str, value: Option<String>| {
            if let Some(value) = value {
                lines.push((label.to_string(), value));
            }
        };

        push("Start", present(&c.start_date_time).map(str::to_string));
        push("End", present(&c.end_date_time).map(str::to_string));
        push("Min payout", present(&c.min_payout).map(|v| self.money(v)));
        push(
            &format!("Price/{unit}"),
            present(&c.min_price_per_mile).map(|v| self.money(v)),
        );
        push(
            "Stem time",
            present(&c.stem_time).map(|v| match v.trim().parse::<u32>() {
                Ok(minutes) => format_stem_time(minutes),
                Err(_) => v.to_string(),
            }),
        );
        push("Stops", present(&c.max_stops).map(str::to_string));
        push("Origin", present(&c.origin_radius).map(|v| self.distance(v)));
        push(
            "Destination",
            present(&c.destination_radius).map(|v| self.distance(v)),
        );
        push(
            "Drivers",
            match &c.drivers {
                DriverDirective::Keep => None,
                DriverDirective::Clear => Some("cleared".to_string()),
                DriverDirective::Assign(ids) => Some(ids.join(", ")),
            },
        );
        lines
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty() && !v.trim().eq_ignore_ascii_case("none"))
}

impl fmt::Display for ChangesSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self.action {
            OrderAction::Clone => "Clone details",
            _ => "Changes to apply",
        };
        writeln!(f, "## {title}")?;
        writeln!(f)?;

        let lines = self.lines();
        if lines.is_empty() && self.action != OrderAction::Clone {
            return writeln!(f, "No changes.");
        }
        for (label, value) in lines {
            writeln!(f, "- {label}: **{value}**")?;
        }
        if self.action == OrderAction::Clone {
            writeln!(f, "- Orders: **{}**", self.selected_count)?;
        }
        Ok(())
    }
}
