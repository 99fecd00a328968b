use chrono::{DateTime, Datelike, Duration, FixedOffset};

use super::value_objects::{Order, OrderStatus};

/// Placement window relative to "now" in the operator's timezone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlacedWithin {
    #[default]
    Any,
    Today,
    /// Since the start of the current week (Sunday)
    ThisWeek,
    ThisMonth,
}

impl std::str::FromStr for PlacedWithin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "all" => Ok(PlacedWithin::Any),
            "today" => Ok(PlacedWithin::Today),
            "week" | "this-week" => Ok(PlacedWithin::ThisWeek),
            "month" | "this-month" => Ok(PlacedWithin::ThisMonth),
            other => Err(format!("unknown placement window: {other}")),
        }
    }
}

/// Order list filter: free-text search, status, placement window.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub placed: PlacedWithin,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order, now: DateTime<FixedOffset>) -> bool {
        self.matches_search(order) && self.matches_status(order) && self.matches_placed(order, now)
    }

    pub fn apply(&self, orders: &[Order], now: DateTime<FixedOffset>) -> Vec<Order> {
        orders
            .iter()
            .filter(|order| self.matches(order, now))
            .cloned()
            .collect()
    }

    fn matches_search(&self, order: &Order) -> bool {
        let term = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => term.to_lowercase(),
            _ => return true,
        };

        order.id.to_string().contains(&term) || order.customer_id.to_string().contains(&term)
    }

    fn matches_status(&self, order: &Order) -> bool {
        match self.status {
            Some(status) => order.status_id == status.id(),
            None => true,
        }
    }

    fn matches_placed(&self, order: &Order, now: DateTime<FixedOffset>) -> bool {
        let placed = order.created_at.with_timezone(&now.timezone()).date_naive();
        let today = now.date_naive();

        match self.placed {
            PlacedWithin::Any => true,
            PlacedWithin::Today => placed == today,
            PlacedWithin::ThisWeek => {
                let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
                placed >= week_start
            }
            PlacedWithin::ThisMonth => placed.year() == today.year() && placed.month() == today.month(),
        }
    }
}
