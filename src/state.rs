use std::sync::Arc;

use anyhow::Result;

use crate::data::filter::FilterCriteria;
use crate::data::model::{Dataset, Value};
use crate::view::{self, DashboardView};

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Sales,
    Customers,
    Financials,
    OrderDates,
    DeliveryDates,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Sales,
        Tab::Customers,
        Tab::Financials,
        Tab::OrderDates,
        Tab::DeliveryDates,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Sales => "Sales Analysis",
            Tab::Customers => "Customer Behavior",
            Tab::Financials => "Financial Metrics",
            Tab::OrderDates => "Order Dates",
            Tab::DeliveryDates => "Delivery Dates",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which part of the filter a selector edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded once at startup, shared read-only.
    pub dataset: Arc<Dataset>,

    /// Current year/month/day selection.
    criteria: FilterCriteria,

    /// Figures for `criteria`; rebuilt whenever it changes.
    view: DashboardView,

    /// Selected tab in the analysis section.
    pub tab: Tab,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, criteria: FilterCriteria) -> Result<Self> {
        let view = view::render(&dataset, &criteria)?;
        Ok(Self {
            dataset,
            criteria,
            view,
            tab: Tab::default(),
        })
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    /// Change one part of the selection and recompute the view if it differs.
    /// On error the previous selection and view are kept.
    pub fn select(&mut self, part: DatePart, value: Value) -> Result<()> {
        let mut criteria = self.criteria.clone();
        let slot = match part {
            DatePart::Year => &mut criteria.year,
            DatePart::Month => &mut criteria.month,
            DatePart::Day => &mut criteria.day,
        };
        if *slot == value {
            return Ok(());
        }
        *slot = value;

        self.view = view::render(&self.dataset, &criteria)?;
        self.criteria = criteria;
        log::info!(
            "Filter {} / {} / {}: {} orders",
            self.criteria.year,
            self.criteria.month,
            self.criteria.day,
            self.view.shape.rows
        );
        Ok(())
    }
}
