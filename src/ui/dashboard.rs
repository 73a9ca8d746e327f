use eframe::egui::{self, ScrollArea, Ui};

use super::{plot, tables};
use crate::data::model::{DISCOUNT_VALUE, ORDER_VALUE};
use crate::state::{AppState, Tab};
use crate::view::{format_currency, DashboardView, DateDistribution};

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the whole dashboard for the current selection.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let mut tab = state.tab;
            {
                let view = state.view();
                overview(ui, view);
                ui.add_space(12.0);
                distributions(ui, view);
                ui.add_space(12.0);
                tab_bar(ui, &mut tab);
                ui.separator();
                match tab {
                    Tab::Sales => sales(ui, view),
                    Tab::Customers => customers(ui, view),
                    Tab::Financials => financials(ui, view),
                    Tab::OrderDates => {
                        date_distribution(ui, "order", "Order Date Distribution", &view.order_dates)
                    }
                    Tab::DeliveryDates => date_distribution(
                        ui,
                        "delivery",
                        "Delivery Date Distribution",
                        &view.delivery_dates,
                    ),
                }
            }
            state.tab = tab;
        });
}

fn overview(ui: &mut Ui, view: &DashboardView) {
    ui.heading("Food Delivery Analysis Dashboard");
    ui.label(egui::RichText::new("Exploring Food Delivery Data").size(16.0));
    ui.label(
        "This dashboard provides insights into food delivery data over a period of 10 years. \
         The dataset contains information about orders, delivery times, and discounts offered.",
    );
    ui.add_space(8.0);

    ui.strong("Data Overview");
    ui.label(format!(
        "Dataset shape: Rows: {}, Columns: {}",
        view.shape.rows, view.shape.columns
    ));
    let names: Vec<&str> = view.columns.iter().map(|c| c.name.as_str()).collect();
    ui.label(format!("Columns: {}", names.join(", ")));

    egui::CollapsingHeader::new("View Sample Data")
        .id_salt("sample")
        .show(ui, |ui: &mut Ui| tables::sample_table(ui, &view.sample));
    egui::CollapsingHeader::new("View Data Description")
        .id_salt("describe")
        .show(ui, |ui: &mut Ui| tables::description_grid(ui, &view.description));
    egui::CollapsingHeader::new("View Data Types")
        .id_salt("dtypes")
        .show(ui, |ui: &mut Ui| tables::dtypes_grid(ui, &view.columns));
    egui::CollapsingHeader::new("View Unique Values")
        .id_salt("nunique")
        .show(ui, |ui: &mut Ui| tables::unique_counts_grid(ui, &view.unique_counts));
}

fn distributions(ui: &mut Ui, view: &DashboardView) {
    ui.heading("Data Distribution");
    ui.columns(2, |cols: &mut [Ui]| {
        if let [left, right] = cols {
            left.strong("Order Time Distribution");
            plot::frequency_bars(left, "order_hour_dist", &view.order_hours);
            right.strong("Delivery Time Distribution");
            plot::frequency_bars(right, "delivery_hour_dist", &view.delivery_hours);
        }
    });
    ui.strong("Discounts and Offers Distribution");
    plot::frequency_bars(ui, "discounts_dist", &view.discounts_and_offers);
}

fn tab_bar(ui: &mut Ui, tab: &mut Tab) {
    ui.horizontal(|ui: &mut Ui| {
        for candidate in Tab::ALL {
            ui.selectable_value(tab, candidate, candidate.label());
        }
    });
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

fn sales(ui: &mut Ui, view: &DashboardView) {
    ui.heading("Sales Performance");
    ui.columns(2, |cols: &mut [Ui]| {
        if let [left, right] = cols {
            left.strong("Total Order Value by Month");
            plot::grouped_sum_bars(left, "monthly_sales", &view.sales.order_value_by_month);
            right.strong("Orders by Day of Week");
            plot::frequency_bars_by_count(right, "daily_orders", &view.sales.orders_by_day);
        }
    });
    ui.strong("Orders by Hour of Day");
    plot::frequency_line(ui, "hourly_orders", &view.sales.orders_by_hour);
}

fn customers(ui: &mut Ui, view: &DashboardView) {
    ui.heading("Customer Behavior");
    ui.columns(2, |cols: &mut [Ui]| {
        if let [left, right] = cols {
            left.strong("Payment Method Distribution");
            plot::pie_chart(left, &view.customers.payment_methods);
            right.strong("Discount Source Distribution");
            plot::pie_chart(right, &view.customers.discount_sources);
        }
    });
    ui.strong("Impact of Discounts on Order Value");
    plot::scatter_with_trend(
        ui,
        "discount_impact",
        (DISCOUNT_VALUE, ORDER_VALUE),
        &view.customers.discount_vs_order_value,
        view.customers.discount_trend.as_ref(),
    );
}

fn financials(ui: &mut Ui, view: &DashboardView) {
    ui.heading("Financial Metrics");
    ui.columns(2, |cols: &mut [Ui]| {
        if let [left, right] = cols {
            plot::metric(
                left,
                "Total Delivery Fees",
                &format_currency(view.financials.total_delivery_fees),
            );
            plot::metric(
                right,
                "Total Commission Fees",
                &format_currency(view.financials.total_commission_fees),
            );
        }
    });
    ui.strong("Commission Percentage Distribution");
    plot::box_plot(
        ui,
        "commission_box",
        "commission_percentage",
        view.financials.commission_percentage.as_ref(),
    );
}

fn date_distribution(ui: &mut Ui, prefix: &str, title: &str, dates: &DateDistribution) {
    ui.strong(title);
    ui.columns(3, |cols: &mut [Ui]| {
        if let [years, months, days] = cols {
            plot::frequency_bars(years, &format!("{prefix}_years"), &dates.years);
            plot::frequency_bars(months, &format!("{prefix}_months"), &dates.months);
            plot::frequency_bars(days, &format!("{prefix}_days"), &dates.days);
        }
    });
}
