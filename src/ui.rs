//! Terminal output helpers for the CLI.

use crate::core::setting::ExchangeSetting;
use crate::sync::SyncReport;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;

/// Creates a new `comfy_table::Table` with standard styling.
fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn status_cell(setting: &ExchangeSetting) -> Cell {
    let text = setting.status.to_string();
    if setting.is_enabled() {
        Cell::new(text).fg(Color::Green)
    } else {
        Cell::new(text).fg(Color::DarkGrey)
    }
}

pub fn render_settings_table(settings: &[ExchangeSetting]) -> String {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Currency"),
        header_cell("Rate"),
        header_cell("Mode"),
        header_cell("Status"),
        header_cell("Id"),
    ]);

    for setting in settings {
        table.add_row(vec![
            Cell::new(setting.currency_code.to_uppercase()),
            Cell::new(format!("{:.6}", setting.exchange_rate))
                .set_alignment(CellAlignment::Right),
            Cell::new(setting.mode.to_string()),
            status_cell(setting),
            Cell::new(&setting.id),
        ]);
    }

    table.to_string()
}

pub fn render_sync_report(report: &SyncReport) -> String {
    let eligible = report
        .eligible_currencies
        .iter()
        .map(|c| c.to_uppercase())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{}\n\nBase currency: {}\nEligible currencies: {}\nVariants updated: {}\nVariants skipped: {}",
        style("Price sync complete").bold().underlined(),
        style(report.base_currency.to_uppercase()).bold(),
        eligible,
        style(report.variants_updated.to_string()).green().bold(),
        style(report.variants_skipped.to_string()).dim(),
    )
}
