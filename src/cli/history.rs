use super::ui;
use crate::core::analytics::{self, PriceChangeRow, SortKey, SortOrder};
use crate::core::error::Result as CoreResult;
use crate::core::{Coin, PriceProvider, PriceRecord};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Attribute, Cell, Table};

#[derive(Debug, Clone)]
pub struct HistoryOptions {
    pub rows: usize,
    /// Jump to the page holding this date; forces newest-first ordering.
    pub date: Option<NaiveDate>,
    pub sort: SortKey,
    pub order: SortOrder,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        HistoryOptions {
            rows: 10,
            date: None,
            sort: SortKey::Date,
            order: SortOrder::Desc,
        }
    }
}

/// One page of history rows.
#[derive(Debug)]
pub struct HistoryView {
    pub rows: Vec<PriceChangeRow>,
    pub offset: usize,
    pub total: usize,
    /// Index within `rows` of the requested date, if found.
    pub highlight: Option<usize>,
}

/// Changes are always measured against the chronologically previous samples;
/// sorting only changes the order rows are shown in.
pub fn build_view(history: &[PriceRecord], options: &HistoryOptions) -> CoreResult<HistoryView> {
    let newest_first = analytics::descending(history);
    let mut rows = analytics::price_changes(&newest_first)?;

    let (key, order) = if options.date.is_some() {
        (SortKey::Date, SortOrder::Desc)
    } else {
        (options.sort, options.order)
    };
    rows.sort_by(|a, b| analytics::compare_records(&a.record, &b.record, key, order));

    let page_size = options.rows.max(1);
    let position = options
        .date
        .and_then(|date| analytics::position_of_date(&newest_first, date));
    let offset = position.map_or(0, |p| p / page_size * page_size);
    let total = rows.len();

    Ok(HistoryView {
        rows: rows.into_iter().skip(offset).take(page_size).collect(),
        offset,
        total,
        highlight: position.map(|p| p - offset),
    })
}

fn build_table(view: &HistoryView) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Price (EUR)"),
        ui::header_cell("vs previous day"),
        ui::header_cell("vs previous week"),
    ]);

    for (i, row) in view.rows.iter().enumerate() {
        let mut date = Cell::new(row.record.timestamp().format("%Y-%m-%d").to_string());
        if view.highlight == Some(i) {
            date = date.add_attribute(Attribute::Reverse);
        }
        table.add_row(vec![
            date,
            ui::eur_cell(row.record.price()),
            ui::change_cell(row.day),
            ui::change_cell(row.week),
        ]);
    }
    table
}

pub async fn run(provider: &dyn PriceProvider, coin: Coin, options: &HistoryOptions) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Fetching {coin} price history..."));
    let history = provider.fetch_price_history(coin).await;
    spinner.finish_and_clear();

    let view = build_view(&history?, options)?;

    println!(
        "{}",
        ui::style_text(&format!("{coin} Price History"), ui::StyleType::Title)
    );
    if let (Some(date), None) = (options.date, view.highlight) {
        println!(
            "{}",
            ui::style_text(&format!("No price sample on {date}"), ui::StyleType::Error)
        );
    }
    println!("{}", build_table(&view));

    let shown_to = view.offset + view.rows.len();
    let shown_from = if view.rows.is_empty() { 0 } else { view.offset + 1 };
    println!(
        "{}",
        ui::style_text(
            &format!("Rows {shown_from}-{shown_to} of {}", view.total),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}
