use super::ui;
use crate::core::analytics::{self, Change};
use crate::core::{Coin, PriceProvider, PriceRecord, SpotPrices};
use anyhow::Result;
use comfy_table::{Cell, Table};
use futures::future::join_all;
use tracing::debug;

/// Latest day and week change for a coin, from its ascending history.
fn latest_changes(history: &[PriceRecord]) -> (Option<Change>, Option<Change>) {
    let newest_first = analytics::descending(history);
    match analytics::price_changes(&newest_first[..newest_first.len().min(8)]) {
        Ok(rows) => rows
            .first()
            .map_or((None, None), |row| (row.day, row.week)),
        Err(e) => {
            debug!("Cannot compute latest changes: {}", e);
            (None, None)
        }
    }
}

pub fn build_table(spot: &SpotPrices, histories: &[(Coin, Option<Vec<PriceRecord>>)]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Coin"),
        ui::header_cell("Price (EUR)"),
        ui::header_cell("24h"),
        ui::header_cell("7d"),
    ]);

    for (coin, history) in histories {
        let (day, week) = history
            .as_deref()
            .map_or((None, None), latest_changes);
        table.add_row(vec![
            Cell::new(format!("{} ({})", coin, coin.symbol())),
            ui::format_optional_cell(spot.get(*coin), |p| format!("€{p}")),
            ui::change_cell(day),
            ui::change_cell(week),
        ]);
    }
    table
}

pub async fn run(provider: &dyn PriceProvider) -> Result<()> {
    let spinner = ui::new_spinner("Fetching prices...");
    let spot = provider.fetch_spot_prices().await;
    // History only feeds the change columns, so a missing series is not fatal.
    let histories: Vec<(Coin, Option<Vec<PriceRecord>>)> =
        join_all(Coin::ALL.iter().map(|coin| async move {
            let history = provider.fetch_price_history(*coin).await;
            if let Err(e) = &history {
                debug!("History unavailable for {}: {}", coin, e);
            }
            (*coin, history.ok())
        }))
        .await;
    spinner.finish_and_clear();

    let spot = spot?;
    println!("{}", ui::style_text("Current Prices", ui::StyleType::Title));
    println!("{}", build_table(&spot, &histories));
    Ok(())
}
