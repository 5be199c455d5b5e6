use super::ui;
use crate::core::analytics;
use crate::core::error::{CoreError, Result as CoreResult};
use crate::core::{Coin, PortfolioEntry, PortfolioStore, PriceProvider};
use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::{Cell, CellAlignment, Table};
use rust_decimal::Decimal;
use tracing::info;

/// Fields to change on an existing entry. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct EntryEdit {
    pub amount: Option<Decimal>,
    pub purchase_price: Option<Decimal>,
    pub currency: Option<Coin>,
}

impl EntryEdit {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.purchase_price.is_none() && self.currency.is_none()
    }

    /// Edited copy of `entry`, validated before it is sent anywhere.
    pub fn apply(&self, entry: &PortfolioEntry) -> CoreResult<PortfolioEntry> {
        let mut edited = entry.clone();
        if let Some(amount) = self.amount {
            edited.amount = amount;
        }
        if let Some(price) = self.purchase_price {
            edited.purchase_price = price;
        }
        if let Some(coin) = self.currency {
            edited.currency = coin;
        }
        edited.validate()?;
        Ok(edited)
    }
}

fn entries_table(entries: &[PortfolioEntry]) -> CoreResult<Table> {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Coin"),
        ui::header_cell("Amount"),
        ui::header_cell("Purchase Price"),
        ui::header_cell("Value"),
        ui::header_cell("Purchased"),
    ]);

    for entry in entries {
        table.add_row(vec![
            ui::format_optional_cell(entry.id, |id| id.to_string()),
            Cell::new(entry.currency.to_string()),
            Cell::new(entry.amount.normalize().to_string()).set_alignment(CellAlignment::Right),
            ui::eur_cell(entry.purchase_price),
            ui::eur_cell(analytics::entry_value(entry)?),
            Cell::new(&entry.purchase_time),
        ]);
    }
    Ok(table)
}

fn balances_table(entries: &[PortfolioEntry]) -> CoreResult<Table> {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Coin"), ui::header_cell("Invested")]);
    for (coin, value) in analytics::balance_by_coin(entries)? {
        table.add_row(vec![Cell::new(coin.to_string()), ui::eur_cell(value)]);
    }
    Ok(table)
}

fn print_total(total: Decimal) {
    println!(
        "{} {}",
        ui::style_text("Total value:", ui::StyleType::TotalLabel),
        ui::style_text(&format!("€{:.2}", total.round_dp(2)), ui::StyleType::TotalValue)
    );
}

pub async fn list(store: &dyn PortfolioStore) -> Result<()> {
    let spinner = ui::new_spinner("Loading portfolio...");
    let entries = store.list_all().await;
    let total = store.total_value().await;
    spinner.finish_and_clear();

    let entries = entries?;
    println!("{}", ui::style_text("Portfolio", ui::StyleType::Title));
    if entries.is_empty() {
        println!(
            "{}",
            ui::style_text("No purchases recorded yet", ui::StyleType::Subtle)
        );
    } else {
        println!("{}", entries_table(&entries)?);
    }

    println!("{}", ui::style_text("Wallet", ui::StyleType::Title));
    println!("{}", balances_table(&entries)?);
    print_total(total?);
    Ok(())
}

pub async fn total(store: &dyn PortfolioStore) -> Result<()> {
    print_total(store.total_value().await?);
    Ok(())
}

/// Records a purchase of `eur_to_spend` worth of `coin` at the current spot
/// price.
pub async fn buy(
    prices: &dyn PriceProvider,
    store: &dyn PortfolioStore,
    coin: Coin,
    eur_to_spend: Decimal,
) -> Result<PortfolioEntry> {
    let spot = prices.fetch_spot_prices().await?;
    let price = spot
        .get(coin)
        .with_context(|| format!("No spot price available for {coin}"))?;

    let entry = PortfolioEntry::purchase(coin, eur_to_spend, price, Utc::now())?;
    let saved = store.create(&entry).await?;
    info!(id = ?saved.id, %coin, "Recorded purchase");

    println!(
        "Bought {} {} for €{:.2} at €{:.2}",
        saved.amount.round_dp(8),
        coin.symbol(),
        eur_to_spend.round_dp(2),
        saved.purchase_price.round_dp(2)
    );
    Ok(saved)
}

/// Applies `edit` to entry `id`. The stored entry is looked up first so the
/// unchanged fields are sent back as they are.
pub async fn update(store: &dyn PortfolioStore, id: i64, edit: &EntryEdit) -> Result<PortfolioEntry> {
    if edit.is_empty() {
        anyhow::bail!("Nothing to update, pass --amount, --price or --coin");
    }

    let entries = store.list_all().await?;
    let current = entries
        .iter()
        .find(|e| e.id == Some(id))
        .ok_or_else(|| CoreError::InvalidEntry(format!("no portfolio entry with id {id}")))?;

    let edited = edit.apply(current)?;
    let saved = store.update(id, &edited).await?;
    info!(id, "Updated portfolio entry");
    println!("Updated entry {id}");
    Ok(saved)
}

pub async fn delete(store: &dyn PortfolioStore, id: i64) -> Result<()> {
    store.delete(id).await?;
    info!(id, "Deleted portfolio entry");
    println!("Deleted entry {id}");
    Ok(())
}
