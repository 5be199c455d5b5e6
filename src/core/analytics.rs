//! Pure calculations over price series and portfolio entries.
use crate::core::error::{CoreError, Result};
use crate::core::portfolio::PortfolioEntry;
use crate::core::price::{Coin, PriceRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Offset between consecutive daily samples.
pub const DAY_OFFSET: usize = 1;
/// Offset to the sample one week earlier.
pub const WEEK_OFFSET: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Absolute and percentage difference against an earlier sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub amount: Decimal,
    pub percent: Decimal,
}

/// A history row with its day-over-day and week-over-week changes.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChangeRow {
    pub record: PriceRecord,
    pub day: Option<Change>,
    pub week: Option<Change>,
}

/// Percentage change of `series[index]` relative to `series[index + offset]`.
///
/// `series` must be newest-first, so a positive result means the price rose.
/// Returns `Ok(None)` when there is no sample `offset` rows further back.
pub fn change_from(series: &[PriceRecord], index: usize, offset: usize) -> Result<Option<Decimal>> {
    Ok(change_at(series, index, offset)?.map(|c| c.percent))
}

fn change_at(series: &[PriceRecord], index: usize, offset: usize) -> Result<Option<Change>> {
    let (Some(current), Some(previous)) = (
        series.get(index),
        index.checked_add(offset).and_then(|i| series.get(i)),
    ) else {
        return Ok(None);
    };

    let base = previous.price();
    if base <= Decimal::ZERO {
        return Err(CoreError::InvalidPrice(base));
    }

    let amount = current
        .price()
        .checked_sub(base)
        .ok_or(CoreError::InvalidPrice(current.price()))?;
    let percent = amount
        .checked_div(base)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(CoreError::InvalidPrice(base))?;
    Ok(Some(Change { amount, percent }))
}

/// Newest-first copy of an ascending series.
pub fn descending(series: &[PriceRecord]) -> Vec<PriceRecord> {
    series.iter().rev().cloned().collect()
}

/// Day and week changes for every row of a newest-first series.
pub fn price_changes(series: &[PriceRecord]) -> Result<Vec<PriceChangeRow>> {
    series
        .iter()
        .enumerate()
        .map(|(i, record)| {
            Ok(PriceChangeRow {
                record: record.clone(),
                day: change_at(series, i, DAY_OFFSET)?,
                week: change_at(series, i, WEEK_OFFSET)?,
            })
        })
        .collect()
}

pub fn compare_records(
    a: &PriceRecord,
    b: &PriceRecord,
    key: SortKey,
    order: SortOrder,
) -> Ordering {
    let ord = match key {
        SortKey::Date => a.timestamp().cmp(&b.timestamp()),
        SortKey::Price => a.price().cmp(&b.price()),
    };
    match order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    }
}

/// Stable sort of a copy of `series`.
pub fn sort_records(series: &[PriceRecord], key: SortKey, order: SortOrder) -> Vec<PriceRecord> {
    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| compare_records(a, b, key, order));
    sorted
}

/// Index of the first record that falls on `date` (UTC).
pub fn position_of_date(series: &[PriceRecord], date: NaiveDate) -> Option<usize> {
    series
        .iter()
        .position(|r| r.timestamp().date_naive() == date)
}

/// EUR value paid for an entry.
pub fn entry_value(entry: &PortfolioEntry) -> Result<Decimal> {
    entry
        .amount
        .checked_mul(entry.purchase_price)
        .ok_or_else(|| {
            CoreError::InvalidEntry(format!(
                "value of {} at {} is out of range",
                entry.amount, entry.purchase_price
            ))
        })
}

/// Summed purchase value per coin. Every coin is present, zero if unheld.
pub fn balance_by_coin(entries: &[PortfolioEntry]) -> Result<BTreeMap<Coin, Decimal>> {
    let mut balances: BTreeMap<Coin, Decimal> =
        Coin::ALL.iter().map(|c| (*c, Decimal::ZERO)).collect();
    for entry in entries {
        let value = entry_value(entry)?;
        let balance = balances.entry(entry.currency).or_insert(Decimal::ZERO);
        *balance = balance.checked_add(value).ok_or_else(|| {
            CoreError::InvalidEntry(format!("{} balance is out of range", entry.currency))
        })?;
    }
    Ok(balances)
}
