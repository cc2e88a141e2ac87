//! Price allocation across color lines and extended-price validation.

use rust_decimal::Decimal;

use super::rules::colors::ColorToken;
use super::rules::normalize::round_cents;
use crate::models::invoice::LineItem;
use crate::models::warning::Warning;

/// Split an extended price across shipped quantities.
///
/// Every share but the last is rounded to cents; the last share takes the
/// exact remainder, so the shares always sum to `ext_price`. When nothing
/// shipped every share is zero.
pub fn allocate(ext_price: Decimal, quantities: &[u32]) -> Vec<Decimal> {
    let total: u32 = quantities.iter().sum();
    if total == 0 {
        return vec![Decimal::ZERO; quantities.len()];
    }

    let total = Decimal::from(total);
    let mut shares = Vec::with_capacity(quantities.len());
    let mut assigned = Decimal::ZERO;

    for (i, qty) in quantities.iter().enumerate() {
        if i + 1 == quantities.len() {
            shares.push(ext_price - assigned);
        } else {
            let share = round_cents(ext_price * Decimal::from(*qty) / total);
            assigned += share;
            shares.push(share);
        }
    }

    shares
}

/// Warn when quantity times unit price disagrees with the extended price.
pub fn check_ext_price(
    qty: u32,
    unit_price: Decimal,
    ext_price: Decimal,
    tolerance: Decimal,
) -> Option<Warning> {
    let calculated = round_cents(Decimal::from(qty) * unit_price);
    if (calculated - ext_price).abs() >= tolerance {
        Some(Warning::PriceMismatch {
            calculated,
            parsed: ext_price,
        })
    } else {
        None
    }
}

/// One line item per color, sharing the template's description, item id
/// and unit price.
pub fn split_line_items(
    template: &LineItem,
    colors: &[ColorToken],
    ext_price: Decimal,
    tolerance: Decimal,
) -> Vec<LineItem> {
    let quantities: Vec<u32> = colors.iter().map(|c| c.shipped).collect();
    let shares = allocate(ext_price, &quantities);

    colors
        .iter()
        .zip(shares)
        .map(|(color, share)| {
            let mut item = template.clone();
            item.color = color.color.clone();
            item.qty_shipped = color.shipped;
            item.qty_ordered = color.ordered();
            item.ext_price = share;

            if color.backordered > 0 {
                item.add_warning(Warning::Backordered(color.backordered));
            }
            if let Some(warning) = check_ext_price(color.shipped, item.unit_price, share, tolerance) {
                item.add_warning(warning);
            }
            item
        })
        .collect()
}

/// A single line item for an item without color information.
///
/// Here a disagreeing extended price is replaced by quantity times unit
/// price, and the substitution is noted.
pub fn single_line_item(
    template: &LineItem,
    qty_ordered: u32,
    qty_shipped: u32,
    ext_price: Decimal,
    tolerance: Decimal,
) -> LineItem {
    let mut item = template.clone();
    item.color.clear();
    item.qty_ordered = qty_ordered.max(qty_shipped);
    item.qty_shipped = qty_shipped;
    item.ext_price = ext_price;

    if item.backordered() > 0 {
        item.add_warning(Warning::Backordered(item.backordered()));
    }
    item.add_warning(Warning::NoColorInformation);

    let calculated = round_cents(Decimal::from(qty_shipped) * item.unit_price);
    if calculated > Decimal::ZERO && (calculated - ext_price).abs() >= tolerance {
        item.ext_price = calculated;
        item.add_warning(Warning::ExtPriceSubstituted {
            calculated,
            parsed: ext_price,
        });
    }

    item
}
