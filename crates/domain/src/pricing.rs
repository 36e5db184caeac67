//! Price aggregation shared by the catalog and the cart.

use crate::money::Money;

/// Sums the unit prices of a pizza's ingredient references.
///
/// A reference that no longer resolves (`None`) contributes zero.
/// Returns `None` if the sum does not fit in an amount.
pub fn recipe_price<I>(unit_prices: I) -> Option<Money>
where
    I: IntoIterator<Item = Option<Money>>,
{
    Money::checked_sum(unit_prices.into_iter().flatten())
}

/// Price of `quantity` units at `unit_price`, or `None` on overflow.
pub fn line_total(unit_price: Money, quantity: u32) -> Option<Money> {
    unit_price.checked_multiply(quantity)
}

/// Σ quantity × unit price over `(unit_price, quantity)` pairs.
///
/// Returns `None` if any line total or the running sum overflows.
pub fn order_total<I>(lines: I) -> Option<Money>
where
    I: IntoIterator<Item = (Money, u32)>,
{
    lines
        .into_iter()
        .try_fold(Money::zero(), |total, (unit_price, quantity)| {
            total.checked_add(line_total(unit_price, quantity)?)
        })
}
