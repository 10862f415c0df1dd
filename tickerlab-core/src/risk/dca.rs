//! Dollar-cost averaging.
//!
//! [`PositionAverager`] keeps running sums so the average after every fill is
//! exactly `sum(price * qty) / sum(qty)`, not a blend of previous averages.
//! [`plan_dca`] lays out buy levels for a fixed budget.

use serde::{Deserialize, Serialize};

/// An existing position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub price: f64,
    pub quantity: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionAverager {
    total_cost: f64,
    quantity: u64,
}

impl PositionAverager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_holding(holding: Holding) -> Self {
        let mut averager = Self::new();
        averager.add_fill(holding.price, holding.quantity);
        averager
    }

    /// Record a fill and return the new average price.
    pub fn add_fill(&mut self, price: f64, quantity: u64) -> Option<f64> {
        self.total_cost += price * quantity as f64;
        self.quantity += quantity;
        self.average_price()
    }

    /// `None` while no shares are held.
    pub fn average_price(&self) -> Option<f64> {
        (self.quantity > 0).then(|| self.total_cost / self.quantity as f64)
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcaLevel {
    pub price: f64,
    pub quantity: u64,
    pub cost: f64,
    /// Average price of the whole position after this level fills.
    pub average_price: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DcaPlan {
    pub levels: Vec<DcaLevel>,
    pub total_cost: f64,
    pub total_quantity: u64,
    pub final_average: Option<f64>,
}

/// Fallback spacing below the current price when supports run out.
const FALLBACK_STEP: f64 = 0.05;

/// Split `funds` equally across `levels` buy prices.
///
/// Buy prices are the support prices below `current_price`, nearest first.
/// Missing slots step down 5% at a time from the deepest support used (or
/// from `current_price` when there is none), so prices always descend.
/// Quantities are whole shares (floored). The average after each level
/// includes the existing holding and every earlier level.
pub fn plan_dca(
    holding: Option<Holding>,
    support_prices: &[f64],
    current_price: f64,
    funds: f64,
    levels: usize,
) -> DcaPlan {
    if levels == 0 || !(funds > 0.0) || !(current_price > 0.0) {
        return DcaPlan::default();
    }

    let mut below: Vec<f64> = support_prices
        .iter()
        .copied()
        .filter(|p| *p > 0.0 && *p < current_price)
        .collect();
    below.sort_by(|a, b| b.total_cmp(a));

    below.truncate(levels);
    let fallback_base = below.last().copied().unwrap_or(current_price);
    let per_level = funds / levels as f64;
    let mut averager = holding.map(PositionAverager::from_holding).unwrap_or_default();
    let mut plan = DcaPlan::default();

    for i in 0..levels {
        let price = below.get(i).copied().unwrap_or_else(|| {
            let step = (i + 1 - below.len()) as f64;
            fallback_base * (1.0 - FALLBACK_STEP * step)
        });
        let quantity = if price > 0.0 {
            (per_level / price).floor() as u64
        } else {
            0
        };
        let cost = quantity as f64 * price;
        let average_price = averager.add_fill(price, quantity);

        plan.total_cost += cost;
        plan.total_quantity += quantity;
        plan.levels.push(DcaLevel {
            price,
            quantity,
            cost,
            average_price,
        });
    }
    plan.final_average = averager.average_price();
    plan
}
