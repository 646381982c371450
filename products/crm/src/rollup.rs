//! Financial rollups over a deal snapshot.
//!
//! Everything here is recomputed from scratch on each call.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::deal::Deal;
use crate::stage::StageId;

pub fn total_value(deals: &[Deal]) -> Decimal {
    deals.iter().map(|d| d.value).sum()
}

pub fn weighted_value(deals: &[Deal]) -> Decimal {
    deals.iter().map(Deal::weighted_value).sum()
}

/// Mean deal value; zero for an empty pipeline.
pub fn average_deal_size(deals: &[Deal]) -> Decimal {
    if deals.is_empty() {
        return Decimal::ZERO;
    }
    total_value(deals) / Decimal::from(deals.len())
}

pub fn stage_subtotal(deals: &[Deal], stage: StageId) -> Decimal {
    in_stage(deals, stage).map(|d| d.value).sum()
}

pub fn stage_weighted_value(deals: &[Deal], stage: StageId) -> Decimal {
    in_stage(deals, stage).map(Deal::weighted_value).sum()
}

pub fn stage_count(deals: &[Deal], stage: StageId) -> usize {
    in_stage(deals, stage).count()
}

fn in_stage(deals: &[Deal], stage: StageId) -> impl Iterator<Item = &Deal> {
    deals.iter().filter(move |d| d.stage == stage)
}

/// Headline numbers shown above the board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSummary {
    pub deal_count: usize,
    pub total_value: Decimal,
    pub weighted_value: Decimal,
    pub average_deal_size: Decimal,
}

impl PipelineSummary {
    pub fn of(deals: &[Deal]) -> Self {
        Self {
            deal_count: deals.len(),
            total_value: total_value(deals),
            weighted_value: weighted_value(deals),
            average_deal_size: average_deal_size(deals),
        }
    }
}
