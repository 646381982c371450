#![allow(dead_code)]

use products_crm::{DealId, DealStore, NewDeal, StageId};
use rust_decimal::Decimal;

/// Two-deal pipeline: A(100, lead, 25) and B(200, proposal, 70).
pub struct TwoDeals {
    pub store: DealStore,
    pub a: DealId,
    pub b: DealId,
}

impl TwoDeals {
    pub fn new() -> Self {
        let mut store = DealStore::new();
        let a = store
            .create(NewDeal::new("A", "Acme", Decimal::from(100)))
            .unwrap()
            .id;
        let b = store
            .create(
                NewDeal::new("B", "Beta", Decimal::from(200))
                    .with_stage(StageId::Proposal)
                    .with_probability(70),
            )
            .unwrap()
            .id;
        Self { store, a, b }
    }
}

/// Store holding `count` lead deals, ids 1..=count.
pub fn store_with_leads(count: usize) -> DealStore {
    let mut store = DealStore::new();
    for n in 0..count {
        store
            .create(NewDeal::new(format!("Deal {n}"), "Acme", Decimal::from(1_000)))
            .unwrap();
    }
    store
}
