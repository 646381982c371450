use products_crm::rollup::{average_deal_size, stage_count, stage_subtotal, total_value};
use products_crm::{Board, DealId, DealStore, NewDeal, StageId};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn stage_strategy() -> impl Strategy<Value = StageId> {
    prop::sample::select(StageId::ALL.to_vec())
}

fn new_deal_strategy() -> impl Strategy<Value = NewDeal> {
    (
        0i64..10_000_000,
        0u32..3,
        prop::option::of(stage_strategy()),
        prop::option::of(0u8..=100),
    )
        .prop_map(|(cents, scale, stage, probability)| NewDeal {
            stage,
            probability,
            ..NewDeal::new("Deal", "Company", Decimal::new(cents, scale))
        })
}

fn populated(inputs: Vec<NewDeal>) -> DealStore {
    let mut store = DealStore::new();
    for input in inputs {
        store.create(input).unwrap();
    }
    store
}

proptest! {
    #[test]
    fn move_always_lands_on_stage_default(
        inputs in prop::collection::vec(new_deal_strategy(), 1..20),
        pick in any::<prop::sample::Index>(),
        target in stage_strategy(),
    ) {
        let mut store = populated(inputs);
        let id = pick.get(store.list()).id;
        let before = store.get(id).unwrap().clone();
        let after = store.move_deal(id, target).unwrap().clone();
        if before.stage == target {
            prop_assert_eq!(after, before);
        } else {
            prop_assert_eq!(after.stage, target);
            prop_assert_eq!(after.probability, target.default_probability());
        }
    }

    #[test]
    fn subtotals_sum_to_total(inputs in prop::collection::vec(new_deal_strategy(), 0..30)) {
        let store = populated(inputs);
        let deals = store.list();
        let sum: Decimal = StageId::ALL.into_iter().map(|s| stage_subtotal(deals, s)).sum();
        prop_assert_eq!(sum, total_value(deals));
        let count: usize = StageId::ALL.into_iter().map(|s| stage_count(deals, s)).sum();
        prop_assert_eq!(count, deals.len());
        let board = Board::project(deals);
        prop_assert_eq!(board.column_total(), board.summary.total_value);
    }

    #[test]
    fn average_times_count_is_total(inputs in prop::collection::vec(new_deal_strategy(), 1..30)) {
        let store = populated(inputs);
        let deals = store.list();
        let average = average_deal_size(deals);
        let total = total_value(deals);
        let drift = (average * Decimal::from(deals.len()) - total).abs();
        prop_assert!(drift < Decimal::new(1, 10));
    }

    #[test]
    fn ids_stay_unique_across_deletes(
        inputs in prop::collection::vec(new_deal_strategy(), 1..20),
        deletes in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        let mut store = populated(inputs);
        let seen: Vec<DealId> = store.list().iter().map(|d| d.id).collect();
        for index in deletes {
            if store.is_empty() {
                break;
            }
            let id = index.get(store.list()).id;
            store.delete(id).unwrap();
        }
        let fresh = store.create(NewDeal::new("Late", "Acme", Decimal::ONE)).unwrap().id;
        prop_assert!(!seen.contains(&fresh));
    }
}
