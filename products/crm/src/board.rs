//! Column projection of a deal snapshot for board rendering.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::deal::{Deal, DealId};
use crate::drag::DragSession;
use crate::rollup::PipelineSummary;
use crate::stage::{self, Stage, StageId};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn<'a> {
    pub stage: &'static Stage,
    pub deals: Vec<&'a Deal>,
    pub count: usize,
    pub subtotal: Decimal,
    pub weighted: Decimal,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board<'a> {
    pub columns: Vec<BoardColumn<'a>>,
    pub summary: PipelineSummary,
}

/// What the board should highlight for the gesture in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub drop_target: Option<StageId>,
    pub drag_source: Option<DealId>,
}

impl Highlight {
    pub fn of(session: &DragSession) -> Self {
        Self {
            drop_target: session.hover_stage_id(),
            drag_source: session.dragged_deal_id(),
        }
    }

    pub fn is_drop_target(&self, stage: StageId) -> bool {
        self.drop_target == Some(stage)
    }

    /// Cards being dragged are dimmed in their source column.
    pub fn is_drag_source(&self, deal: DealId) -> bool {
        self.drag_source == Some(deal)
    }
}

impl<'a> Board<'a> {
    /// Partition `deals` into one column per stage, in board order.
    ///
    /// Within a column deals keep their relative order from the snapshot.
    pub fn project(deals: &'a [Deal]) -> Self {
        let mut buckets: Vec<Vec<&'a Deal>> = vec![Vec::new(); stage::all().len()];
        for deal in deals {
            buckets[deal.stage.ordinal()].push(deal);
        }
        let columns = stage::all()
            .iter()
            .zip(buckets)
            .map(|(stage, deals)| BoardColumn {
                stage,
                count: deals.len(),
                subtotal: deals.iter().map(|d| d.value).sum(),
                weighted: deals.iter().map(|d| d.weighted_value()).sum(),
                deals,
            })
            .collect();
        Self {
            columns,
            summary: PipelineSummary::of(deals),
        }
    }

    pub fn column(&self, stage: StageId) -> &BoardColumn<'a> {
        &self.columns[stage.ordinal()]
    }

    /// Board totals rebuilt from the columns; they always agree with `summary`.
    pub fn column_total(&self) -> Decimal {
        self.columns.iter().map(|c| c.subtotal).sum()
    }
}
