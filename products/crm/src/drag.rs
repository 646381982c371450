//! Drag-and-drop interaction state for the pipeline board.
//!
//! A session tracks at most one gesture: which deal is being dragged and
//! which stage column is under the pointer. It never holds a copy of the
//! deal, only its id; the drop is handed to [`DealStore::move_deal`].
//!
//! Enter/leave events may arrive out of order from the presentation layer.
//! A leave only clears the hover target when it names the stage currently
//! hovered, so a late leave from the previous column cannot erase the new one.

use serde::Serialize;
use tracing::{debug, warn};

use crate::deal::{Deal, DealId};
use crate::error::PipelineResult;
use crate::stage::StageId;
use crate::store::DealStore;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DragState {
    #[default]
    Idle,
    #[serde(rename_all = "camelCase")]
    Dragging {
        deal_id: DealId,
        hover_stage_id: Option<StageId>,
    },
}

/// Result of dropping a dragged deal onto a stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropOutcome {
    pub deal: Deal,
    /// False when the deal was dropped back onto its own stage.
    pub changed: bool,
}

#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn dragged_deal_id(&self) -> Option<DealId> {
        match self.state {
            DragState::Dragging { deal_id, .. } => Some(deal_id),
            DragState::Idle => None,
        }
    }

    pub fn hover_stage_id(&self) -> Option<StageId> {
        match self.state {
            DragState::Dragging { hover_stage_id, .. } => hover_stage_id,
            DragState::Idle => None,
        }
    }

    pub fn is_hovered(&self, stage: StageId) -> bool {
        self.hover_stage_id() == Some(stage)
    }

    /// Start dragging `deal_id`. Returns false, leaving the active gesture
    /// untouched, if a drag is already in progress.
    pub fn begin_drag(&mut self, deal_id: DealId) -> bool {
        match self.state {
            DragState::Idle => {
                self.state = DragState::Dragging {
                    deal_id,
                    hover_stage_id: None,
                };
                debug!(%deal_id, "drag started");
                true
            }
            DragState::Dragging { deal_id: active, .. } => {
                if active != deal_id {
                    debug!(%active, requested = %deal_id, "ignoring second drag");
                }
                false
            }
        }
    }

    pub fn enter_stage(&mut self, stage: StageId) -> bool {
        match &mut self.state {
            DragState::Dragging { hover_stage_id, .. } => {
                *hover_stage_id = Some(stage);
                true
            }
            DragState::Idle => false,
        }
    }

    /// Clear the hover target, but only if it is `stage`.
    pub fn leave_stage(&mut self, stage: StageId) -> bool {
        match &mut self.state {
            DragState::Dragging { hover_stage_id, .. } if *hover_stage_id == Some(stage) => {
                *hover_stage_id = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the dragged deal onto `stage`.
    ///
    /// The session is back to idle afterwards whatever the move returned.
    /// Dropping while idle does nothing and yields `Ok(None)`.
    pub fn drop_on(
        &mut self,
        store: &mut DealStore,
        stage: StageId,
    ) -> PipelineResult<Option<DropOutcome>> {
        let DragState::Dragging { deal_id, .. } = std::mem::take(&mut self.state) else {
            return Ok(None);
        };
        let previous = match store.get(deal_id) {
            Ok(deal) => deal.stage,
            Err(err) => {
                warn!(%deal_id, "dragged deal vanished before drop");
                return Err(err);
            }
        };
        let deal = store.move_deal(deal_id, stage)?.clone();
        debug!(%deal_id, from = %previous, to = %stage, "drag dropped");
        Ok(Some(DropOutcome {
            changed: previous != deal.stage,
            deal,
        }))
    }

    /// Abandon the gesture without touching the store.
    pub fn cancel_drag(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        if was_dragging {
            debug!("drag cancelled");
        }
        self.state = DragState::Idle;
        was_dragging
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::deal::NewDeal;

    fn store_with_lead() -> (DealStore, DealId) {
        let mut store = DealStore::new();
        let id = store
            .create(NewDeal::new("Pilot", "Acme", Decimal::from(100)))
            .unwrap()
            .id;
        (store, id)
    }

    #[test]
    fn starts_idle() {
        let session = DragSession::new();
        assert_eq!(session.state(), DragState::Idle);
        assert_eq!(session.dragged_deal_id(), None);
        assert_eq!(session.hover_stage_id(), None);
    }

    #[test]
    fn only_one_drag_at_a_time() {
        let mut session = DragSession::new();
        assert!(session.begin_drag(DealId::new(1)));
        session.enter_stage(StageId::Proposal);
        assert!(!session.begin_drag(DealId::new(2)));
        assert!(!session.begin_drag(DealId::new(1)));
        assert_eq!(session.dragged_deal_id(), Some(DealId::new(1)));
        assert_eq!(session.hover_stage_id(), Some(StageId::Proposal));
    }

    #[test]
    fn hover_requires_active_drag() {
        let mut session = DragSession::new();
        assert!(!session.enter_stage(StageId::Lead));
        assert_eq!(session.hover_stage_id(), None);
    }

    #[test]
    fn enter_overwrites_previous_hover() {
        let mut session = DragSession::new();
        session.begin_drag(DealId::new(1));
        session.enter_stage(StageId::Qualified);
        session.enter_stage(StageId::Negotiation);
        assert!(session.is_hovered(StageId::Negotiation));
        assert!(!session.is_hovered(StageId::Qualified));
    }

    #[test]
    fn stale_leave_is_ignored() {
        let mut session = DragSession::new();
        session.begin_drag(DealId::new(1));
        session.enter_stage(StageId::Qualified);
        assert!(!session.leave_stage(StageId::Lead));
        assert_eq!(session.hover_stage_id(), Some(StageId::Qualified));
        assert!(session.leave_stage(StageId::Qualified));
        assert_eq!(session.hover_stage_id(), None);
        assert!(session.is_dragging());
    }

    #[test]
    fn drop_moves_and_resets() {
        let (mut store, id) = store_with_lead();
        let mut session = DragSession::new();
        session.begin_drag(id);
        session.enter_stage(StageId::Negotiation);
        let outcome = session
            .drop_on(&mut store, StageId::Negotiation)
            .unwrap()
            .unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.deal.stage, StageId::Negotiation);
        assert_eq!(outcome.deal.probability, 85);
        assert_eq!(session.state(), DragState::Idle);
    }

    #[test]
    fn drop_on_own_stage_is_noop_but_resets() {
        let (mut store, id) = store_with_lead();
        let before = store.get(id).unwrap().clone();
        let mut session = DragSession::new();
        session.begin_drag(id);
        let outcome = session.drop_on(&mut store, StageId::Lead).unwrap().unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.deal, before);
        assert!(!session.is_dragging());
    }

    #[test]
    fn drop_while_idle_does_nothing() {
        let (mut store, id) = store_with_lead();
        let mut session = DragSession::new();
        assert_eq!(session.drop_on(&mut store, StageId::ClosedWon).unwrap(), None);
        assert_eq!(store.get(id).unwrap().stage, StageId::Lead);
    }

    #[test]
    fn drop_of_deleted_deal_fails_and_resets() {
        let (mut store, id) = store_with_lead();
        let mut session = DragSession::new();
        session.begin_drag(id);
        store.delete(id).unwrap();
        let err = session.drop_on(&mut store, StageId::Proposal).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(session.state(), DragState::Idle);
    }

    #[test]
    fn cancel_leaves_store_alone() {
        let (mut store, id) = store_with_lead();
        let mut session = DragSession::new();
        session.begin_drag(id);
        session.enter_stage(StageId::ClosedWon);
        assert!(session.cancel_drag());
        assert!(!session.cancel_drag());
        assert_eq!(session.state(), DragState::Idle);
        assert_eq!(store.get(id).unwrap().stage, StageId::Lead);
        assert!(session.drop_on(&mut store, StageId::ClosedWon).unwrap().is_none());
    }
}
