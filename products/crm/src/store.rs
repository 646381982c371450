//! Deal store: sole owner of the deal collection.
//!
//! Iteration order is newest-created first. Every mutation either applies in
//! full or leaves the collection untouched.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::deal::{Deal, DealId, DealPatch, NewDeal};
use crate::error::{PipelineError, PipelineResult};
use crate::stage::StageId;

/// One effective stage transition made by a move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageChange {
    pub deal_id: DealId,
    pub from: StageId,
    pub to: StageId,
    pub probability: u8,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct DealStore {
    deals: Vec<Deal>,
    next_id: u64,
    history: Vec<StageChange>,
}

impl Default for DealStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DealStore {
    pub fn new() -> Self {
        Self {
            deals: Vec::new(),
            next_id: 1,
            history: Vec::new(),
        }
    }

    /// Hydrate a store from existing records, keeping their order.
    ///
    /// Ids must be unique and every record must pass validation. Fresh ids
    /// continue after the largest one supplied.
    pub fn from_deals(deals: Vec<Deal>) -> PipelineResult<Self> {
        let mut seen = HashSet::with_capacity(deals.len());
        for deal in &deals {
            deal.validate()?;
            if !seen.insert(deal.id) {
                warn!(deal_id = %deal.id, "duplicate deal id in seed");
                return Err(PipelineError::Config {
                    key: "deal.id".into(),
                    value: deal.id.to_string(),
                });
            }
        }
        let max_id = deals.iter().map(|d| d.id.get()).max().unwrap_or(0);
        let Some(next_id) = max_id.checked_add(1) else {
            warn!(deal_id = max_id, "no ids left after seed");
            return Err(id_space_exhausted(max_id));
        };
        debug!(count = deals.len(), next_id, "deal store hydrated");
        Ok(Self {
            deals,
            next_id,
            history: Vec::new(),
        })
    }

    pub fn list(&self) -> &[Deal] {
        &self.deals
    }

    pub fn len(&self) -> usize {
        self.deals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deals.is_empty()
    }

    pub fn get(&self, id: DealId) -> PipelineResult<&Deal> {
        self.deals
            .iter()
            .find(|d| d.id == id)
            .ok_or(PipelineError::NotFound(id))
    }

    pub fn create(&mut self, input: NewDeal) -> PipelineResult<&Deal> {
        let _span = info_span!("crm.create_deal").entered();
        let stage = input.stage.unwrap_or(StageId::Lead);
        let probability = input
            .probability
            .unwrap_or_else(|| StageId::Lead.default_probability());
        let Some(following) = self.next_id.checked_add(1) else {
            warn!(next_id = self.next_id, "deal id space exhausted");
            return Err(id_space_exhausted(self.next_id));
        };
        let deal = Deal {
            id: DealId::new(self.next_id),
            title: input.title,
            company: input.company,
            contact: input.contact,
            description: input.description,
            value: input.value,
            stage,
            probability,
            expected_close_date: input.expected_close_date,
            created_at: Utc::now(),
        };
        if let Err(err) = deal.validate() {
            warn!(error = %err, "rejected deal create");
            return Err(err);
        }
        self.next_id = following;
        info!(deal_id = %deal.id, stage = %deal.stage, probability, "deal created");
        self.deals.insert(0, deal);
        Ok(&self.deals[0])
    }

    pub fn update(&mut self, id: DealId, patch: DealPatch) -> PipelineResult<&Deal> {
        let _span = info_span!("crm.update_deal", deal_id = %id).entered();
        let index = self.position(id)?;
        if patch.is_empty() {
            debug!("empty patch");
            return Ok(&self.deals[index]);
        }
        let mut candidate = self.deals[index].clone();
        patch.apply_to(&mut candidate);
        if let Err(err) = candidate.validate() {
            warn!(error = %err, "rejected deal update");
            return Err(err);
        }
        debug!(stage = %candidate.stage, probability = candidate.probability, "deal updated");
        self.deals[index] = candidate;
        Ok(&self.deals[index])
    }

    pub fn delete(&mut self, id: DealId) -> PipelineResult<Deal> {
        let _span = info_span!("crm.delete_deal", deal_id = %id).entered();
        let index = match self.position(id) {
            Ok(index) => index,
            Err(err) => {
                warn!("delete of unknown deal");
                return Err(err);
            }
        };
        let removed = self.deals.remove(index);
        info!("deal deleted");
        Ok(removed)
    }

    /// Move a deal to `target`, resetting its probability to the stage default.
    ///
    /// Moving to the current stage is a no-op and records nothing.
    pub fn move_deal(&mut self, id: DealId, target: StageId) -> PipelineResult<&Deal> {
        let _span = info_span!("crm.move_deal", deal_id = %id, to = %target).entered();
        let index = self.position(id)?;
        let from = self.deals[index].stage;
        if from == target {
            debug!("deal already in target stage");
            return Ok(&self.deals[index]);
        }

        let probability = target.default_probability();
        let deal = &mut self.deals[index];
        deal.stage = target;
        deal.probability = probability;
        self.history.push(StageChange {
            deal_id: id,
            from,
            to: target,
            probability,
            changed_at: Utc::now(),
        });
        info!(%from, probability, "deal moved");
        Ok(&self.deals[index])
    }

    /// Stage transitions in the order they happened.
    pub fn stage_history(&self) -> &[StageChange] {
        &self.history
    }

    pub fn stage_history_for(&self, id: DealId) -> impl Iterator<Item = &StageChange> + '_ {
        self.history.iter().filter(move |change| change.deal_id == id)
    }

    fn position(&self, id: DealId) -> PipelineResult<usize> {
        self.deals
            .iter()
            .position(|d| d.id == id)
            .ok_or(PipelineError::NotFound(id))
    }
}

fn id_space_exhausted(last: u64) -> PipelineError {
    PipelineError::Config {
        key: "deal.id".into(),
        value: last.to_string(),
    }
}
