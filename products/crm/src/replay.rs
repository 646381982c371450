//! Scripted replay of store edits and board gestures.
//!
//! A script is a JSON array of commands tagged by `op`:
//!
//! ```json
//! [
//!   {"op": "create", "title": "Pilot", "company": "Acme", "value": 1200},
//!   {"op": "begin_drag", "id": 6},
//!   {"op": "enter_stage", "stage": "qualified"},
//!   {"op": "drop", "stage": "qualified"}
//! ]
//! ```
//!
//! Stage ids stay strings until they are applied so that a bad id surfaces
//! as `InvalidStage` for that command rather than failing the whole parse.

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::deal::{DealId, DealPatch, NewDeal};
use crate::drag::{DragSession, DropOutcome};
use crate::error::{PipelineError, PipelineResult};
use crate::stage::StageId;
use crate::store::DealStore;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PipelineCommand {
    Create(NewDeal),
    Update {
        id: DealId,
        #[serde(flatten)]
        patch: DealPatch,
    },
    Delete {
        id: DealId,
    },
    Move {
        id: DealId,
        stage: String,
    },
    BeginDrag {
        id: DealId,
    },
    EnterStage {
        stage: String,
    },
    LeaveStage {
        stage: String,
    },
    Drop {
        stage: String,
    },
    CancelDrag,
}

impl PipelineCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineCommand::Create(_) => "create",
            PipelineCommand::Update { .. } => "update",
            PipelineCommand::Delete { .. } => "delete",
            PipelineCommand::Move { .. } => "move",
            PipelineCommand::BeginDrag { .. } => "begin_drag",
            PipelineCommand::EnterStage { .. } => "enter_stage",
            PipelineCommand::LeaveStage { .. } => "leave_stage",
            PipelineCommand::Drop { .. } => "drop",
            PipelineCommand::CancelDrag => "cancel_drag",
        }
    }
}

/// What a single command did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Applied {
    /// A deal was created, edited or moved.
    Deal(DealId),
    Deleted(DealId),
    /// A drag transition; `accepted` is false when the session ignored it.
    Gesture { accepted: bool },
    Dropped(Option<DropOutcome>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayFailure {
    pub index: usize,
    pub command: &'static str,
    pub error: PipelineError,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub applied: usize,
    pub failures: Vec<ReplayFailure>,
}

pub fn parse_script(raw: &str) -> PipelineResult<Vec<PipelineCommand>> {
    serde_json::from_str(raw).map_err(|err| PipelineError::Script(err.to_string()))
}

/// Drives a store and a drag session from a command stream.
#[derive(Debug)]
pub struct Replayer {
    store: DealStore,
    session: DragSession,
    keep_going: bool,
}

impl Replayer {
    pub fn new(store: DealStore) -> Self {
        Self {
            store,
            session: DragSession::new(),
            keep_going: false,
        }
    }

    /// Skip failing commands instead of stopping at the first one.
    pub fn keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    pub fn store(&self) -> &DealStore {
        &self.store
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn into_parts(self) -> (DealStore, DragSession) {
        (self.store, self.session)
    }

    pub fn apply(&mut self, command: PipelineCommand) -> PipelineResult<Applied> {
        match command {
            PipelineCommand::Create(input) => self.store.create(input).map(|d| Applied::Deal(d.id)),
            PipelineCommand::Update { id, patch } => {
                self.store.update(id, patch).map(|d| Applied::Deal(d.id))
            }
            PipelineCommand::Delete { id } => self.store.delete(id).map(|d| Applied::Deleted(d.id)),
            PipelineCommand::Move { id, stage } => {
                let stage: StageId = stage.parse()?;
                self.store.move_deal(id, stage).map(|d| Applied::Deal(d.id))
            }
            PipelineCommand::BeginDrag { id } => Ok(Applied::Gesture {
                accepted: self.session.begin_drag(id),
            }),
            PipelineCommand::EnterStage { stage } => {
                let stage: StageId = stage.parse()?;
                Ok(Applied::Gesture {
                    accepted: self.session.enter_stage(stage),
                })
            }
            PipelineCommand::LeaveStage { stage } => {
                let stage: StageId = stage.parse()?;
                Ok(Applied::Gesture {
                    accepted: self.session.leave_stage(stage),
                })
            }
            PipelineCommand::Drop { stage } => {
                let stage = match stage.parse::<StageId>() {
                    Ok(stage) => stage,
                    Err(err) => {
                        // No valid drop target: the gesture ends without a move.
                        self.session.cancel_drag();
                        return Err(err);
                    }
                };
                self.session
                    .drop_on(&mut self.store, stage)
                    .map(Applied::Dropped)
            }
            PipelineCommand::CancelDrag => Ok(Applied::Gesture {
                accepted: self.session.cancel_drag(),
            }),
        }
    }

    pub fn run(
        &mut self,
        commands: impl IntoIterator<Item = PipelineCommand>,
    ) -> PipelineResult<ReplayReport> {
        let _span = info_span!("crm.replay", keep_going = self.keep_going).entered();
        let mut report = ReplayReport::default();
        for (index, command) in commands.into_iter().enumerate() {
            let name = command.name();
            match self.apply(command) {
                Ok(_) => report.applied += 1,
                Err(error) if self.keep_going => {
                    warn!(index, command = name, %error, "replay command failed; continuing");
                    report.failures.push(ReplayFailure {
                        index,
                        command: name,
                        error,
                    });
                }
                Err(error) => {
                    warn!(index, command = name, %error, "replay command failed");
                    return Err(error);
                }
            }
        }
        info!(
            applied = report.applied,
            failed = report.failures.len(),
            "replay finished"
        );
        Ok(report)
    }
}
