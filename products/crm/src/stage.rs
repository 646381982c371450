//! Stage registry: the fixed, ordered set of pipeline columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageId {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

/// Badge tone used by the board to color a stage header.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageTone {
    Gray,
    Blue,
    Yellow,
    Orange,
    Green,
    Red,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: StageId,
    pub label: &'static str,
    pub default_probability: u8,
    pub ordinal: u8,
    pub is_won: bool,
    pub is_lost: bool,
    pub tone: StageTone,
}

impl Stage {
    /// Won and lost stages end the pipeline.
    pub fn is_closed(&self) -> bool {
        self.is_won || self.is_lost
    }
}

const STAGES: [Stage; 6] = [
    Stage {
        id: StageId::Lead,
        label: "Lead",
        default_probability: 25,
        ordinal: 0,
        is_won: false,
        is_lost: false,
        tone: StageTone::Gray,
    },
    Stage {
        id: StageId::Qualified,
        label: "Qualified",
        default_probability: 45,
        ordinal: 1,
        is_won: false,
        is_lost: false,
        tone: StageTone::Blue,
    },
    Stage {
        id: StageId::Proposal,
        label: "Proposal",
        default_probability: 70,
        ordinal: 2,
        is_won: false,
        is_lost: false,
        tone: StageTone::Yellow,
    },
    Stage {
        id: StageId::Negotiation,
        label: "Negotiation",
        default_probability: 85,
        ordinal: 3,
        is_won: false,
        is_lost: false,
        tone: StageTone::Orange,
    },
    Stage {
        id: StageId::ClosedWon,
        label: "Closed Won",
        default_probability: 100,
        ordinal: 4,
        is_won: true,
        is_lost: false,
        tone: StageTone::Green,
    },
    Stage {
        id: StageId::ClosedLost,
        label: "Closed Lost",
        default_probability: 0,
        ordinal: 5,
        is_won: false,
        is_lost: true,
        tone: StageTone::Red,
    },
];

impl StageId {
    pub const ALL: [StageId; 6] = [
        StageId::Lead,
        StageId::Qualified,
        StageId::Proposal,
        StageId::Negotiation,
        StageId::ClosedWon,
        StageId::ClosedLost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StageId::Lead => "lead",
            StageId::Qualified => "qualified",
            StageId::Proposal => "proposal",
            StageId::Negotiation => "negotiation",
            StageId::ClosedWon => "closed-won",
            StageId::ClosedLost => "closed-lost",
        }
    }

    pub fn stage(self) -> &'static Stage {
        &STAGES[self.ordinal()]
    }

    pub fn ordinal(self) -> usize {
        match self {
            StageId::Lead => 0,
            StageId::Qualified => 1,
            StageId::Proposal => 2,
            StageId::Negotiation => 3,
            StageId::ClosedWon => 4,
            StageId::ClosedLost => 5,
        }
    }

    pub fn default_probability(self) -> u8 {
        self.stage().default_probability
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for StageId {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StageId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| PipelineError::invalid_stage(s))
    }
}

/// All stages in board order.
pub fn all() -> &'static [Stage] {
    &STAGES
}

pub fn stage_by_id(id: &str) -> PipelineResult<&'static Stage> {
    id.parse::<StageId>().map(StageId::stage)
}

pub fn default_probability_for(id: StageId) -> u8 {
    id.default_probability()
}
