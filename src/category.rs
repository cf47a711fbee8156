//! Content category taxonomy
//!
//! Typed views over the single-byte codes in [`crate::constants`]. A content
//! script carries its categories as trailing elements, deepest first, right
//! before `OP_CONTENT`.

use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Coarse one-byte kind of a script or output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ScriptKind {
    Proposal,
    Thread,
    Reward,
    Vote,
    Empty,
}

impl ScriptKind {
    pub fn as_byte(self) -> u8 {
        match self {
            ScriptKind::Proposal => PROPOSAL,
            ScriptKind::Thread => THREAD,
            ScriptKind::Reward => REWARD,
            ScriptKind::Vote => VOTE,
            ScriptKind::Empty => KIND_EMPTY,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            PROPOSAL => Some(ScriptKind::Proposal),
            THREAD => Some(ScriptKind::Thread),
            REWARD => Some(ScriptKind::Reward),
            VOTE => Some(ScriptKind::Vote),
            KIND_EMPTY => Some(ScriptKind::Empty),
            _ => None,
        }
    }

    /// Depth-1 content category, `None` for [`ScriptKind::Empty`]
    pub fn category(self) -> Option<u8> {
        match self {
            ScriptKind::Empty => None,
            other => Some(other.as_byte()),
        }
    }
}

impl From<ScriptKind> for u8 {
    fn from(kind: ScriptKind) -> u8 {
        kind.as_byte()
    }
}

impl TryFrom<u8> for ScriptKind {
    type Error = String;

    fn try_from(byte: u8) -> std::result::Result<Self, Self::Error> {
        ScriptKind::from_byte(byte).ok_or_else(|| format!("unknown script kind {}", byte))
    }
}

/// Depth-2 proposal categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalCategory {
    Application,
    Costs,
    Constitution,
}

impl ProposalCategory {
    pub fn as_byte(self) -> u8 {
        match self {
            ProposalCategory::Application => PROPOSAL_APPLICATION,
            ProposalCategory::Costs => PROPOSAL_COSTS,
            ProposalCategory::Constitution => PROPOSAL_CONSTITUTION,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            PROPOSAL_APPLICATION => Some(ProposalCategory::Application),
            PROPOSAL_COSTS => Some(ProposalCategory::Costs),
            PROPOSAL_CONSTITUTION => Some(ProposalCategory::Constitution),
            _ => None,
        }
    }
}

/// Depth-2 thread categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadCategory {
    Thread,
    Rethread,
}

impl ThreadCategory {
    pub fn as_byte(self) -> u8 {
        match self {
            ThreadCategory::Thread => THREAD_THREAD,
            ThreadCategory::Rethread => THREAD_RETHREAD,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            THREAD_THREAD => Some(ThreadCategory::Thread),
            THREAD_RETHREAD => Some(ThreadCategory::Rethread),
            _ => None,
        }
    }
}

/// Depth-2 vote categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteCategory {
    Accepted,
    Declined,
}

impl VoteCategory {
    pub fn as_byte(self) -> u8 {
        match self {
            VoteCategory::Accepted => VOTE_ACCEPTED,
            VoteCategory::Declined => VOTE_DECLINED,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            VOTE_ACCEPTED => Some(VoteCategory::Accepted),
            VOTE_DECLINED => Some(VoteCategory::Declined),
            _ => None,
        }
    }
}

/// Depth-3 categories under COSTS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostCategory {
    ThreadPrice,
    ProposalPrice,
}

impl CostCategory {
    pub fn as_byte(self) -> u8 {
        match self {
            CostCategory::ThreadPrice => COSTS_THREAD_PRICE,
            CostCategory::ProposalPrice => COSTS_PROPOSAL_PRICE,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            COSTS_THREAD_PRICE => Some(CostCategory::ThreadPrice),
            COSTS_PROPOSAL_PRICE => Some(CostCategory::ProposalPrice),
            _ => None,
        }
    }
}
