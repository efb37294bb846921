//! Decoded server notifications and their translation into typed events.

mod kind;
mod translate;

pub use kind::{EventKind, Successor, action_kind, event_kind};
pub use translate::{TranslateError, translate};

use crate::action::ActionKind;
use crate::call::CallBlock;
use crate::score::ScoreResult;
use crate::seat::{AbsoluteSeat, Round};
use crate::tile::Tile;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A notification as the transport hands it over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub kind: String,
    pub seat: AbsoluteSeat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile: Option<Tile>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub payload: Map<String, Value>,
}

/// Typed form of an [`InboundEvent`].
///
/// Call blocks are described relative to the seat that owns them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Our own starting tiles. `dealer` is the seat that receives 14.
    Deal {
        dealer: AbsoluteSeat,
        tiles: Vec<Tile>,
        round: Option<Round>,
    },
    /// `replacements` is empty for other seats.
    InitialFlowerExchange {
        seat: AbsoluteSeat,
        flowers: Vec<Tile>,
        replacements: Vec<Tile>,
    },
    InitialFlowerExchangeAck {
        seat: AbsoluteSeat,
    },
    /// `tile` is `?` for other seats.
    SelfDraw {
        seat: AbsoluteSeat,
        tile: Tile,
    },
    Discard {
        seat: AbsoluteSeat,
        tile: Tile,
    },
    Chii {
        seat: AbsoluteSeat,
        block: CallBlock,
    },
    Pon {
        seat: AbsoluteSeat,
        block: CallBlock,
    },
    ExposedKong {
        seat: AbsoluteSeat,
        block: CallBlock,
    },
    AddedKong {
        seat: AbsoluteSeat,
        block: CallBlock,
    },
    ConcealedKong {
        seat: AbsoluteSeat,
        block: CallBlock,
    },
    Flower {
        seat: AbsoluteSeat,
        flower: Tile,
    },
    RobbingKong {
        seat: AbsoluteSeat,
        tile: Tile,
    },
    Win {
        seat: AbsoluteSeat,
        tile: Option<Tile>,
        score: Option<ScoreResult>,
    },
}

/// An open response window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPrompt {
    pub action_id: u32,
    pub remaining_ms: Option<u64>,
    /// Kinds the server allows, `None` when it did not say.
    pub allowed: Option<Vec<ActionKind>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translated {
    pub event: GameEvent,
    pub prompt: Option<ActionPrompt>,
    pub tiles_left: Option<u8>,
}

impl GameEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Deal { .. } => EventKind::Deal,
            Self::InitialFlowerExchange { .. } => EventKind::InitialFlowerExchange,
            Self::InitialFlowerExchangeAck { .. } => EventKind::InitialFlowerExchangeAck,
            Self::SelfDraw { .. } => EventKind::SelfDraw,
            Self::Discard { .. } => EventKind::Discard,
            Self::Chii { .. } => EventKind::Chii,
            Self::Pon { .. } => EventKind::Pon,
            Self::ExposedKong { .. } => EventKind::ExposedKong,
            Self::AddedKong { .. } => EventKind::AddedKong,
            Self::ConcealedKong { .. } => EventKind::ConcealedKong,
            Self::Flower { .. } => EventKind::Flower,
            Self::RobbingKong { .. } => EventKind::RobbingKong,
            Self::Win { .. } => EventKind::Win,
        }
    }

    /// The seat the event originates from.
    #[must_use]
    pub const fn seat(&self) -> AbsoluteSeat {
        match self {
            Self::Deal { dealer, .. } => *dealer,
            Self::InitialFlowerExchange { seat, .. }
            | Self::InitialFlowerExchangeAck { seat }
            | Self::SelfDraw { seat, .. }
            | Self::Discard { seat, .. }
            | Self::Chii { seat, .. }
            | Self::Pon { seat, .. }
            | Self::ExposedKong { seat, .. }
            | Self::AddedKong { seat, .. }
            | Self::ConcealedKong { seat, .. }
            | Self::Flower { seat, .. }
            | Self::RobbingKong { seat, .. }
            | Self::Win { seat, .. } => *seat,
        }
    }

    #[must_use]
    pub const fn call_block(&self) -> Option<&CallBlock> {
        match self {
            Self::Chii { block, .. }
            | Self::Pon { block, .. }
            | Self::ExposedKong { block, .. }
            | Self::AddedKong { block, .. }
            | Self::ConcealedKong { block, .. } => Some(block),
            _ => None,
        }
    }
}
