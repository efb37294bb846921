use crate::seat::RelativeSeat;
use crate::t;
use crate::tile::Tile;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Declaration order is the ranking order: lower sorts first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Hu,
    Kan,
    Pon,
    Chii,
    Flower,
    #[default]
    Skip,
}

/// A response the local seat may submit.
///
/// The derived ordering compares `kind`, then `priority`, then `tile`, so
/// sorting a candidate list puts the highest-commitment action first.
/// `priority` doubles as the turn rotation applied once the action is
/// honored.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GameAction {
    pub kind: ActionKind,
    pub priority: RelativeSeat,
    pub tile: Tile,
}

/// Snapshot describing the tile a candidate list is evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WinningCondition {
    pub tile: Tile,
    /// Discarded by another seat rather than drawn by us.
    pub discarded: bool,
    /// The wall is exhausted.
    pub last_tile: bool,
    /// All other copies of `tile` are already visible.
    pub last_of_kind: bool,
    /// Drawn as a replacement after a kong or flower.
    pub replacement: bool,
    pub robbing_kong: bool,
}

/// Outbound answer to a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSubmission {
    pub kind: ActionKind,
    pub tile: Tile,
    pub action_id: u32,
}

impl GameAction {
    #[inline]
    #[must_use]
    pub const fn new(kind: ActionKind, priority: RelativeSeat, tile: Tile) -> Self {
        Self {
            kind,
            priority,
            tile,
        }
    }

    /// Skip always carries the placeholder tile and our own seat.
    #[inline]
    #[must_use]
    pub const fn skip() -> Self {
        Self::new(ActionKind::Skip, RelativeSeat::Jicha, t!(?))
    }

    #[inline]
    #[must_use]
    pub const fn submission(self, action_id: u32) -> ActionSubmission {
        ActionSubmission {
            kind: self.kind,
            tile: self.tile,
            action_id,
        }
    }
}

impl fmt::Display for GameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ActionKind::Skip => f.write_str("skip"),
            kind => write!(f, "{kind:?}({}, {:?})", self.tile, self.priority),
        }
    }
}
