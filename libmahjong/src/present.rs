use crate::action::GameAction;
use crate::call::CallBlock;
use crate::event::EventKind;
use crate::score::ScoreResult;
use crate::seat::{AbsoluteSeat, Round};
use crate::tile::Tile;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;

/// A visible or audible consequence of an event. The presentation side
/// decides how, and how long, to show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Dealt {
        round: Round,
        seat: AbsoluteSeat,
        tiles: Vec<Tile>,
    },
    Drew {
        seat: AbsoluteSeat,
        tile: Tile,
        replacement: bool,
    },
    Discarded {
        seat: AbsoluteSeat,
        tile: Tile,
    },
    Called {
        seat: AbsoluteSeat,
        block: CallBlock,
    },
    FlowerRevealed {
        seat: AbsoluteSeat,
        flower: Tile,
    },
    Won {
        seat: AbsoluteSeat,
        score: Option<ScoreResult>,
    },
    TurnMoved {
        seat: AbsoluteSeat,
    },
    Expect(EventKind),
    Prompt {
        actions: Vec<GameAction>,
        remaining_ms: u64,
    },
    RoundEnded {
        next: Round,
    },
}

/// The presentation collaborator. Called from inside pipeline steps, so an
/// implementation may block for as long as its animation lasts.
pub trait Presenter: Send + Sync {
    fn present(&self, effect: &Effect) -> Result<()>;
}

/// Writes every effect to the debug log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn present(&self, effect: &Effect) -> Result<()> {
        if let Effect::Won {
            seat,
            score: Some(score),
        } = effect
        {
            log::info!(
                "{seat} wins {} points, {} of them from bonuses",
                score.total,
                score.bonus_sum(),
            );
        }
        log::debug!("present: {effect:?}");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&self, _: &Effect) -> Result<()> {
        Ok(())
    }
}

/// Keeps every effect in order, for tests and tooling.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    effects: Arc<Mutex<Vec<Effect>>>,
}

impl RecordingPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn effects(&self) -> Vec<Effect> {
        self.effects.lock().clone()
    }
}

impl Presenter for RecordingPresenter {
    fn present(&self, effect: &Effect) -> Result<()> {
        self.effects.lock().push(effect.clone());
        Ok(())
    }
}
