use super::TableState;
use crate::action::{ActionKind, GameAction, WinningCondition};
use crate::algo::claim::{claim_candidates, kan_candidates, rank_actions};
use crate::event::GameEvent;
use crate::hand::MAX_HAND_SIZE;
use crate::score::Scorer;
use crate::seat::{RelativeSeat, relative};
use crate::tile::Tile;

/// Candidate responses to one event, ranked by the action order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Legal {
    pub actions: Vec<GameAction>,
    pub cond: WinningCondition,
    /// The prompt answers another seat's tile, as opposed to our own turn.
    pub claim_window: bool,
}

impl Legal {
    /// A prompt we have no candidates for can only be skipped.
    #[must_use]
    pub fn skip_only() -> Self {
        Self {
            actions: vec![GameAction::skip()],
            cond: WinningCondition::default(),
            claim_window: true,
        }
    }

    #[must_use]
    pub fn contains(&self, action: &GameAction) -> bool {
        self.actions.contains(action)
    }

    /// Whether anything beyond skip is on offer.
    #[must_use]
    pub fn has_choice(&self) -> bool {
        self.actions.iter().any(|a| a.kind != ActionKind::Skip)
    }
}

impl TableState {
    /// The tile `event` puts in front of us, with the turn rotation a
    /// response to it would apply and whether it opens a claim window.
    #[must_use]
    pub fn winning_condition(
        &self,
        event: &GameEvent,
    ) -> Option<(WinningCondition, RelativeSeat, bool)> {
        match *event {
            GameEvent::Discard { seat, tile } if !self.is_me(seat) => {
                Some((self.claiming(tile), relative(seat, self.my_seat), true))
            }
            GameEvent::AddedKong { seat, ref block } if !self.is_me(seat) => {
                Some((self.robbing(block.anchor), relative(seat, self.my_seat), true))
            }
            GameEvent::RobbingKong { seat, tile } if !self.is_me(seat) => {
                Some((self.robbing(tile), relative(seat, self.my_seat), true))
            }
            GameEvent::SelfDraw { seat, .. } if self.is_me(seat) => self.own_turn(),
            GameEvent::Deal { dealer, .. } | GameEvent::InitialFlowerExchangeAck { seat: dealer }
                if self.is_me(dealer) && self.dealer == dealer =>
            {
                self.own_turn()
            }
            _ => None,
        }
    }

    fn claiming(&self, tile: Tile) -> WinningCondition {
        WinningCondition {
            tile,
            discarded: true,
            last_tile: self.is_wall_empty(),
            last_of_kind: self.is_last_of_kind(tile),
            ..Default::default()
        }
    }

    fn robbing(&self, tile: Tile) -> WinningCondition {
        WinningCondition {
            tile,
            discarded: true,
            last_tile: self.is_wall_empty(),
            last_of_kind: self.is_last_of_kind(tile),
            robbing_kong: true,
            ..Default::default()
        }
    }

    fn own_turn(&self) -> Option<(WinningCondition, RelativeSeat, bool)> {
        if self.hand.size() != MAX_HAND_SIZE {
            return None;
        }
        let tile = self.last_self_draw.or_else(|| self.hand.rightmost_tile())?;
        let cond = WinningCondition {
            tile,
            last_tile: self.is_wall_empty(),
            last_of_kind: self.is_last_of_kind(tile),
            replacement: self.drew_replacement,
            ..Default::default()
        };
        Some((cond, RelativeSeat::Jicha, false))
    }

    /// Computes what we may answer to `event`.
    ///
    /// `allowed` is the server's list for the prompt, if it sent one. Hu is
    /// only offered when the server lists it and `scorer` agrees. Skip is
    /// always present.
    #[must_use]
    pub fn legal_actions(
        &self,
        event: &GameEvent,
        allowed: Option<&[ActionKind]>,
        scorer: &dyn Scorer,
    ) -> Option<Legal> {
        let (cond, priority, claim_window) = self.winning_condition(event)?;
        let permitted = |kind: ActionKind| allowed.is_none_or(|list| list.contains(&kind));

        let mut candidates = Vec::with_capacity(8);
        if !cond.robbing_kong {
            if claim_window {
                candidates.extend(claim_candidates(&self.hand, &cond, priority));
            } else {
                candidates.extend(kan_candidates(&self.hand, &cond, priority));
                if let Some(flower) = self.hand.next_flower() {
                    candidates.push(GameAction::new(ActionKind::Flower, priority, flower));
                }
            }
        }
        candidates.retain(|a| permitted(a.kind));

        let hu_listed = allowed.is_some_and(|list| list.contains(&ActionKind::Hu));
        if hu_listed && scorer.can_win(&self.hand.tiles(), self.hand.calls(), &cond) {
            candidates.push(GameAction::new(ActionKind::Hu, priority, cond.tile));
        }
        candidates.push(GameAction::skip());

        Some(Legal {
            actions: rank_actions(candidates),
            cond,
            claim_window,
        })
    }

    /// Fills in the score of our own win when the server sent none.
    ///
    /// The winning condition is rebuilt from the table: a robbed kong, then
    /// another seat's discard, then our own draw.
    pub fn score_own_win(&mut self, scorer: &dyn Scorer) {
        if self.last_score.is_some() || !self.winner.is_some_and(|w| self.is_me(w)) {
            return;
        }
        let cond = if let Some((seat, tile)) = self.robbable_kong
            && !self.is_me(seat)
        {
            self.robbing(tile)
        } else if let Some((seat, tile)) = self.last_discard
            && !self.is_me(seat)
        {
            self.claiming(tile)
        } else if let Some((cond, ..)) = self.own_turn() {
            cond
        } else {
            log::warn!("cannot rebuild the winning tile of our own win");
            return;
        };

        let mut tiles = self.hand.tiles();
        if cond.discarded {
            tiles.push(cond.tile);
            tiles.sort_unstable();
        }
        self.last_score = scorer.score(&tiles, self.hand.calls(), &cond);
    }
}
