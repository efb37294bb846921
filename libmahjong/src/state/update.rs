use super::TableState;
use crate::call::{CallBlock, CallShape};
use crate::event::{EventKind, GameEvent};
use crate::hand::MAX_HAND_SIZE;
use crate::score::ScoreResult;
use crate::seat::{AbsoluteSeat, RelativeSeat, Round, relative};
use crate::tile::Tile;
use std::mem;

use anyhow::{Context, Result, bail, ensure};

impl TableState {
    /// Applies one event. Either the whole event applies or, on error,
    /// nothing does.
    pub fn update(&mut self, event: &GameEvent) -> Result<()> {
        let mut next = self.clone();
        next.update_inner(event)
            .with_context(|| format!("on event {event:?}"))?;
        *self = next;
        Ok(())
    }

    fn update_inner(&mut self, event: &GameEvent) -> Result<()> {
        match event {
            GameEvent::Deal {
                dealer,
                tiles,
                round,
            } => self.deal(*dealer, tiles, *round)?,
            GameEvent::InitialFlowerExchange {
                seat,
                flowers,
                replacements,
            } => self.initial_flowers(*seat, flowers, replacements)?,
            GameEvent::InitialFlowerExchangeAck { seat } => {
                log::debug!("{seat} finished the initial flower exchange");
            }
            GameEvent::SelfDraw { seat, tile } => self.self_draw(*seat, *tile)?,
            GameEvent::Discard { seat, tile } => self.discard(*seat, *tile)?,
            GameEvent::Chii { seat, block }
            | GameEvent::Pon { seat, block }
            | GameEvent::ExposedKong { seat, block } => self.claim(*seat, *block)?,
            GameEvent::AddedKong { seat, block } => self.added_kong(*seat, *block)?,
            GameEvent::ConcealedKong { seat, block } => self.add_call(*seat, *block)?,
            GameEvent::Flower { seat, flower } => self.flower(*seat, *flower)?,
            GameEvent::RobbingKong { seat, tile } => {
                self.robbable_kong = Some((*seat, *tile));
            }
            GameEvent::Win { seat, score, .. } => self.win(*seat, score.as_ref()),
        }
        Ok(())
    }

    fn deal(&mut self, dealer: AbsoluteSeat, tiles: &[Tile], round: Option<Round>) -> Result<()> {
        if let Some(round) = round {
            self.round = round;
        }
        ensure!(!self.round.is_end(), "desync: deal after END");
        self.my_seat = self.round.seat_of(self.player_id)?;
        self.dealer = dealer;
        self.at_turn = dealer;
        self.reset_deal();

        let expected = if self.is_me(dealer) { 14 } else { 13 };
        ensure!(
            tiles.len() == expected,
            "desync: dealt {} tiles, expected {expected}",
            tiles.len(),
        );
        let (initial, extra) = tiles.split_at(13);
        self.hand.deal(initial)?;
        for &tile in initial {
            self.witness_tile(tile)?;
        }
        if let Some(&tile) = extra.first() {
            self.hand.draw(tile)?;
            self.witness_tile(tile)?;
            self.last_self_draw = Some(tile);
        }
        Ok(())
    }

    fn initial_flowers(
        &mut self,
        seat: AbsoluteSeat,
        flowers: &[Tile],
        replacements: &[Tile],
    ) -> Result<()> {
        let revealed = &self.flowers[seat.as_usize()];
        ensure!(
            revealed.len() + flowers.len() <= 8,
            "desync: {seat} reveals {} flowers on top of {}",
            flowers.len(),
            revealed.len(),
        );
        if self.is_me(seat) {
            ensure!(
                replacements.len() == flowers.len(),
                "desync: {} flowers exchanged for {} replacements",
                flowers.len(),
                replacements.len(),
            );
            for (&flower, &replacement) in flowers.iter().zip(replacements) {
                self.hand.exchange_flower(flower, replacement)?;
                self.witness_tile(replacement)?;
                if self.last_self_draw == Some(flower) {
                    self.last_self_draw = Some(replacement);
                }
            }
        } else {
            for &flower in flowers {
                self.witness_tile(flower)?;
            }
        }
        self.flowers[seat.as_usize()].extend(flowers.iter().copied());
        Ok(())
    }

    fn self_draw(&mut self, seat: AbsoluteSeat, tile: Tile) -> Result<()> {
        if self.is_me(seat) {
            ensure!(
                !tile.is_unknown(),
                "desync: our own draw arrived without a tile",
            );
            self.hand.draw(tile)?;
            self.witness_tile(tile)?;
            self.last_self_draw = Some(tile);
            self.drew_replacement = mem::take(&mut self.at_replacement);
        }
        self.last_discard = None;
        self.robbable_kong = None;
        Ok(())
    }

    fn discard(&mut self, seat: AbsoluteSeat, tile: Tile) -> Result<()> {
        if self.is_me(seat) {
            self.hand.discard(tile)?;
            self.last_self_draw = None;
            self.drew_replacement = false;
        } else {
            self.witness_tile(tile)?;
        }
        self.discards[seat.as_usize()].push(tile);
        self.last_discard = Some((seat, tile));
        Ok(())
    }

    /// Chii, pon or exposed kong on the last discard.
    fn claim(&mut self, seat: AbsoluteSeat, block: CallBlock) -> Result<()> {
        let Some((discarder, tile)) = self.last_discard.take() else {
            bail!("desync: {block} claimed with no discard on the table");
        };
        let source = seat.rotate(block.source);
        ensure!(
            source == discarder,
            "desync: {seat} claims {block} from {source} but {discarder} discarded",
        );
        ensure!(
            block.claimed_tile() == Some(tile),
            "desync: {block} does not use the discarded {tile}",
        );
        // The claimed tile leaves the river but stays witnessed.
        self.discards[discarder.as_usize()].pop();
        self.add_call(seat, block)
    }

    fn add_call(&mut self, seat: AbsoluteSeat, block: CallBlock) -> Result<()> {
        if self.is_me(seat) {
            self.hand.apply_call(block)?;
            if block.shape.is_kong() {
                self.at_replacement = true;
            }
        } else {
            block.validate()?;
            let slot = seat.as_usize();
            ensure!(
                self.calls[slot].len() < 4,
                "desync: {seat} declares a fifth call block {block}",
            );
            for tile in block.consumed() {
                self.witness_tile(tile)?;
            }
            self.calls[slot].push(block);
        }
        Ok(())
    }

    fn added_kong(&mut self, seat: AbsoluteSeat, block: CallBlock) -> Result<()> {
        if self.is_me(seat) {
            self.add_call(seat, block)?;
        } else {
            self.witness_tile(block.anchor)?;
            let Some(pung) = self.calls[seat.as_usize()]
                .iter_mut()
                .find(|c| c.shape == CallShape::Pung && c.anchor == block.anchor)
            else {
                bail!(
                    "desync: {seat} adds to a pung of {} it never called",
                    block.anchor,
                );
            };
            pung.shape = CallShape::AddedKong;
        }
        self.robbable_kong = Some((seat, block.anchor));
        Ok(())
    }

    fn flower(&mut self, seat: AbsoluteSeat, flower: Tile) -> Result<()> {
        ensure!(
            self.flowers[seat.as_usize()].len() < 8,
            "desync: {seat} reveals a ninth flower",
        );
        if self.is_me(seat) {
            let next = self.hand.next_flower();
            ensure!(
                next == Some(flower),
                "desync: server exchanged {flower} but the hand would exchange {next:?}",
            );
            self.hand.apply_flower()?;
            self.at_replacement = true;
        } else {
            self.witness_tile(flower)?;
        }
        self.flowers[seat.as_usize()].push(flower);
        Ok(())
    }

    fn win(&mut self, seat: AbsoluteSeat, score: Option<&ScoreResult>) {
        self.winner = Some(seat);
        self.last_score = score.cloned();
        self.can_interact = false;
    }

    /// Takes the server's wall counter, or counts a draw down when the
    /// server did not send one.
    pub fn observe_wall(&mut self, kind: EventKind, tiles_left: Option<u8>) {
        match tiles_left {
            Some(n) => self.tiles_left = Some(n),
            None if kind == EventKind::SelfDraw => {
                self.tiles_left = self.tiles_left.map(|n| n.saturating_sub(1));
            }
            None => {}
        }
    }

    /// Rotation the event implies for the turn holder. A claim moves the
    /// turn straight to the claimer, skipping seats in between.
    #[must_use]
    pub fn turn_delta(&self, event: &GameEvent) -> RelativeSeat {
        match event.kind() {
            EventKind::InitialFlowerExchange
            | EventKind::InitialFlowerExchangeAck
            | EventKind::RobbingKong => RelativeSeat::Jicha,
            _ => relative(self.at_turn, event.seat()),
        }
    }

    pub fn move_turn(&mut self, delta: RelativeSeat) -> AbsoluteSeat {
        self.at_turn = self.at_turn.rotate(delta);
        self.at_turn
    }

    /// Grants interaction only on our own turn, with a tile to discard and
    /// no response window pending.
    pub fn refresh_interaction(&mut self, window_open: bool) -> bool {
        self.can_interact = self.at_turn == self.my_seat
            && !window_open
            && self.winner.is_none()
            && self.hand.size() == MAX_HAND_SIZE;
        self.can_interact
    }

    /// Advances to the next round and clears the deal.
    ///
    /// Returns an error on END.
    pub fn next_round(&mut self) -> Result<Round> {
        let next = self.round.next_round()?;
        self.round = next;
        if !next.is_end() {
            self.my_seat = next.seat_of(self.player_id)?;
        }
        self.reset_deal();
        Ok(next)
    }
}
