mod getter;
mod legal;
mod update;


pub use legal::Legal;

use crate::call::CallBlock;
use crate::hand::Hand;
use crate::score::ScoreResult;
use crate::seat::{AbsoluteSeat, RelativeSeat, Round, relative};
use crate::tile::{NUM_KINDS, Tile};
use std::fmt::Write as _;

use anyhow::{Result, ensure};
use derivative::Derivative;
use tinyvec::ArrayVec;

/// `TableState` holds everything one seat can observe about the current
/// deal: its own hand, every seat's revealed tiles, whose turn it is and
/// the round bookkeeping. It is rebuilt purely from server events and is
/// meant to be owned by an [`ExclusiveQueue`](crate::queue::ExclusiveQueue).
#[derive(Clone, Derivative)]
#[derivative(Default)]
pub struct TableState {
    player_id: u8,
    round: Round,
    #[derivative(Default(value = "AbsoluteSeat::East"))]
    my_seat: AbsoluteSeat,
    #[derivative(Default(value = "AbsoluteSeat::East"))]
    dealer: AbsoluteSeat,
    #[derivative(Default(value = "AbsoluteSeat::East"))]
    at_turn: AbsoluteSeat,

    hand: Hand,

    /// Every visible copy: own hand, discards, other seats' meld tiles and
    /// revealed flowers.
    #[derivative(Default(value = "[0; NUM_KINDS]"))]
    tiles_seen: [u8; NUM_KINDS],

    /// Indexed by absolute seat.
    discards: [Vec<Tile>; 4],
    flowers: [ArrayVec<[Tile; 8]>; 4],
    /// Other seats' call blocks. Ours live in `hand`.
    calls: [ArrayVec<[CallBlock; 4]>; 4],

    tiles_left: Option<u8>,
    last_discard: Option<(AbsoluteSeat, Tile)>,
    last_self_draw: Option<Tile>,
    /// Added kong that may still be robbed.
    robbable_kong: Option<(AbsoluteSeat, Tile)>,

    /// Our next self-draw replaces a kong or flower.
    at_replacement: bool,
    /// The last self-draw was such a replacement.
    drew_replacement: bool,

    can_interact: bool,
    winner: Option<AbsoluteSeat>,
    last_score: Option<ScoreResult>,
}

impl TableState {
    /// Returns an error if `player_id` is outside of range [0, 3].
    pub fn new(player_id: u8) -> Result<Self> {
        ensure!(player_id < 4, "{player_id} is not in range [0, 3]");
        let round = Round::default();
        Ok(Self {
            player_id,
            round,
            my_seat: round.seat_of(player_id)?,
            ..Default::default()
        })
    }

    /// Label of `seat` as seen from us.
    #[inline]
    #[must_use]
    pub const fn rel(&self, seat: AbsoluteSeat) -> RelativeSeat {
        relative(self.my_seat, seat)
    }

    #[inline]
    #[must_use]
    pub fn is_me(&self, seat: AbsoluteSeat) -> bool {
        seat == self.my_seat
    }

    /// Counts one more visible copy of `tile`.
    ///
    /// Returns an error if every copy has already been seen.
    fn witness_tile(&mut self, tile: Tile) -> Result<()> {
        ensure!(
            !tile.is_unknown(),
            "desync: attempt to witness an unknown tile",
        );
        let seen = &mut self.tiles_seen[tile.as_usize()];
        ensure!(
            *seen < tile.copies(),
            "desync: attempt to witness one {tile} more than exists",
        );
        *seen += 1;
        Ok(())
    }

    /// Whether every copy of `tile` is already visible to us.
    #[inline]
    #[must_use]
    pub fn is_last_of_kind(&self, tile: Tile) -> bool {
        !tile.is_unknown() && self.tiles_seen[tile.as_usize()] >= tile.copies()
    }

    #[inline]
    #[must_use]
    pub fn is_wall_empty(&self) -> bool {
        self.tiles_left == Some(0)
    }

    /// Clears everything tied to a single deal.
    fn reset_deal(&mut self) {
        *self = Self {
            player_id: self.player_id,
            round: self.round,
            my_seat: self.my_seat,
            dealer: self.dealer,
            at_turn: self.at_turn,
            ..Default::default()
        };
    }

    /// For debug only.
    ///
    /// Return a human readable description of the current state.
    #[must_use]
    pub fn brief_info(&self) -> String {
        let mut discards = String::new();
        for seat in AbsoluteSeat::ALL {
            let tiles = &self.discards[seat.as_usize()];
            let flowers = &self.flowers[seat.as_usize()];
            let calls = &self.calls[seat.as_usize()];
            let _ = writeln!(
                discards,
                "  {seat} ({:?}): {tiles:?} flowers {flowers:?} calls {calls:?}",
                self.rel(seat),
            );
        }

        format!(
            r#"player: {}
round: {}
seat: {}
dealer: {}
turn: {}
hand: {}
hand size: {}
tiles left: {:?}
last discard: {:?}
last self draw: {:?}
replacement: {}
can interact: {}
winner: {:?}
score: {:?}
table:
{discards}"#,
            self.player_id,
            self.round,
            self.my_seat,
            self.dealer,
            self.at_turn,
            self.hand,
            self.hand.size(),
            self.tiles_left,
            self.last_discard,
            self.last_self_draw,
            self.drew_replacement,
            self.can_interact,
            self.winner,
            self.last_score,
        )
    }
}
