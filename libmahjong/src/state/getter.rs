use super::TableState;
use crate::call::CallBlock;
use crate::hand::Hand;
use crate::score::ScoreResult;
use crate::seat::{AbsoluteSeat, Round};
use crate::tile::{NUM_KINDS, Tile};

impl TableState {
    #[inline]
    #[must_use]
    pub const fn player_id(&self) -> u8 {
        self.player_id
    }
    #[inline]
    #[must_use]
    pub const fn round(&self) -> Round {
        self.round
    }
    #[inline]
    #[must_use]
    pub const fn my_seat(&self) -> AbsoluteSeat {
        self.my_seat
    }
    #[inline]
    #[must_use]
    pub const fn dealer(&self) -> AbsoluteSeat {
        self.dealer
    }
    #[inline]
    #[must_use]
    pub const fn at_turn(&self) -> AbsoluteSeat {
        self.at_turn
    }
    #[inline]
    #[must_use]
    pub fn is_dealer(&self) -> bool {
        self.dealer == self.my_seat
    }

    #[inline]
    #[must_use]
    pub const fn hand(&self) -> &Hand {
        &self.hand
    }
    #[inline]
    #[must_use]
    pub const fn tiles_seen(&self) -> &[u8; NUM_KINDS] {
        &self.tiles_seen
    }

    #[inline]
    #[must_use]
    pub fn discards(&self, seat: AbsoluteSeat) -> &[Tile] {
        &self.discards[seat.as_usize()]
    }
    #[inline]
    #[must_use]
    pub fn flowers(&self, seat: AbsoluteSeat) -> &[Tile] {
        &self.flowers[seat.as_usize()]
    }
    /// Call blocks of any seat, ours included.
    #[must_use]
    pub fn calls(&self, seat: AbsoluteSeat) -> &[CallBlock] {
        if self.is_me(seat) {
            self.hand.calls()
        } else {
            &self.calls[seat.as_usize()]
        }
    }

    #[inline]
    #[must_use]
    pub const fn tiles_left(&self) -> Option<u8> {
        self.tiles_left
    }
    #[inline]
    #[must_use]
    pub const fn last_discard(&self) -> Option<(AbsoluteSeat, Tile)> {
        self.last_discard
    }
    #[inline]
    #[must_use]
    pub const fn last_self_draw(&self) -> Option<Tile> {
        self.last_self_draw
    }
    #[inline]
    #[must_use]
    pub const fn robbable_kong(&self) -> Option<(AbsoluteSeat, Tile)> {
        self.robbable_kong
    }
    #[inline]
    #[must_use]
    pub const fn is_replacement(&self) -> bool {
        self.drew_replacement
    }

    #[inline]
    #[must_use]
    pub const fn can_interact(&self) -> bool {
        self.can_interact
    }
    #[inline]
    #[must_use]
    pub const fn winner(&self) -> Option<AbsoluteSeat> {
        self.winner
    }
    #[inline]
    #[must_use]
    pub const fn last_score(&self) -> Option<&ScoreResult> {
        self.last_score.as_ref()
    }
}
