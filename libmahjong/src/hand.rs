use crate::call::{CallBlock, CallShape};
use crate::must_tile;
use crate::tile::{NUM_KINDS, Tile};
use std::fmt;

use anyhow::{Result, bail, ensure};
use derivative::Derivative;
use serde::Serialize;
use tinyvec::ArrayVec;

/// Upper bound of [`Hand::size`], reached only between a draw (or a claim)
/// and the following discard.
pub const MAX_HAND_SIZE: u8 = 14;

/// One player's concealed tiles, exposed call blocks and drawn-tile marker.
///
/// Every operation checks all of its preconditions before touching any
/// field, so a failed operation leaves the hand exactly as it was.
#[derive(Clone, PartialEq, Eq, Derivative)]
#[derivative(Default)]
pub struct Hand {
    #[derivative(Default(value = "[0; NUM_KINDS]"))]
    counts: [u8; NUM_KINDS],
    calls: ArrayVec<[CallBlock; 4]>,
    drawn: Option<Tile>,
}

impl Hand {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Concealed tiles plus 3 per call block, kongs included.
    #[must_use]
    pub fn size(&self) -> u8 {
        let concealed: u8 = self.counts.iter().sum();
        concealed + 3 * self.calls.len() as u8
    }

    #[inline]
    #[must_use]
    pub fn count(&self, tile: Tile) -> u8 {
        self.counts.get(tile.as_usize()).copied().unwrap_or(0)
    }

    #[inline]
    #[must_use]
    pub const fn counts(&self) -> &[u8; NUM_KINDS] {
        &self.counts
    }

    #[inline]
    #[must_use]
    pub fn calls(&self) -> &[CallBlock] {
        &self.calls
    }

    #[inline]
    #[must_use]
    pub const fn drawn(&self) -> Option<Tile> {
        self.drawn
    }

    /// Physical copies of `tile` we hold, concealed or in our own blocks.
    #[must_use]
    pub fn held(&self, tile: Tile) -> u8 {
        let exposed = self
            .calls
            .iter()
            .flat_map(CallBlock::tiles)
            .filter(|&t| t == tile)
            .count();
        self.count(tile) + exposed as u8
    }

    /// Concealed tiles in ascending order.
    #[must_use]
    pub fn tiles(&self) -> Vec<Tile> {
        self.counts
            .iter()
            .enumerate()
            .flat_map(|(id, &n)| std::iter::repeat_n(must_tile!(id), n as usize))
            .collect()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn ensure_real(tile: Tile, op: &str) -> Result<()> {
        ensure!(
            !tile.is_unknown(),
            "desync: attempt to {op} an unknown tile",
        );
        Ok(())
    }

    /// Fills an empty hand with its starting tiles. A 14th dealer tile must
    /// go through [`Hand::draw`].
    pub fn deal(&mut self, tiles: &[Tile]) -> Result<()> {
        ensure!(
            self.size() == 0,
            "desync: deal into a hand already holding {} tiles",
            self.size(),
        );
        ensure!(
            tiles.len() < MAX_HAND_SIZE as usize,
            "desync: initial deal of {} tiles",
            tiles.len(),
        );
        let mut counts = [0_u8; NUM_KINDS];
        for &tile in tiles {
            Self::ensure_real(tile, "deal")?;
            let c = &mut counts[tile.as_usize()];
            ensure!(
                *c < tile.copies(),
                "desync: initial deal holds too many {tile}",
            );
            *c += 1;
        }
        self.counts = counts;
        Ok(())
    }

    pub fn draw(&mut self, tile: Tile) -> Result<()> {
        Self::ensure_real(tile, "draw")?;
        let size = self.size();
        ensure!(
            size < MAX_HAND_SIZE,
            "desync: attempt to draw {tile} into a hand of {size}",
        );
        ensure!(
            self.held(tile) < tile.copies(),
            "desync: attempt to draw one {tile} too many",
        );
        self.counts[tile.as_usize()] += 1;
        self.drawn = Some(tile);
        Ok(())
    }

    /// Discarding always ends the "just drew" status, whichever tile goes.
    pub fn discard(&mut self, tile: Tile) -> Result<()> {
        Self::ensure_real(tile, "discard")?;
        let c = &mut self.counts[tile.as_usize()];
        ensure!(*c > 0, "desync: attempt to discard {tile} from void");
        *c -= 1;
        self.drawn = None;
        Ok(())
    }

    /// The flower the automatic exchange picks: the drawn tile if it is a
    /// flower, otherwise the lowest flower held.
    #[must_use]
    pub fn next_flower(&self) -> Option<Tile> {
        match self.drawn {
            Some(t) if t.is_flower() => Some(t),
            _ => self.lowest_flower(),
        }
    }

    /// Automatic flower exchange. Returns the exchanged flower.
    pub fn apply_flower(&mut self) -> Result<Tile> {
        let Some(flower) = self.next_flower() else {
            bail!("desync: flower exchange on a hand without flowers");
        };
        self.discard(flower)?;
        Ok(flower)
    }

    /// Swaps a flower for its replacement during the initial exchange.
    ///
    /// Unlike a draw this keeps the drawn-tile marker, unless the marker was
    /// on the flower itself, in which case the replacement takes it over.
    pub fn exchange_flower(&mut self, flower: Tile, replacement: Tile) -> Result<()> {
        ensure!(flower.is_flower(), "desync: {flower} is not a flower");
        Self::ensure_real(replacement, "take")?;
        ensure!(
            self.count(flower) > 0,
            "desync: attempt to exchange {flower} from void",
        );
        let after = self.held(replacement) + 1 - u8::from(replacement == flower);
        ensure!(
            after <= replacement.copies(),
            "desync: flower replacement {replacement} exceeds its copies",
        );
        self.counts[flower.as_usize()] -= 1;
        self.counts[replacement.as_usize()] += 1;
        if self.drawn == Some(flower) {
            self.drawn = Some(replacement);
        }
        Ok(())
    }

    #[must_use]
    pub fn lowest_flower(&self) -> Option<Tile> {
        self.counts
            .iter()
            .enumerate()
            .find(|&(id, &n)| n > 0 && must_tile!(id).is_flower())
            .map(|(id, _)| must_tile!(id))
    }

    #[inline]
    #[must_use]
    pub fn has_flower(&self) -> bool {
        self.lowest_flower().is_some()
    }

    /// Applies a call block of our own.
    ///
    /// The claimed tile of a chii/pung/exposed kong comes from another seat
    /// and never enters the concealed hand.
    pub fn apply_call(&mut self, block: CallBlock) -> Result<()> {
        block.validate()?;
        let consumed = block.consumed();

        let mut need = [0_u8; NUM_KINDS];
        for t in &consumed {
            need[t.as_usize()] += 1;
        }
        for t in &consumed {
            let held = self.count(*t);
            ensure!(
                held >= need[t.as_usize()],
                "desync: {:?} on {} needs {} of {t} but hand holds {held}",
                block.shape,
                block.anchor,
                need[t.as_usize()],
            );
        }

        let promote_idx = if block.shape == CallShape::AddedKong {
            let Some(idx) = self
                .calls
                .iter()
                .position(|c| c.shape == CallShape::Pung && c.anchor == block.anchor)
            else {
                bail!(
                    "desync: added kong on {} without an exposed pung",
                    block.anchor,
                );
            };
            Some(idx)
        } else {
            ensure!(
                self.calls.len() < 4,
                "desync: fifth call block {block}",
            );
            let after = self.size() - consumed.len() as u8 + 3;
            ensure!(
                after <= MAX_HAND_SIZE,
                "desync: {block} would grow the hand to {after}",
            );
            None
        };

        for t in consumed {
            self.counts[t.as_usize()] -= 1;
        }
        if let Some(idx) = promote_idx {
            self.calls[idx].shape = CallShape::AddedKong;
        } else {
            self.calls.push(block);
        }
        if block.shape.is_kong() && block.shape != CallShape::ExposedKong {
            self.drawn = None;
        }
        if let Some(d) = self.drawn
            && self.count(d) == 0
        {
            self.drawn = None;
        }
        Ok(())
    }

    /// The tile an auto-discard targets: the drawn tile, else the highest
    /// concealed tile.
    #[must_use]
    pub fn rightmost_tile(&self) -> Option<Tile> {
        self.drawn.or_else(|| {
            self.counts
                .iter()
                .rposition(|&n| n > 0)
                .map(|id| must_tile!(id))
        })
    }

    /// The tile a timed-out turn discards: like [`Hand::rightmost_tile`],
    /// but flowers are never discarded.
    #[must_use]
    pub fn auto_discard_tile(&self) -> Option<Tile> {
        match self.drawn {
            Some(t) if !t.is_flower() => Some(t),
            _ => self
                .counts
                .iter()
                .enumerate()
                .rposition(|(id, &n)| n > 0 && !must_tile!(id).is_flower())
                .map(|id| must_tile!(id)),
        }
    }
}

impl fmt::Debug for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tiles = self.tiles();
        if let Some(d) = self.drawn
            && let Some(pos) = tiles.iter().position(|&t| t == d)
        {
            tiles.remove(pos);
        }
        for t in &tiles {
            write!(f, "{t} ")?;
        }
        if let Some(d) = self.drawn {
            write!(f, "| {d} ")?;
        }
        for c in &self.calls {
            write!(f, "{c} ")?;
        }
        Ok(())
    }
}

/// Plain view of a hand, for logging and the replay tool's output.
#[derive(Debug, Clone, Serialize)]
pub struct HandView {
    pub tiles: Vec<Tile>,
    pub calls: Vec<CallBlock>,
    pub drawn: Option<Tile>,
    pub size: u8,
}

impl From<&Hand> for HandView {
    fn from(hand: &Hand) -> Self {
        Self {
            tiles: hand.tiles(),
            calls: hand.calls.to_vec(),
            drawn: hand.drawn,
            size: hand.size(),
        }
    }
}
