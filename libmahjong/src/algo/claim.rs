//! Enumeration of chii/pon/kan responses to a reference tile.
//!
//! Everything here is a pure query over a [`Hand`] and a
//! [`WinningCondition`]. Hu, flower and skip candidates come from elsewhere
//! and are merged in [`rank_actions`].

use crate::action::{ActionKind, GameAction, WinningCondition};
use crate::call::CallShape;
use crate::hand::Hand;
use crate::must_tile;
use crate::seat::RelativeSeat;
use crate::tile::Tile;

use tinyvec::ArrayVec;

/// One action per 3-tile run containing the reference tile whose other two
/// members are held. The action's tile is the lowest tile of the run.
#[must_use]
pub fn chii_candidates(
    hand: &Hand,
    cond: &WinningCondition,
    priority: RelativeSeat,
) -> ArrayVec<[GameAction; 3]> {
    let mut ret = ArrayVec::new();
    let reference = cond.tile;
    if !reference.is_numbered() || !cond.discarded || cond.last_tile {
        return ret;
    }

    for start in -2..=0 {
        let Some(low) = reference.offset(start) else {
            continue;
        };
        let (Some(mid), Some(high)) = (low.offset(1), low.offset(2)) else {
            continue;
        };
        if low.suit() != mid.suit() || mid.suit() != high.suit() {
            continue;
        }
        let held_ok = [low, mid, high]
            .into_iter()
            .enumerate()
            .filter(|&(i, _)| i as i8 != -start)
            .all(|(_, t)| t != reference && hand.count(t) > 0);
        if held_ok {
            ret.push(GameAction::new(ActionKind::Chii, priority, low));
        }
    }
    ret
}

#[must_use]
pub fn pung_candidate(
    hand: &Hand,
    cond: &WinningCondition,
    priority: RelativeSeat,
) -> Option<GameAction> {
    let reference = cond.tile;
    (cond.discarded
        && !cond.last_tile
        && !reference.is_flower()
        && !reference.is_unknown()
        && hand.count(reference) >= 2)
        .then(|| GameAction::new(ActionKind::Pon, priority, reference))
}

/// Exposed kong on a discard, or concealed and added kongs on our own draw.
#[must_use]
pub fn kan_candidates(
    hand: &Hand,
    cond: &WinningCondition,
    priority: RelativeSeat,
) -> ArrayVec<[GameAction; 8]> {
    let mut ret = ArrayVec::new();
    if cond.last_tile {
        return ret;
    }
    let reference = cond.tile;

    if cond.discarded {
        if !reference.is_flower()
            && !reference.is_unknown()
            && kan_shape(hand, cond, reference).is_some()
        {
            ret.push(GameAction::new(ActionKind::Kan, priority, reference));
        }
        return ret;
    }

    for (id, &n) in hand.counts().iter().enumerate() {
        let tile = must_tile!(id);
        if n > 0 && !tile.is_flower() && kan_shape(hand, cond, tile).is_some() {
            ret.push(GameAction::new(ActionKind::Kan, priority, tile));
        }
    }
    ret
}

/// Which call shape a kan on `tile` would produce.
#[must_use]
pub fn kan_shape(hand: &Hand, cond: &WinningCondition, tile: Tile) -> Option<CallShape> {
    if cond.discarded {
        return (hand.count(tile) >= 3).then_some(CallShape::ExposedKong);
    }
    let has_pung = hand
        .calls()
        .iter()
        .any(|c| c.shape == CallShape::Pung && c.anchor == tile);
    if has_pung && hand.count(tile) > 0 {
        Some(CallShape::AddedKong)
    } else if hand.count(tile) == 4 {
        Some(CallShape::ConcealedKong)
    } else {
        None
    }
}

/// All chii/pon/kan candidates for the reference tile. Chii is only offered
/// when the discard comes from the seat right before us, that is when the
/// turn would rotate by one.
#[must_use]
pub fn claim_candidates(
    hand: &Hand,
    cond: &WinningCondition,
    priority: RelativeSeat,
) -> Vec<GameAction> {
    let mut ret = Vec::with_capacity(8);
    if priority == RelativeSeat::Shimocha {
        ret.extend(chii_candidates(hand, cond, priority));
    }
    ret.extend(pung_candidate(hand, cond, priority));
    ret.extend(kan_candidates(hand, cond, priority));
    ret
}

/// Merges candidate lists and sorts them by the action order, dropping
/// duplicates.
#[must_use]
pub fn rank_actions<I>(candidates: I) -> Vec<GameAction>
where
    I: IntoIterator<Item = GameAction>,
{
    let mut ret: Vec<_> = candidates.into_iter().collect();
    ret.sort_unstable();
    ret.dedup();
    ret
}
