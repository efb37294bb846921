use crate::action::WinningCondition;
use crate::call::CallBlock;
use crate::tile::Tile;

use serde::{Deserialize, Serialize};

/// Score summary as computed by the server. Bonus names are opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total: i32,
    #[serde(default)]
    pub bonuses: Vec<(String, i32)>,
}

/// The scoring collaborator.
pub trait Scorer: Send + Sync {
    /// Whether declaring hu on `cond` is legal for this hand.
    fn can_win(&self, tiles: &[Tile], calls: &[CallBlock], cond: &WinningCondition) -> bool;

    /// Scores a winning hand, `None` when the hand does not win.
    fn score(
        &self,
        tiles: &[Tile],
        calls: &[CallBlock],
        cond: &WinningCondition,
    ) -> Option<ScoreResult>;
}

/// Defers every decision to the server: hu is legal exactly when the
/// server lists it in the prompt, and the score arrives with the win event.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerScorer;

impl Scorer for ServerScorer {
    fn can_win(&self, _: &[Tile], _: &[CallBlock], _: &WinningCondition) -> bool {
        true
    }

    fn score(&self, _: &[Tile], _: &[CallBlock], _: &WinningCondition) -> Option<ScoreResult> {
        None
    }
}

impl ScoreResult {
    #[must_use]
    pub fn bonus_sum(&self) -> i32 {
        self.bonuses.iter().map(|(_, p)| p).sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_summary() {
        let score: ScoreResult =
            serde_json::from_str(r#"{"total":24,"bonuses":[["all pungs",6],["dragon pung",2]]}"#)
                .unwrap();
        assert_eq!(score.total, 24);
        assert_eq!(score.bonuses[0], ("all pungs".to_owned(), 6));
        assert_eq!(score.bonus_sum(), 8);

        let bare: ScoreResult = serde_json::from_str(r#"{"total":1}"#).unwrap();
        assert!(bare.bonuses.is_empty());
    }
}
