use crate::seat::RelativeSeat;
use crate::tile::Tile;
use std::fmt;

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use tinyvec::ArrayVec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallShape {
    #[default]
    Chii,
    Pung,
    ConcealedKong,
    /// Only ever produced by promoting an exposed `Pung` in place.
    AddedKong,
    ExposedKong,
}

/// An exposed meld.
///
/// `anchor` together with `shape` determines every physical tile of the
/// block. For `Chii` the anchor is the lowest tile of the run, and
/// `source_index` is the position inside the run of the tile claimed from
/// `source`. For the other shapes `source_index` is only a layout hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallBlock {
    pub shape: CallShape,
    pub anchor: Tile,
    pub source: RelativeSeat,
    pub source_index: u8,
}

impl CallShape {
    #[inline]
    #[must_use]
    pub const fn is_kong(self) -> bool {
        matches!(
            self,
            Self::ConcealedKong | Self::AddedKong | Self::ExposedKong
        )
    }

    #[inline]
    #[must_use]
    pub const fn tile_count(self) -> usize {
        if self.is_kong() { 4 } else { 3 }
    }
}

impl CallBlock {
    /// Builds a validated descriptor.
    pub fn new(
        shape: CallShape,
        anchor: Tile,
        source: RelativeSeat,
        source_index: u8,
    ) -> Result<Self> {
        let block = Self {
            shape,
            anchor,
            source,
            source_index,
        };
        block.validate()?;
        Ok(block)
    }

    /// Checks that the descriptor describes real tiles.
    pub fn validate(&self) -> Result<()> {
        let anchor = self.anchor;
        ensure!(
            !anchor.is_unknown() && !anchor.is_flower(),
            "desync: {anchor} cannot anchor a call block",
        );
        ensure!(
            (self.source_index as usize) < self.shape.tile_count(),
            "desync: source index {} out of range for {:?}",
            self.source_index,
            self.shape,
        );
        match self.shape {
            CallShape::Chii => {
                ensure!(
                    anchor.offset(2).is_some(),
                    "desync: {anchor} cannot start a chii run",
                );
                ensure!(
                    self.source == RelativeSeat::Kamicha,
                    "desync: chii can only be claimed from kamicha, got {:?}",
                    self.source,
                );
            }
            CallShape::ConcealedKong => ensure!(
                self.source == RelativeSeat::Jicha,
                "desync: concealed kong must come from own hand, got {:?}",
                self.source,
            ),
            CallShape::Pung | CallShape::ExposedKong | CallShape::AddedKong => ensure!(
                self.source != RelativeSeat::Jicha,
                "desync: {:?} must be claimed from another seat",
                self.shape,
            ),
        }
        Ok(())
    }

    /// Physical tiles of the block, in run order.
    #[must_use]
    pub fn tiles(&self) -> ArrayVec<[Tile; 4]> {
        let mut ret = ArrayVec::new();
        match self.shape {
            CallShape::Chii => {
                for i in 0..3 {
                    if let Some(t) = self.anchor.offset(i) {
                        ret.push(t);
                    }
                }
            }
            shape => {
                for _ in 0..shape.tile_count() {
                    ret.push(self.anchor);
                }
            }
        }
        ret
    }

    /// The tile supplied by `source`, if any. Concealed kongs have none.
    #[must_use]
    pub fn claimed_tile(&self) -> Option<Tile> {
        match self.shape {
            CallShape::ConcealedKong => None,
            CallShape::Chii => self.anchor.offset(self.source_index as i8),
            _ => Some(self.anchor),
        }
    }

    /// Tiles this block takes out of the concealed hand when it is applied.
    /// `AddedKong` counts only the promoting tile.
    #[must_use]
    pub fn consumed(&self) -> ArrayVec<[Tile; 4]> {
        let mut ret = ArrayVec::new();
        match self.shape {
            CallShape::Chii => {
                for (i, t) in self.tiles().into_iter().enumerate() {
                    if i != self.source_index as usize {
                        ret.push(t);
                    }
                }
            }
            CallShape::Pung => ret.extend([self.anchor; 2]),
            CallShape::ExposedKong => ret.extend([self.anchor; 3]),
            CallShape::ConcealedKong => ret.extend([self.anchor; 4]),
            CallShape::AddedKong => ret.push(self.anchor),
        }
        ret
    }
}

impl fmt::Display for CallBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tiles = self.tiles();
        match self.shape {
            CallShape::ConcealedKong => write!(f, "[{tiles:?}]"),
            _ => write!(f, "({tiles:?} <- {:?})", self.source),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::t;

    #[test]
    fn tiles_of_shapes() {
        let chii = CallBlock::new(CallShape::Chii, t!(3m), RelativeSeat::Kamicha, 2).unwrap();
        assert_eq!(chii.tiles().as_slice(), &t![3m, 4m, 5m]);
        assert_eq!(chii.consumed().as_slice(), &t![3m, 4m]);
        assert_eq!(chii.claimed_tile(), Some(t!(5m)));

        let pung = CallBlock::new(CallShape::Pung, t!(E), RelativeSeat::Toimen, 1).unwrap();
        assert_eq!(pung.tiles().len(), 3);
        assert_eq!(pung.consumed().len(), 2);

        let ankan =
            CallBlock::new(CallShape::ConcealedKong, t!(2m), RelativeSeat::Jicha, 0).unwrap();
        assert_eq!(ankan.tiles().as_slice(), &[t!(2m); 4]);
        assert_eq!(ankan.claimed_tile(), None);
    }

    #[test]
    fn rejects_bad_descriptors() {
        CallBlock::new(CallShape::Chii, t!(8m), RelativeSeat::Kamicha, 0).unwrap_err();
        CallBlock::new(CallShape::Chii, t!(E), RelativeSeat::Kamicha, 0).unwrap_err();
        CallBlock::new(CallShape::Chii, t!(3m), RelativeSeat::Toimen, 0).unwrap_err();
        CallBlock::new(CallShape::Chii, t!(3m), RelativeSeat::Kamicha, 3).unwrap_err();
        CallBlock::new(CallShape::Pung, t!(1f), RelativeSeat::Toimen, 0).unwrap_err();
        CallBlock::new(CallShape::Pung, t!(5p), RelativeSeat::Jicha, 0).unwrap_err();
        CallBlock::new(CallShape::ConcealedKong, t!(5p), RelativeSeat::Toimen, 0).unwrap_err();
        CallBlock::new(CallShape::ExposedKong, t!(5p), RelativeSeat::Shimocha, 3).unwrap();
    }

    #[test]
    fn descriptor_json() {
        let block = CallBlock::new(CallShape::Pung, t!(3m), RelativeSeat::Toimen, 1).unwrap();
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(
            json,
            r#"{"shape":"pung","anchor":"3m","source":"toimen","source_index":1}"#,
        );
        let back: CallBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);

        let kakan: CallBlock = serde_json::from_str(
            r#"{"shape":"added_kong","anchor":"P","source":"kamicha","source_index":2}"#,
        )
        .unwrap();
        assert_eq!(kakan.shape, CallShape::AddedKong);
        kakan.validate().unwrap();
    }
}
