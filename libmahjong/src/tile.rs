use crate::{matches_tu8, t, tu8};
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of real tile kinds: 27 numbered, 7 honors and 8 flowers.
pub const NUM_KINDS: usize = 3 * 9 + 7 + 8;
const TILE_STRINGS_LEN: usize = NUM_KINDS + 1;
const TILE_STRINGS: [&str; TILE_STRINGS_LEN] = [
    "1m", "2m", "3m", "4m", "5m", "6m", "7m", "8m", "9m", // m
    "1p", "2p", "3p", "4p", "5p", "6p", "7p", "8p", "9p", // p
    "1s", "2s", "3s", "4s", "5s", "6s", "7s", "8s", "9s", // s
    "E", "S", "W", "N", "P", "F", "C", // z
    "1f", "2f", "3f", "4f", "5f", "6f", "7f", "8f", // flowers and seasons
    "?",  // unknown
];

static TILE_STRINGS_MAP: LazyLock<AHashMap<&'static str, Tile>> = LazyLock::new(|| {
    TILE_STRINGS
        .iter()
        .enumerate()
        .map(|(id, &s)| (s, Tile(id as u8)))
        .collect()
});

/// One of the 42 tile kinds, or the `?` placeholder.
///
/// Ids are laid out suit by suit, then honors, then flowers, so the derived
/// `Ord` is the display order of a sorted hand.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    Man = 0,
    Pin = 1,
    Sou = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileFamily {
    Numbered,
    Honor,
    Flower,
    Unknown,
}

#[derive(Debug)]
pub enum InvalidTile {
    Number(usize),
    String(String),
}

impl Tile {
    /// The id is not checked. An out-of-bounds id makes later lookups such
    /// as `Display` panic.
    #[inline]
    #[must_use]
    pub const fn new_unchecked(id: u8) -> Self {
        Self(id)
    }

    /// Builds a numbered tile, `None` when `number` is outside 1..=9.
    #[inline]
    #[must_use]
    pub const fn numbered(suit: Suit, number: u8) -> Option<Self> {
        if number < 1 || number > 9 {
            return None;
        }
        Some(Self(suit as u8 * 9 + number - 1))
    }

    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    #[inline]
    #[must_use]
    pub const fn family(self) -> TileFamily {
        match self.0 {
            0..=26 => TileFamily::Numbered,
            27..=33 => TileFamily::Honor,
            34..=41 => TileFamily::Flower,
            _ => TileFamily::Unknown,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_numbered(self) -> bool {
        self.0 < tu8!(E)
    }

    #[inline]
    #[must_use]
    pub const fn is_honor(self) -> bool {
        matches_tu8!(self.0, E | S | W | N | P | F | C)
    }

    #[inline]
    #[must_use]
    pub const fn is_flower(self) -> bool {
        self.0 >= tu8!(1f) && self.0 <= tu8!(8f)
    }

    #[inline]
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        self.0 >= tu8!(?)
    }

    /// Physical copies in a full set: one per flower, four otherwise.
    #[inline]
    #[must_use]
    pub const fn copies(self) -> u8 {
        match self.family() {
            TileFamily::Flower => 1,
            TileFamily::Unknown => 0,
            _ => 4,
        }
    }

    /// Suit of a numbered tile. Honors, flowers and `?` have none.
    #[inline]
    #[must_use]
    pub const fn suit(self) -> Option<Suit> {
        match self.0 / 9 {
            0 => Some(Suit::Man),
            1 => Some(Suit::Pin),
            2 => Some(Suit::Sou),
            _ => None,
        }
    }

    /// Rank 1..=9 of a numbered tile.
    #[inline]
    #[must_use]
    pub const fn number(self) -> Option<u8> {
        if self.is_numbered() {
            Some(self.0 % 9 + 1)
        } else {
            None
        }
    }

    /// The tile `offset` ranks away in the same suit, if it exists.
    ///
    /// Unlike a dora-style `next`, this never wraps from 9 back to 1.
    #[inline]
    #[must_use]
    pub const fn offset(self, offset: i8) -> Option<Self> {
        let (Some(suit), Some(number)) = (self.suit(), self.number()) else {
            return None;
        };
        let target = number as i8 + offset;
        if target < 1 || target > 9 {
            return None;
        }
        Self::numbered(suit, target as u8)
    }
}

impl Default for Tile {
    fn default() -> Self {
        t!(?)
    }
}

impl TryFrom<u8> for Tile {
    type Error = InvalidTile;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Self::try_from(v as usize)
    }
}

impl TryFrom<usize> for Tile {
    type Error = InvalidTile;

    fn try_from(v: usize) -> Result<Self, Self::Error> {
        if v >= TILE_STRINGS_LEN {
            Err(InvalidTile::Number(v))
        } else {
            Ok(Self(v as u8))
        }
    }
}

impl FromStr for Tile {
    type Err = InvalidTile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TILE_STRINGS_MAP
            .get(s)
            .copied()
            .ok_or_else(|| InvalidTile::String(s.to_owned()))
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(TILE_STRINGS[self.0 as usize])
    }
}

impl<'de> Deserialize<'de> for Tile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tile = String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)?;
        Ok(tile)
    }
}

impl Serialize for Tile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl fmt::Display for InvalidTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("not a valid tile: ")?;
        match self {
            Self::Number(n) => fmt::Display::fmt(n, f),
            Self::String(s) => write!(f, "\"{s}\""),
        }
    }
}

impl Error for InvalidTile {}

/// Parses a compact hand string such as `"345m 19p ESW 2f"`.
///
/// Digits accumulate until a suit letter (`m`, `p`, `s`, `f`) closes the
/// group; honor letters stand alone. Whitespace is ignored.
pub fn parse_tiles(s: &str) -> Result<Vec<Tile>, InvalidTile> {
    let mut tiles = Vec::with_capacity(14);
    let mut pending = String::new();

    for ch in s.chars().filter(|c| !c.is_whitespace()) {
        match ch {
            '1'..='9' => pending.push(ch),
            'm' | 'p' | 's' | 'f' => {
                if pending.is_empty() {
                    return Err(InvalidTile::String(s.to_owned()));
                }
                for digit in pending.drain(..) {
                    tiles.push(format!("{digit}{ch}").parse()?);
                }
            }
            'E' | 'S' | 'W' | 'N' | 'P' | 'F' | 'C' => {
                if !pending.is_empty() {
                    return Err(InvalidTile::String(s.to_owned()));
                }
                tiles.push(ch.to_string().parse()?);
            }
            _ => return Err(InvalidTile::String(s.to_owned())),
        }
    }

    if !pending.is_empty() {
        return Err(InvalidTile::String(s.to_owned()));
    }
    Ok(tiles)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn convert() {
        "E".parse::<Tile>().unwrap();
        "8f".parse::<Tile>().unwrap();
        "?".parse::<Tile>().unwrap();
        Tile::try_from(0_u8).unwrap();
        Tile::try_from(41_u8).unwrap();
        Tile::try_from(42_u8).unwrap();

        "".parse::<Tile>().unwrap_err();
        "0s".parse::<Tile>().unwrap_err();
        "9f".parse::<Tile>().unwrap_err();
        "5mr".parse::<Tile>().unwrap_err();
        Tile::try_from(43_u8).unwrap_err();
        Tile::try_from(u8::MAX).unwrap_err();
    }

    #[test]
    fn families() {
        let mut counts = [0; 3];
        for id in 0..NUM_KINDS {
            let tile = Tile::try_from(id).unwrap();
            match tile.family() {
                TileFamily::Numbered => {
                    counts[0] += 1;
                    assert!(tile.suit().is_some());
                    assert!(matches!(tile.number(), Some(1..=9)));
                }
                TileFamily::Honor => {
                    counts[1] += 1;
                    assert!(tile.is_honor());
                    assert_eq!(tile.suit(), None);
                    assert_eq!(tile.number(), None);
                }
                TileFamily::Flower => {
                    counts[2] += 1;
                    assert!(tile.is_flower());
                    assert_eq!(tile.suit(), None);
                    assert_eq!(tile.number(), None);
                }
                TileFamily::Unknown => panic!("{tile} is a real kind"),
            }
        }
        assert_eq!(counts, [27, 7, 8]);
        assert_eq!(t!(?).family(), TileFamily::Unknown);
        assert_eq!(t!(?).suit(), None);
        assert_eq!(t!(3f).copies(), 1);
        assert_eq!(t!(P).copies(), 4);
    }

    #[test]
    fn offset() {
        assert_eq!(t!(3m).offset(2), Some(t!(5m)));
        assert_eq!(t!(3p).offset(-2), Some(t!(1p)));
        assert_eq!(t!(8s).offset(2), None);
        assert_eq!(t!(1s).offset(-1), None);
        assert_eq!(t!(E).offset(1), None);
        assert_eq!(t!(1f).offset(1), None);
        assert_eq!(Tile::numbered(Suit::Sou, 9), Some(t!(9s)));
        assert_eq!(Tile::numbered(Suit::Pin, 0), None);
    }

    #[test]
    fn ordering() {
        assert!(t!(9m) < t!(1p));
        assert!(t!(9s) < t!(E));
        assert!(t!(C) < t!(1f));
        assert!(t!(8f) < t!(?));
    }

    #[test]
    fn parse() {
        assert_eq!(
            parse_tiles("345m 19p ESW 2f").unwrap(),
            t![3m, 4m, 5m, 1p, 9p, E, S, W, 2f],
        );
        assert_eq!(parse_tiles("").unwrap(), vec![]);
        parse_tiles("345").unwrap_err();
        parse_tiles("m").unwrap_err();
        parse_tiles("3E").unwrap_err();
        parse_tiles("9f").unwrap_err();
        parse_tiles("3x").unwrap_err();
    }

    #[test]
    fn serde_string_form() {
        let json = serde_json::to_string(&t!(2f)).unwrap();
        assert_eq!(json, r#""2f""#);
        let tile: Tile = serde_json::from_str(r#""C""#).unwrap();
        assert_eq!(tile, t!(C));
        serde_json::from_str::<Tile>(r#""0m""#).unwrap_err();
    }
}
