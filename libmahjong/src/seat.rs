use std::error::Error;
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail, ensure};
use serde::{Deserialize, Serialize};

/// Fixed compass seat. Turn order is East -> South -> West -> North -> East.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbsoluteSeat {
    #[serde(rename = "E")]
    East = 0,
    #[serde(rename = "S")]
    South = 1,
    #[serde(rename = "W")]
    West = 2,
    #[serde(rename = "N")]
    North = 3,
}

/// A seat seen from the local player.
///
/// `Shimocha` acts right after us, `Kamicha` right before us, so chii is
/// only ever claimed from `Kamicha`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RelativeSeat {
    #[default]
    Jicha = 0,
    Shimocha = 1,
    Toimen = 2,
    Kamicha = 3,
}

#[derive(Debug)]
pub struct InvalidSeat(pub u8);

impl AbsoluteSeat {
    pub const ALL: [Self; 4] = [Self::East, Self::South, Self::West, Self::North];

    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self as usize
    }

    #[inline]
    #[must_use]
    pub const fn from_index(idx: u8) -> Self {
        match idx % 4 {
            0 => Self::East,
            1 => Self::South,
            2 => Self::West,
            _ => Self::North,
        }
    }

    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        self.rotate(RelativeSeat::Shimocha)
    }

    /// Advances by a relative delta. A claim moves the turn by the claimer's
    /// seat delta, not by one.
    #[inline]
    #[must_use]
    pub const fn rotate(self, delta: RelativeSeat) -> Self {
        Self::from_index(self as u8 + delta as u8)
    }
}

impl RelativeSeat {
    pub const ALL: [Self; 4] = [Self::Jicha, Self::Shimocha, Self::Toimen, Self::Kamicha];

    #[inline]
    #[must_use]
    pub const fn from_index(idx: u8) -> Self {
        match idx % 4 {
            0 => Self::Jicha,
            1 => Self::Shimocha,
            2 => Self::Toimen,
            _ => Self::Kamicha,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self as usize
    }
}

/// `(target - current + 4) mod 4`, the label of `target` as seen from
/// `current`.
#[inline]
#[must_use]
pub const fn relative(current: AbsoluteSeat, target: AbsoluteSeat) -> RelativeSeat {
    RelativeSeat::from_index(target as u8 + 4 - current as u8)
}

/// Inverse of [`relative`].
#[inline]
#[must_use]
pub const fn absolute(rel: RelativeSeat, current: AbsoluteSeat) -> AbsoluteSeat {
    current.rotate(rel)
}

impl TryFrom<u8> for AbsoluteSeat {
    type Error = InvalidSeat;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        if v < 4 {
            Ok(Self::from_index(v))
        } else {
            Err(InvalidSeat(v))
        }
    }
}

impl fmt::Display for AbsoluteSeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::East => "E",
            Self::South => "S",
            Self::West => "W",
            Self::North => "N",
        })
    }
}

impl fmt::Display for InvalidSeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a valid seat: {}", self.0)
    }
}

impl Error for InvalidSeat {}

/// One deal of the game: prevailing wind x dealer number, then `End`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Round {
    #[default]
    East1 = 0,
    East2,
    East3,
    East4,
    South1,
    South2,
    South3,
    South4,
    West1,
    West2,
    West3,
    West4,
    North1,
    North2,
    North3,
    North4,
    End,
}

const PLAYABLE_ROUNDS: [Round; 16] = [
    Round::East1,
    Round::East2,
    Round::East3,
    Round::East4,
    Round::South1,
    Round::South2,
    Round::South3,
    Round::South4,
    Round::West1,
    Round::West2,
    Round::West3,
    Round::West4,
    Round::North1,
    Round::North2,
    Round::North3,
    Round::North4,
];

/// `DEAL_TABLE[deal - 1][seat]` is the player index sitting at `seat`
/// (E, S, W, N) during that deal.
///
/// Inside one wind the dealership passes to the South player each deal.
/// Between winds the players change seats: East and South swap, West and
/// North swap, and so on, following the customary seat draw.
pub const DEAL_TABLE: [[u8; 4]; 16] = [
    // East
    [0, 1, 2, 3],
    [1, 2, 3, 0],
    [2, 3, 0, 1],
    [3, 0, 1, 2],
    // South
    [1, 0, 3, 2],
    [0, 3, 2, 1],
    [3, 2, 1, 0],
    [2, 1, 0, 3],
    // West
    [2, 3, 1, 0],
    [3, 1, 0, 2],
    [1, 0, 2, 3],
    [0, 2, 3, 1],
    // North
    [3, 2, 0, 1],
    [2, 0, 1, 3],
    [0, 1, 3, 2],
    [1, 3, 2, 0],
];

impl Round {
    #[inline]
    #[must_use]
    pub const fn is_end(self) -> bool {
        matches!(self, Self::End)
    }

    /// Deal number 1..=16.
    pub fn deal_number(self) -> Result<u8> {
        ensure!(!self.is_end(), "desync: deal number requested on END");
        Ok(self as u8 + 1)
    }

    pub fn from_deal_number(deal: u8) -> Result<Self> {
        ensure!(
            (1..=16).contains(&deal),
            "deal number {deal} is not in range [1, 16]",
        );
        Ok(PLAYABLE_ROUNDS[deal as usize - 1])
    }

    /// Dealer number 1..=4 inside the prevailing wind.
    pub fn number(self) -> Result<u8> {
        ensure!(!self.is_end(), "desync: round number requested on END");
        Ok(self as u8 % 4 + 1)
    }

    /// Prevailing wind.
    pub fn wind(self) -> Result<AbsoluteSeat> {
        ensure!(!self.is_end(), "desync: round wind requested on END");
        Ok(AbsoluteSeat::from_index(self as u8 / 4))
    }

    /// North 4 is followed by `End`; asking past `End` is an error.
    pub fn next_round(self) -> Result<Self> {
        match self {
            Self::End => bail!("desync: no round after END"),
            Self::North4 => Ok(Self::End),
            r => Ok(PLAYABLE_ROUNDS[r as usize + 1]),
        }
    }

    /// Player index at `seat` for this deal.
    pub fn player_at(self, seat: AbsoluteSeat) -> Result<u8> {
        let deal = self.deal_number()?;
        Ok(DEAL_TABLE[deal as usize - 1][seat.as_usize()])
    }

    /// Absolute seat of `player` for this deal.
    pub fn seat_of(self, player: u8) -> Result<AbsoluteSeat> {
        ensure!(player < 4, "player index {player} is not in range [0, 3]");
        let deal = self.deal_number()?;
        let row = &DEAL_TABLE[deal as usize - 1];
        let Some(pos) = row.iter().position(|&p| p == player) else {
            bail!("deal table row {deal} does not seat player {player}");
        };
        Ok(AbsoluteSeat::from_index(pos as u8))
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.wind(), self.number()) {
            (Ok(wind), Ok(number)) => write!(f, "{wind}{number}"),
            _ => f.write_str("END"),
        }
    }
}

impl FromStr for Round {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "END" {
            return Ok(Self::End);
        }
        let mut chars = s.chars();
        let (Some(wind), Some(number), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("not a valid round: {s:?}");
        };
        let wind = match wind {
            'E' => 0,
            'S' => 1,
            'W' => 2,
            'N' => 3,
            _ => bail!("not a valid round: {s:?}"),
        };
        let Some(number @ 1..=4) = number.to_digit(10) else {
            bail!("not a valid round: {s:?}");
        };
        Self::from_deal_number(wind * 4 + number as u8)
    }
}

impl Serialize for Round {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Round {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn relative_labels() {
        use AbsoluteSeat::*;
        assert_eq!(relative(East, West), RelativeSeat::Toimen);
        assert_eq!(relative(South, South), RelativeSeat::Jicha);
        assert_eq!(relative(East, South), RelativeSeat::Shimocha);
        assert_eq!(relative(East, North), RelativeSeat::Kamicha);
        assert_eq!(relative(North, East), RelativeSeat::Shimocha);
    }

    #[test]
    fn relative_round_trip() {
        for current in AbsoluteSeat::ALL {
            for target in AbsoluteSeat::ALL {
                assert_eq!(absolute(relative(current, target), current), target);
            }
        }
    }

    #[test]
    fn rotation() {
        assert_eq!(AbsoluteSeat::North.next(), AbsoluteSeat::East);
        assert_eq!(
            AbsoluteSeat::South.rotate(RelativeSeat::Kamicha),
            AbsoluteSeat::East,
        );
        assert_eq!(
            AbsoluteSeat::West.rotate(RelativeSeat::Jicha),
            AbsoluteSeat::West,
        );
        AbsoluteSeat::try_from(4).unwrap_err();
    }

    #[test]
    fn deal_table_is_permutations() {
        for (deal, row) in DEAL_TABLE.iter().enumerate() {
            let mut seen = [false; 4];
            for &p in row {
                assert!(!seen[p as usize], "deal {} repeats player {p}", deal + 1);
                seen[p as usize] = true;
            }
        }
    }

    #[test]
    fn seat_lookup() {
        for deal in 1..=16 {
            let round = Round::from_deal_number(deal).unwrap();
            for player in 0..4 {
                let seat = round.seat_of(player).unwrap();
                assert_eq!(round.player_at(seat).unwrap(), player);
            }
        }
        assert_eq!(Round::East2.seat_of(1).unwrap(), AbsoluteSeat::East);
        assert_eq!(Round::South1.seat_of(0).unwrap(), AbsoluteSeat::South);
        Round::East1.seat_of(4).unwrap_err();
        Round::End.seat_of(0).unwrap_err();
    }

    #[test]
    fn progression() {
        let mut round = Round::East1;
        let mut count = 1;
        while !round.is_end() {
            round = round.next_round().unwrap();
            count += 1;
        }
        assert_eq!(count, 17);
        Round::End.next_round().unwrap_err();
        Round::End.number().unwrap_err();
        Round::End.wind().unwrap_err();
        assert_eq!(Round::North4.next_round().unwrap(), Round::End);
        assert_eq!(Round::South3.number().unwrap(), 3);
        assert_eq!(Round::West1.wind().unwrap(), AbsoluteSeat::West);
    }

    #[test]
    fn round_text() {
        assert_eq!(Round::South2.to_string(), "S2");
        assert_eq!(Round::End.to_string(), "END");
        assert_eq!("N4".parse::<Round>().unwrap(), Round::North4);
        assert_eq!("END".parse::<Round>().unwrap(), Round::End);
        "E5".parse::<Round>().unwrap_err();
        "X1".parse::<Round>().unwrap_err();
        "E".parse::<Round>().unwrap_err();
    }
}
