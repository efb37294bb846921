use super::{ActionPrompt, EventKind, GameEvent, InboundEvent, Translated, action_kind, event_kind};
use crate::call::{CallBlock, CallShape};
use crate::score::ScoreResult;
use crate::seat::Round;
use crate::tile::Tile;
use std::error::Error;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug)]
pub enum TranslateError {
    /// No internal kind is registered for this wire name.
    UnknownKind(String),
    Malformed { kind: EventKind, reason: String },
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind(k) => write!(f, "unknown event kind {k:?}"),
            Self::Malformed { kind, reason } => write!(f, "malformed {kind} event: {reason}"),
        }
    }
}

impl Error for TranslateError {}

struct Fields<'a> {
    kind: EventKind,
    ev: &'a InboundEvent,
}

impl Fields<'_> {
    fn malformed(&self, reason: impl Into<String>) -> TranslateError {
        TranslateError::Malformed {
            kind: self.kind,
            reason: reason.into(),
        }
    }

    fn tile(&self) -> Result<Tile, TranslateError> {
        match self.ev.tile {
            Some(t) if !t.is_unknown() => Ok(t),
            Some(_) => Err(self.malformed("tile must be known")),
            None => Err(self.malformed("missing tile")),
        }
    }

    fn opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, TranslateError> {
        match self.ev.payload.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => T::deserialize(v)
                .map(Some)
                .map_err(|e| self.malformed(format!("field `{key}`: {e}"))),
        }
    }

    fn req<T: DeserializeOwned>(&self, key: &str) -> Result<T, TranslateError> {
        self.opt(key)?
            .ok_or_else(|| self.malformed(format!("missing field `{key}`")))
    }

    fn block(&self, shape: CallShape) -> Result<CallBlock, TranslateError> {
        let block: CallBlock = self.req("call")?;
        if block.shape != shape {
            return Err(self.malformed(format!(
                "call shape {:?} does not match the event",
                block.shape,
            )));
        }
        block
            .validate()
            .map_err(|e| self.malformed(format!("{e:#}")))?;
        Ok(block)
    }
}

/// Translates a wire event into a typed one plus the optional response
/// window and wall counter it carries.
///
/// Nothing is applied here, so a malformed event can be dropped whole.
pub fn translate(ev: &InboundEvent) -> Result<Translated, TranslateError> {
    let kind = event_kind(&ev.kind).ok_or_else(|| TranslateError::UnknownKind(ev.kind.clone()))?;
    let f = Fields { kind, ev };
    let seat = ev.seat;

    let event = match kind {
        EventKind::Deal => {
            let tiles: Vec<Tile> = f.req("tiles")?;
            if tiles.len() > 14 {
                return Err(f.malformed(format!("{} tiles dealt", tiles.len())));
            }
            let round = f
                .opt::<String>("round")?
                .map(|s| s.parse::<Round>())
                .transpose()
                .map_err(|e| f.malformed(format!("{e:#}")))?;
            GameEvent::Deal {
                dealer: seat,
                tiles,
                round,
            }
        }
        EventKind::InitialFlowerExchange => {
            let flowers: Vec<Tile> = f.req("flowers")?;
            let replacements: Vec<Tile> = f.opt("replacements")?.unwrap_or_default();
            if let Some(t) = flowers.iter().find(|t| !t.is_flower()) {
                return Err(f.malformed(format!("{t} is not a flower")));
            }
            if !replacements.is_empty() && replacements.len() != flowers.len() {
                return Err(f.malformed(format!(
                    "{} flowers but {} replacements",
                    flowers.len(),
                    replacements.len(),
                )));
            }
            GameEvent::InitialFlowerExchange {
                seat,
                flowers,
                replacements,
            }
        }
        EventKind::InitialFlowerExchangeAck => GameEvent::InitialFlowerExchangeAck { seat },
        EventKind::SelfDraw => GameEvent::SelfDraw {
            seat,
            tile: ev.tile.unwrap_or_default(),
        },
        EventKind::Discard => GameEvent::Discard {
            seat,
            tile: f.tile()?,
        },
        EventKind::Chii => GameEvent::Chii {
            seat,
            block: f.block(CallShape::Chii)?,
        },
        EventKind::Pon => GameEvent::Pon {
            seat,
            block: f.block(CallShape::Pung)?,
        },
        EventKind::ExposedKong => GameEvent::ExposedKong {
            seat,
            block: f.block(CallShape::ExposedKong)?,
        },
        EventKind::AddedKong => GameEvent::AddedKong {
            seat,
            block: f.block(CallShape::AddedKong)?,
        },
        EventKind::ConcealedKong => GameEvent::ConcealedKong {
            seat,
            block: f.block(CallShape::ConcealedKong)?,
        },
        EventKind::Flower => {
            let flower = f.tile()?;
            if !flower.is_flower() {
                return Err(f.malformed(format!("{flower} is not a flower")));
            }
            GameEvent::Flower { seat, flower }
        }
        EventKind::RobbingKong => GameEvent::RobbingKong {
            seat,
            tile: f.tile()?,
        },
        EventKind::Win => GameEvent::Win {
            seat,
            tile: ev.tile.filter(|t| !t.is_unknown()),
            score: f.opt::<ScoreResult>("score")?,
        },
    };

    let prompt = match f.opt::<u32>("action_id")? {
        Some(action_id) => {
            let allowed = f.opt::<Vec<String>>("actions")?.map(|names| {
                names
                    .iter()
                    .filter_map(|name| {
                        let k = action_kind(name);
                        if k.is_none() {
                            log::warn!("ignoring unknown action {name:?} in {kind} prompt");
                        }
                        k
                    })
                    .collect()
            });
            Some(ActionPrompt {
                action_id,
                remaining_ms: f.opt("remaining_ms")?,
                allowed,
            })
        }
        None => None,
    };

    Ok(Translated {
        event,
        prompt,
        tiles_left: f.opt("tiles_left")?,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::action::ActionKind;
    use crate::seat::{AbsoluteSeat, RelativeSeat};
    use crate::t;

    fn inbound(json: &str) -> InboundEvent {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn discard_with_prompt() {
        let ev = inbound(
            r#"{"kind":"discard","seat":"W","tile":"5m","payload":{"action_id":9,"remaining_ms":8000,"actions":["pon","skip","riichi"],"tiles_left":40}}"#,
        );
        let tr = translate(&ev).unwrap();
        assert_eq!(tr.event, GameEvent::Discard {
            seat: AbsoluteSeat::West,
            tile: t!(5m),
        });
        let prompt = tr.prompt.unwrap();
        assert_eq!(prompt.action_id, 9);
        assert_eq!(prompt.remaining_ms, Some(8000));
        assert_eq!(prompt.allowed, Some(vec![ActionKind::Pon, ActionKind::Skip]));
        assert_eq!(tr.tiles_left, Some(40));
    }

    #[test]
    fn call_event() {
        let ev = inbound(
            r#"{"kind":"pon","seat":"S","payload":{"call":{"shape":"pung","anchor":"C","source":"toimen","source_index":2}}}"#,
        );
        let tr = translate(&ev).unwrap();
        let block = tr.event.call_block().unwrap();
        assert_eq!(block.anchor, t!(C));
        assert_eq!(block.source, RelativeSeat::Toimen);
        assert_eq!(tr.event.kind(), EventKind::Pon);
        assert_eq!(tr.event.seat(), AbsoluteSeat::South);
        assert!(tr.prompt.is_none());
    }

    #[test]
    fn unknown_kind() {
        let ev = inbound(r#"{"kind":"riichi","seat":"E"}"#);
        assert!(matches!(translate(&ev), Err(TranslateError::UnknownKind(k)) if k == "riichi"));
    }

    #[test]
    fn malformed_payloads() {
        for json in [
            r#"{"kind":"discard","seat":"E"}"#,
            r#"{"kind":"discard","seat":"E","tile":"?"}"#,
            r#"{"kind":"pon","seat":"E"}"#,
            r#"{"kind":"pon","seat":"E","payload":{"call":{"shape":"chii","anchor":"3m","source":"kamicha","source_index":0}}}"#,
            r#"{"kind":"chii","seat":"E","payload":{"call":{"shape":"chii","anchor":"8m","source":"kamicha","source_index":0}}}"#,
            r#"{"kind":"flower","seat":"N","tile":"E"}"#,
            r#"{"kind":"deal","seat":"E","payload":{"tiles":"123m"}}"#,
            r#"{"kind":"deal","seat":"E","payload":{"tiles":[],"round":"Q9"}}"#,
            r#"{"kind":"deal_flower","seat":"E","payload":{"flowers":["1f","2f"],"replacements":["3m"]}}"#,
            r#"{"kind":"draw","seat":"E","payload":{"action_id":"x"}}"#,
        ] {
            let ev = inbound(json);
            assert!(
                matches!(translate(&ev), Err(TranslateError::Malformed { .. })),
                "{json} should be malformed",
            );
        }
    }

    #[test]
    fn hidden_draw_and_deal() {
        let ev = inbound(r#"{"kind":"draw","seat":"N"}"#);
        assert_eq!(translate(&ev).unwrap().event, GameEvent::SelfDraw {
            seat: AbsoluteSeat::North,
            tile: t!(?),
        });

        let ev = inbound(
            r#"{"kind":"deal","seat":"E","payload":{"tiles":["1m","2m","E"],"round":"S2"}}"#,
        );
        let GameEvent::Deal { dealer, tiles, round } = translate(&ev).unwrap().event else {
            panic!("not a deal");
        };
        assert_eq!(dealer, AbsoluteSeat::East);
        assert_eq!(tiles, t![1m, 2m, E]);
        assert_eq!(round, Some(Round::South2));
    }

    #[test]
    fn win_with_score() {
        let ev = inbound(
            r#"{"kind":"hu","seat":"S","tile":"9p","payload":{"score":{"total":8,"bonuses":[["self drawn",1]]}}}"#,
        );
        let GameEvent::Win { tile, score, .. } = translate(&ev).unwrap().event else {
            panic!("not a win");
        };
        assert_eq!(tile, Some(t!(9p)));
        assert_eq!(score.unwrap().total, 8);
    }
}
