use crate::action::ActionKind;
use std::fmt;
use std::sync::LazyLock;

use ahash::AHashMap;

/// Semantic kind of a server notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Deal,
    InitialFlowerExchange,
    InitialFlowerExchangeAck,
    SelfDraw,
    Discard,
    Chii,
    Pon,
    ExposedKong,
    AddedKong,
    ConcealedKong,
    Flower,
    RobbingKong,
    Win,
}

/// What the client should expect after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Successor {
    Expect(EventKind),
    Terminal,
}

impl EventKind {
    pub const ALL: [Self; 13] = [
        Self::Deal,
        Self::InitialFlowerExchange,
        Self::InitialFlowerExchangeAck,
        Self::SelfDraw,
        Self::Discard,
        Self::Chii,
        Self::Pon,
        Self::ExposedKong,
        Self::AddedKong,
        Self::ConcealedKong,
        Self::Flower,
        Self::RobbingKong,
        Self::Win,
    ];

    /// Lets the caller pre-arm the next affordance without waiting for the
    /// next message. The server may still send something else, a pon instead
    /// of the next draw for example.
    #[must_use]
    pub const fn successor(self) -> Successor {
        match self {
            Self::Deal => Successor::Expect(Self::InitialFlowerExchange),
            Self::InitialFlowerExchange => Successor::Expect(Self::InitialFlowerExchangeAck),
            // The dealer already holds 14 tiles.
            Self::InitialFlowerExchangeAck => Successor::Expect(Self::Discard),
            Self::SelfDraw => Successor::Expect(Self::Discard),
            Self::Discard => Successor::Expect(Self::SelfDraw),
            Self::Chii | Self::Pon => Successor::Expect(Self::Discard),
            Self::ExposedKong | Self::AddedKong | Self::ConcealedKong => {
                Successor::Expect(Self::RobbingKong)
            }
            Self::RobbingKong => Successor::Expect(Self::SelfDraw),
            Self::Flower => Successor::Expect(Self::SelfDraw),
            Self::Win => Successor::Terminal,
        }
    }

    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Deal => "deal",
            Self::InitialFlowerExchange => "deal_flower",
            Self::InitialFlowerExchangeAck => "deal_flower_ack",
            Self::SelfDraw => "draw",
            Self::Discard => "discard",
            Self::Chii => "chii",
            Self::Pon => "pon",
            Self::ExposedKong => "kan_exposed",
            Self::AddedKong => "kan_added",
            Self::ConcealedKong => "kan_concealed",
            Self::Flower => "flower",
            Self::RobbingKong => "rob_kong",
            Self::Win => "hu",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

static WIRE_KINDS: LazyLock<AHashMap<&'static str, EventKind>> = LazyLock::new(|| {
    EventKind::ALL
        .iter()
        .map(|&k| (k.wire_name(), k))
        .collect()
});

static WIRE_ACTIONS: LazyLock<AHashMap<&'static str, ActionKind>> = LazyLock::new(|| {
    [
        ("hu", ActionKind::Hu),
        ("kan", ActionKind::Kan),
        ("pon", ActionKind::Pon),
        ("chii", ActionKind::Chii),
        ("flower", ActionKind::Flower),
        ("skip", ActionKind::Skip),
    ]
    .into_iter()
    .collect()
});

/// Looks up a transport-level event name.
#[inline]
#[must_use]
pub fn event_kind(wire: &str) -> Option<EventKind> {
    WIRE_KINDS.get(wire).copied()
}

/// Looks up a transport-level action name.
#[inline]
#[must_use]
pub fn action_kind(wire: &str) -> Option<ActionKind> {
    WIRE_ACTIONS.get(wire).copied()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(event_kind(kind.wire_name()), Some(kind));
        }
        assert_eq!(event_kind("riichi"), None);
        assert_eq!(action_kind("pon"), Some(ActionKind::Pon));
        assert_eq!(action_kind("ron"), None);
    }

    #[test]
    fn successor_chain() {
        for kind in EventKind::ALL {
            match kind.successor() {
                Successor::Terminal => assert_eq!(kind, EventKind::Win),
                Successor::Expect(next) => assert_ne!(next, EventKind::Win),
            }
        }
        for kong in [
            EventKind::ExposedKong,
            EventKind::AddedKong,
            EventKind::ConcealedKong,
        ] {
            assert_eq!(kong.successor(), Successor::Expect(EventKind::RobbingKong));
        }
        assert_eq!(
            EventKind::RobbingKong.successor(),
            Successor::Expect(EventKind::SelfDraw),
        );
        assert_eq!(
            EventKind::Discard.successor(),
            Successor::Expect(EventKind::SelfDraw),
        );
    }

    #[test]
    fn deal_reaches_play() {
        let mut kind = EventKind::Deal;
        let mut steps = 0;
        while kind != EventKind::Discard {
            let Successor::Expect(next) = kind.successor() else {
                panic!("deal chain ended at {kind}");
            };
            kind = next;
            steps += 1;
        }
        assert_eq!(steps, 3);
    }
}
