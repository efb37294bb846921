//! The client loop for one local seat.
//!
//! Every inbound event goes through the same path: translate it, apply it
//! and present it as one exclusive sequence, wait for that sequence, then
//! move the turn and compute what we may answer.

use crate::action::{ActionKind, ActionSubmission, GameAction};
use crate::config::ClientConfig;
use crate::event::{EventKind, GameEvent, InboundEvent, Successor, Translated, translate};
use crate::hand::Hand;
use crate::present::{Effect, Presenter};
use crate::queue::{ExclusiveQueue, Sequence, Step};
use crate::score::Scorer;
use crate::seat::{AbsoluteSeat, Round};
use crate::state::{Legal, TableState};
use crate::tile::Tile;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Result, bail, ensure};
use serde::Serialize;

/// Advisory countdown for the current response window. The server is the
/// timing authority; this only decides when to send the default answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseTimer {
    started: Instant,
    budget: Duration,
}

impl ResponseTimer {
    #[must_use]
    pub fn start(budget: Duration) -> Self {
        Self::started_at(Instant::now(), budget)
    }

    #[inline]
    #[must_use]
    pub const fn started_at(started: Instant, budget: Duration) -> Self {
        Self { started, budget }
    }

    #[inline]
    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.budget
            .saturating_sub(now.saturating_duration_since(self.started))
    }

    #[must_use]
    pub fn expired(&self, now: Instant) -> bool {
        self.remaining(now).is_zero()
    }
}

/// What the client sends back to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    Action(ActionSubmission),
    Discard { tile: Tile },
}

/// Outcome of one handled event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handled {
    pub kind: EventKind,
    pub at_turn: AbsoluteSeat,
    pub can_interact: bool,
    /// The kind the successor table expects next, `None` after a win.
    pub expect: Option<EventKind>,
    pub legal: Option<Legal>,
    /// Set when the server opened a response window.
    pub action_id: Option<u32>,
}

struct PendingPrompt {
    action_id: u32,
    legal: Legal,
}

pub struct ClientSession {
    config: ClientConfig,
    queue: ExclusiveQueue<TableState>,
    presenter: Arc<dyn Presenter>,
    scorer: Arc<dyn Scorer>,

    pending: Option<PendingPrompt>,
    timer: Option<ResponseTimer>,
    expect: Option<EventKind>,
}

fn show(presenter: &dyn Presenter, effect: &Effect) {
    if let Err(err) = presenter.present(effect) {
        log::warn!("presenter failed on {effect:?}: {err:#}");
    }
}

fn present_step<F>(presenter: &Arc<dyn Presenter>, delay: Duration, effect: F) -> Step<TableState>
where
    F: FnOnce(&TableState) -> Effect + Send + 'static,
{
    let presenter = Arc::clone(presenter);
    Step::delayed(delay, move |state: &mut TableState| {
        show(presenter.as_ref(), &effect(state));
        Ok(())
    })
}

impl ClientSession {
    pub fn new(
        player_id: u8,
        config: ClientConfig,
        presenter: Arc<dyn Presenter>,
        scorer: Arc<dyn Scorer>,
    ) -> Result<Self> {
        let state = TableState::new(player_id)?;
        Ok(Self {
            config,
            queue: ExclusiveQueue::new(state)?,
            presenter,
            scorer,
            pending: None,
            timer: None,
            expect: Some(EventKind::Deal),
        })
    }

    /// Parses one JSON line and handles it. A line that does not decode is
    /// logged and dropped.
    pub fn handle_json(&mut self, line: &str) -> Result<Option<Handled>> {
        match serde_json::from_str::<InboundEvent>(line) {
            Ok(ev) => self.handle(&ev),
            Err(err) => {
                log::warn!("dropping undecodable event {line:?}: {err}");
                Ok(None)
            }
        }
    }

    /// Handles one server notification.
    ///
    /// Unknown kinds and malformed payloads are logged and dropped with
    /// `Ok(None)`. A desync is returned as an error and leaves the table
    /// state as it was before the event.
    pub fn handle(&mut self, ev: &InboundEvent) -> Result<Option<Handled>> {
        let translated = match translate(ev) {
            Ok(t) => t,
            Err(err) => {
                log::warn!("dropping event from {}: {err}", ev.seat);
                return Ok(None);
            }
        };
        let kind = translated.event.kind();
        if let Some(expected) = self.expect
            && expected != kind
        {
            log::debug!("expected {expected}, got {kind}");
        }

        // A new event closes whatever window was open.
        self.pending = None;
        self.timer = None;

        let seq = self.sequence(&translated);
        self.queue.run_exclusive(seq)?.wait()?;

        let expect = match kind.successor() {
            Successor::Expect(next) => Some(next),
            Successor::Terminal => None,
        };
        let remaining_ms = translated
            .prompt
            .as_ref()
            .and_then(|p| p.remaining_ms)
            .unwrap_or(self.config.default_response_ms);
        let scorer = Arc::clone(&self.scorer);
        let presenter = Arc::clone(&self.presenter);
        let Translated { event, prompt, .. } = translated;
        let action_id = prompt.as_ref().map(|p| p.action_id);

        let handled = self.queue.run_then(
            Sequence::new(format!("{kind} turn")),
            move |state: &mut TableState| {
                let delta = state.turn_delta(&event);
                let at_turn = state.move_turn(delta);

                let allowed = prompt.as_ref().and_then(|p| p.allowed.as_deref());
                let mut legal = state.legal_actions(&event, allowed, scorer.as_ref());
                if prompt.is_some() && legal.is_none() {
                    legal = Some(Legal::skip_only());
                }
                let can_interact = state.refresh_interaction(prompt.is_some());

                show(presenter.as_ref(), &Effect::TurnMoved { seat: at_turn });
                if let Some(next) = expect {
                    show(presenter.as_ref(), &Effect::Expect(next));
                }
                if prompt.is_some()
                    && let Some(legal) = &legal
                {
                    show(
                        presenter.as_ref(),
                        &Effect::Prompt {
                            actions: legal.actions.clone(),
                            remaining_ms,
                        },
                    );
                }

                Ok(Handled {
                    kind,
                    at_turn,
                    can_interact,
                    expect,
                    legal,
                    action_id,
                })
            },
        )?;

        self.expect = expect;
        if let Some(action_id) = action_id {
            let legal = handled.legal.clone().unwrap_or_else(Legal::skip_only);
            self.pending = Some(PendingPrompt { action_id, legal });
            self.timer = Some(ResponseTimer::start(Duration::from_millis(remaining_ms)));
        } else if handled.can_interact {
            self.timer = Some(ResponseTimer::start(self.config.default_response()));
        }
        Ok(Some(handled))
    }

    /// The update step followed by the presentation steps of `translated`.
    fn sequence(&self, translated: &Translated) -> Sequence<TableState> {
        let kind = translated.event.kind();
        let mut seq = Sequence::with_capacity(kind.wire_name(), self.config.queue_capacity_hint);

        let event = translated.event.clone();
        let tiles_left = translated.tiles_left;
        let scorer = Arc::clone(&self.scorer);
        seq.push(Step::new(move |state: &mut TableState| {
            state.update(&event)?;
            state.observe_wall(kind, tiles_left);
            if kind == EventKind::Win {
                state.score_own_win(scorer.as_ref());
            }
            Ok(())
        }));

        let p = &self.presenter;
        let delay = self.config.step_delay();
        match &translated.event {
            GameEvent::Deal { .. } => {
                seq.push(present_step(p, delay, |s| Effect::Dealt {
                    round: s.round(),
                    seat: s.my_seat(),
                    tiles: s.hand().tiles(),
                }));
            }
            GameEvent::InitialFlowerExchange {
                seat,
                flowers,
                replacements,
            } => {
                let seat = *seat;
                let flower_delay = self.config.flower_step_delay();
                for &flower in flowers {
                    seq.push(present_step(p, flower_delay, move |_| {
                        Effect::FlowerRevealed { seat, flower }
                    }));
                }
                for &tile in replacements {
                    seq.push(present_step(p, delay, move |_| Effect::Drew {
                        seat,
                        tile,
                        replacement: true,
                    }));
                }
            }
            GameEvent::InitialFlowerExchangeAck { .. } | GameEvent::RobbingKong { .. } => {}
            &GameEvent::SelfDraw { seat, tile } => {
                seq.push(present_step(p, delay, move |s| Effect::Drew {
                    seat,
                    tile,
                    replacement: s.is_me(seat) && s.is_replacement(),
                }));
            }
            &GameEvent::Discard { seat, tile } => {
                seq.push(present_step(p, delay, move |_| Effect::Discarded {
                    seat,
                    tile,
                }));
            }
            &GameEvent::Chii { seat, block }
            | &GameEvent::Pon { seat, block }
            | &GameEvent::ExposedKong { seat, block }
            | &GameEvent::AddedKong { seat, block }
            | &GameEvent::ConcealedKong { seat, block } => {
                seq.push(present_step(p, delay, move |_| Effect::Called {
                    seat,
                    block,
                }));
            }
            &GameEvent::Flower { seat, flower } => {
                seq.push(present_step(p, delay, move |_| {
                    Effect::FlowerRevealed { seat, flower }
                }));
            }
            &GameEvent::Win { seat, .. } => {
                seq.push(present_step(p, delay, move |s| Effect::Won {
                    seat,
                    score: s.last_score().cloned(),
                }));
            }
        }
        seq
    }

    /// Answers the open prompt with `action`.
    ///
    /// Only actions in the current legal list are accepted, except skip,
    /// which is always accepted while a prompt is open. Skipping a prompt
    /// on our own turn leaves us to discard.
    pub fn submit(&mut self, action: GameAction) -> Result<ActionSubmission> {
        let Some(pending) = &self.pending else {
            bail!("no prompt is open, cannot submit {action}");
        };
        let skipped = action.kind == ActionKind::Skip;
        let submission = if skipped {
            GameAction::skip().submission(pending.action_id)
        } else {
            ensure!(
                pending.legal.contains(&action),
                "{action} is not a legal response to prompt {}",
                pending.action_id,
            );
            action.submission(pending.action_id)
        };
        self.pending = None;
        self.timer = None;
        if skipped {
            self.resume_turn()?;
        }
        Ok(submission)
    }

    /// Re-grants interaction once no prompt is open, and starts the
    /// discard countdown if it is our turn.
    fn resume_turn(&mut self) -> Result<()> {
        let can_interact = self.queue.run_then(
            Sequence::new("prompt closed"),
            |state: &mut TableState| Ok(state.refresh_interaction(false)),
        )?;
        if can_interact {
            self.timer = Some(ResponseTimer::start(self.config.default_response()));
        }
        Ok(())
    }

    /// Asks to discard `tile`. The hand itself changes only once the server
    /// echoes the discard back.
    pub fn discard(&mut self, tile: Tile) -> Result<Outbound> {
        ensure!(
            !tile.is_flower() && !tile.is_unknown(),
            "{tile} cannot be discarded",
        );
        let (can_interact, held) = self
            .queue
            .snapshot(move |s: &TableState| (s.can_interact(), s.hand().count(tile)))?;
        ensure!(can_interact, "not our turn to discard {tile}");
        ensure!(held > 0, "attempt to discard {tile} which is not held");
        self.pending = None;
        self.timer = None;
        Ok(Outbound::Discard { tile })
    }

    /// Produces the default answer once the countdown has run out: skip
    /// while any prompt is open, otherwise a discard of the rightmost tile
    /// that is not a flower.
    pub fn poll_timeout(&mut self, now: Instant) -> Result<Option<Outbound>> {
        if !self.config.auto_skip_on_timeout {
            return Ok(None);
        }
        let Some(timer) = self.timer else {
            return Ok(None);
        };
        if !timer.expired(now) {
            return Ok(None);
        }
        self.timer = None;

        if let Some(p) = self.pending.take() {
            log::info!("prompt {} timed out, skipping", p.action_id);
            self.resume_turn()?;
            return Ok(Some(Outbound::Action(
                GameAction::skip().submission(p.action_id),
            )));
        }

        let (can_interact, tile) = self
            .queue
            .snapshot(|s: &TableState| (s.can_interact(), s.hand().auto_discard_tile()))?;
        if can_interact && let Some(tile) = tile {
            log::info!("turn timed out, discarding {tile}");
            return Ok(Some(Outbound::Discard { tile }));
        }
        Ok(None)
    }

    /// Advances to the next round and clears the deal.
    ///
    /// Returns an error on END.
    pub fn round_end(&mut self) -> Result<Round> {
        self.pending = None;
        self.timer = None;
        let presenter = Arc::clone(&self.presenter);
        let next = self.queue.run_then(
            Sequence::new("round end"),
            move |state: &mut TableState| {
                let next = state.next_round()?;
                show(presenter.as_ref(), &Effect::RoundEnded { next });
                Ok(next)
            },
        )?;
        self.expect = (!next.is_end()).then_some(EventKind::Deal);
        Ok(next)
    }

    /// A copy of the table state once every queued sequence has run.
    pub fn state(&self) -> Result<TableState> {
        self.queue.snapshot(TableState::clone)
    }

    pub fn hand(&self) -> Result<Hand> {
        self.queue.snapshot(|s: &TableState| s.hand().clone())
    }

    /// Legal list of the open prompt.
    #[must_use]
    pub fn legal_actions(&self) -> Option<&Legal> {
        self.pending.as_ref().map(|p| &p.legal)
    }

    #[must_use]
    pub fn pending_action_id(&self) -> Option<u32> {
        self.pending.as_ref().map(|p| p.action_id)
    }

    #[inline]
    #[must_use]
    pub const fn expected_next(&self) -> Option<EventKind> {
        self.expect
    }

    #[inline]
    #[must_use]
    pub const fn timer(&self) -> Option<ResponseTimer> {
        self.timer
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::action::WinningCondition;
    use crate::call::CallBlock;
    use crate::present::{NullPresenter, RecordingPresenter};
    use crate::score::{ScoreResult, ServerScorer};
    use crate::seat::RelativeSeat;
    use crate::t;

    const SOUTH_DEAL: [&str; 3] = [
        r#"{"kind":"deal","seat":"E","payload":{"round":"E1","tiles":["1p","2p","4p","5p","6p","7s","7s","9s","E","E","N","C","9m"]}}"#,
        r#"{"kind":"deal_flower","seat":"E","payload":{"flowers":["1f"]}}"#,
        r#"{"kind":"deal_flower_ack","seat":"E"}"#,
    ];

    const EAST_DEAL: &str = r#"{"kind":"deal","seat":"E","payload":{"tiles":["1m","2m","3m","4p","5p","6p","7s","8s","9s","E","E","S","W","N"]}}"#;

    fn session(player_id: u8) -> ClientSession {
        ClientSession::new(
            player_id,
            ClientConfig::default(),
            Arc::new(NullPresenter),
            Arc::new(ServerScorer),
        )
        .unwrap()
    }

    fn feed(s: &mut ClientSession, lines: &[&str]) -> Option<Handled> {
        let mut last = None;
        for line in lines {
            last = s.handle_json(line).unwrap();
        }
        last
    }

    #[test]
    fn timer() {
        let t0 = Instant::now();
        let timer = ResponseTimer::started_at(t0, Duration::from_millis(100));
        assert_eq!(timer.remaining(t0), Duration::from_millis(100));
        assert_eq!(
            timer.remaining(t0 + Duration::from_millis(40)),
            Duration::from_millis(60),
        );
        assert!(!timer.expired(t0 + Duration::from_millis(99)));
        assert!(timer.expired(t0 + Duration::from_millis(100)));
        assert_eq!(timer.remaining(t0 + Duration::from_secs(5)), Duration::ZERO);
    }

    #[test]
    fn claim_window_and_submission() {
        let mut s = session(1);
        feed(&mut s, &SOUTH_DEAL);
        assert_eq!(s.expected_next(), Some(EventKind::Discard));

        let handled = s
            .handle_json(
                r#"{"kind":"discard","seat":"E","tile":"3p","payload":{"action_id":9,"actions":["chii","skip"],"remaining_ms":5000}}"#,
            )
            .unwrap()
            .unwrap();
        assert_eq!(handled.action_id, Some(9));
        assert!(!handled.can_interact);
        assert_eq!(handled.expect, Some(EventKind::SelfDraw));
        assert_eq!(s.pending_action_id(), Some(9));
        assert_eq!(s.timer().unwrap().budget(), Duration::from_millis(5000));
        let legal = s.legal_actions().unwrap();
        assert!(legal.claim_window);
        assert_eq!(legal.actions.len(), 4);
        let chii = legal.actions[1];

        let pon = GameAction::new(ActionKind::Pon, RelativeSeat::Shimocha, t!(3p));
        assert!(s.submit(pon).is_err());
        assert!(s.discard(t!(9m)).is_err());

        let sub = s.submit(chii).unwrap();
        assert_eq!(sub.action_id, 9);
        assert_eq!(sub.kind, ActionKind::Chii);
        assert_eq!(sub.tile, t!(2p));
        assert!(s.submit(GameAction::skip()).is_err());

        let handled = s
            .handle_json(
                r#"{"kind":"chii","seat":"S","payload":{"call":{"shape":"chii","anchor":"2p","source":"kamicha","source_index":1}}}"#,
            )
            .unwrap()
            .unwrap();
        assert_eq!(handled.at_turn, AbsoluteSeat::South);
        assert!(handled.can_interact);
        assert_eq!(s.expected_next(), Some(EventKind::Discard));

        let out = s.discard(t!(C)).unwrap();
        assert_eq!(out, Outbound::Discard { tile: t!(C) });
        assert_eq!(
            serde_json::to_string(&out).unwrap(),
            r#"{"type":"discard","tile":"C"}"#,
        );
        assert!(s.discard(t!(3s)).is_err());
        assert_eq!(s.hand().unwrap().size(), 14);
    }

    #[test]
    fn bad_events_are_dropped() {
        let mut s = session(1);
        feed(&mut s, &SOUTH_DEAL);
        let before = s.state().unwrap().brief_info();

        assert!(s.handle_json(r#"{"kind":"teleport","seat":"E"}"#).unwrap().is_none());
        assert!(s.handle_json(r#"{"kind":"discard","seat":"E"}"#).unwrap().is_none());
        assert!(s.handle_json(r#"{"kind":"discard","seat":"X","tile":"1m"}"#).unwrap().is_none());
        assert!(s.handle_json("not json").unwrap().is_none());
        assert_eq!(s.state().unwrap().brief_info(), before);
    }

    #[test]
    fn desync_is_reported_and_the_session_continues() {
        let mut s = session(1);
        feed(&mut s, &SOUTH_DEAL);
        let err = s
            .handle_json(r#"{"kind":"discard","seat":"S","tile":"1m"}"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("desync"));
        assert_eq!(s.hand().unwrap().size(), 13);

        let handled = feed(&mut s, &[r#"{"kind":"discard","seat":"E","tile":"1m"}"#]).unwrap();
        assert_eq!(handled.kind, EventKind::Discard);
        assert_eq!(s.state().unwrap().discards(AbsoluteSeat::East), [t!(1m)]);
    }

    #[test]
    fn timeout_defaults() {
        let later = Instant::now() + Duration::from_secs(3600);

        let mut s = session(1);
        feed(&mut s, &SOUTH_DEAL);
        s.handle_json(r#"{"kind":"discard","seat":"E","tile":"E","payload":{"action_id":4}}"#)
            .unwrap();
        assert_eq!(s.poll_timeout(Instant::now()).unwrap(), None);
        let out = s.poll_timeout(later).unwrap();
        assert_eq!(
            out,
            Some(Outbound::Action(GameAction::skip().submission(4))),
        );
        assert_eq!(s.poll_timeout(later).unwrap(), None);
        assert_eq!(s.pending_action_id(), None);

        let mut s = session(0);
        let handled = feed(&mut s, &[EAST_DEAL]).unwrap();
        assert!(handled.can_interact);
        assert_eq!(s.hand().unwrap().drawn(), Some(t!(N)));
        assert_eq!(
            s.poll_timeout(later).unwrap(),
            Some(Outbound::Discard { tile: t!(N) }),
        );

        let mut quiet = ClientSession::new(
            0,
            ClientConfig {
                auto_skip_on_timeout: false,
                ..Default::default()
            },
            Arc::new(NullPresenter),
            Arc::new(ServerScorer),
        )
        .unwrap();
        feed(&mut quiet, &[EAST_DEAL]);
        assert_eq!(quiet.poll_timeout(later).unwrap(), None);
    }

    #[test]
    fn own_turn_prompt_holds_the_discard() {
        let later = Instant::now() + Duration::from_secs(3600);
        let mut s = session(1);
        feed(&mut s, &SOUTH_DEAL);
        feed(&mut s, &[r#"{"kind":"discard","seat":"E","tile":"3s"}"#]);

        let handled = s
            .handle_json(
                r#"{"kind":"draw","seat":"S","tile":"3f","payload":{"action_id":5,"actions":["flower","skip"]}}"#,
            )
            .unwrap()
            .unwrap();
        assert_eq!(handled.at_turn, AbsoluteSeat::South);
        assert!(!handled.can_interact);
        let legal = s.legal_actions().unwrap();
        assert!(!legal.claim_window);
        assert_eq!(
            legal.actions,
            [
                GameAction::new(ActionKind::Flower, RelativeSeat::Jicha, t!(3f)),
                GameAction::skip(),
            ],
        );
        assert!(s.discard(t!(9m)).is_err());

        assert_eq!(
            s.poll_timeout(later).unwrap(),
            Some(Outbound::Action(GameAction::skip().submission(5))),
        );
        assert!(s.state().unwrap().can_interact());
        let out = s.poll_timeout(later).unwrap();
        assert_eq!(out, Some(Outbound::Discard { tile: t!(C) }));
        assert_eq!(s.discard(t!(C)).unwrap(), Outbound::Discard { tile: t!(C) });
    }

    #[test]
    fn skipping_own_turn_prompt_allows_discard() {
        let mut s = session(0);
        let handled = s
            .handle_json(
                r#"{"kind":"deal","seat":"E","payload":{"tiles":["1m","2m","3m","4p","5p","6p","7s","8s","9s","E","E","S","W","N"],"action_id":2,"actions":["hu","skip"]}}"#,
            )
            .unwrap()
            .unwrap();
        assert!(!handled.can_interact);
        assert!(s.discard(t!(N)).is_err());
        assert_eq!(s.submit(GameAction::skip()).unwrap().action_id, 2);
        assert!(s.timer().is_some());
        assert!(s.discard(t!(N)).is_ok());
    }

    struct CountingScorer;

    impl Scorer for CountingScorer {
        fn can_win(&self, _: &[Tile], _: &[CallBlock], _: &WinningCondition) -> bool {
            true
        }

        fn score(
            &self,
            tiles: &[Tile],
            _: &[CallBlock],
            cond: &WinningCondition,
        ) -> Option<ScoreResult> {
            Some(ScoreResult {
                total: tiles.len() as i32,
                bonuses: vec![(format!("on {}", cond.tile), i32::from(cond.discarded))],
            })
        }
    }

    #[test]
    fn missing_score_of_own_win_is_computed() {
        let recorder = RecordingPresenter::new();
        let mut s = ClientSession::new(
            1,
            ClientConfig::default(),
            Arc::new(recorder.clone()),
            Arc::new(CountingScorer),
        )
        .unwrap();
        feed(&mut s, &SOUTH_DEAL);
        feed(&mut s, &[
            r#"{"kind":"discard","seat":"E","tile":"3p","payload":{"action_id":3,"actions":["hu","skip"]}}"#,
        ]);
        assert_eq!(s.legal_actions().unwrap().actions[0].kind, ActionKind::Hu);
        feed(&mut s, &[r#"{"kind":"hu","seat":"S","tile":"3p"}"#]);

        let expected = ScoreResult {
            total: 14,
            bonuses: vec![("on 3p".to_owned(), 1)],
        };
        assert_eq!(s.state().unwrap().last_score(), Some(&expected));
        assert_eq!(
            recorder.effects().iter().rev().find(|e| matches!(e, Effect::Won { .. })),
            Some(&Effect::Won {
                seat: AbsoluteSeat::South,
                score: Some(expected),
            }),
        );

        let mut s = ClientSession::new(
            1,
            ClientConfig::default(),
            Arc::new(NullPresenter),
            Arc::new(CountingScorer),
        )
        .unwrap();
        feed(&mut s, &SOUTH_DEAL);
        feed(&mut s, &[
            r#"{"kind":"discard","seat":"E","tile":"3p"}"#,
            r#"{"kind":"hu","seat":"S","tile":"3p","payload":{"score":{"total":40}}}"#,
        ]);
        assert_eq!(s.state().unwrap().last_score().map(|r| r.total), Some(40));
    }

    #[test]
    fn effects_follow_event_order() {
        let recorder = RecordingPresenter::new();
        let mut s = ClientSession::new(
            1,
            ClientConfig::default(),
            Arc::new(recorder.clone()),
            Arc::new(ServerScorer),
        )
        .unwrap();
        feed(&mut s, &SOUTH_DEAL);
        feed(&mut s, &[r#"{"kind":"discard","seat":"E","tile":"3s"}"#]);

        let effects = recorder.effects();
        assert!(matches!(
            &effects[0],
            Effect::Dealt { round: Round::East1, seat: AbsoluteSeat::South, tiles } if tiles.len() == 13
        ));
        assert_eq!(effects[1], Effect::TurnMoved { seat: AbsoluteSeat::East });
        assert_eq!(effects[2], Effect::Expect(EventKind::InitialFlowerExchange));
        assert_eq!(
            effects[3],
            Effect::FlowerRevealed {
                seat: AbsoluteSeat::East,
                flower: t!(1f),
            },
        );
        let tail = &effects[effects.len() - 3..];
        assert_eq!(
            tail,
            [
                Effect::Discarded {
                    seat: AbsoluteSeat::East,
                    tile: t!(3s),
                },
                Effect::TurnMoved { seat: AbsoluteSeat::East },
                Effect::Expect(EventKind::SelfDraw),
            ],
        );
    }

    #[test]
    fn rounds_run_out() {
        let recorder = RecordingPresenter::new();
        let mut s = ClientSession::new(
            2,
            ClientConfig::default(),
            Arc::new(recorder.clone()),
            Arc::new(ServerScorer),
        )
        .unwrap();
        feed(&mut s, &SOUTH_DEAL);
        assert_eq!(s.round_end().unwrap(), Round::East2);
        assert_eq!(s.expected_next(), Some(EventKind::Deal));
        assert_eq!(s.hand().unwrap().size(), 0);
        assert_eq!(
            recorder.effects().last(),
            Some(&Effect::RoundEnded { next: Round::East2 }),
        );

        for _ in 0..15 {
            s.round_end().unwrap();
        }
        assert_eq!(s.state().unwrap().round(), Round::End);
        assert_eq!(s.expected_next(), None);
        let err = s.round_end().unwrap_err();
        assert!(format!("{err:#}").contains("desync"));
    }
}
