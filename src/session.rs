//! Session lifecycle
//!
//! A session wraps one [`World`] and gates it through
//! `NotStarted -> Active -> Ended -> Active -> ...`. The first input both
//! starts play and flaps; an input after the run ended throws the world
//! away and starts a fresh one the same way.
//!
//! Sessions never own the high-score record. Every transition that needs
//! host state (time, ids, high scores) takes the [`HostContext`] explicitly.

use std::collections::VecDeque;

use alloy_primitives::B256;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::highscores::HighScoreEntry;
use crate::host::HostContext;
use crate::mint::MintRequest;
use crate::scoring::{LIVE_TIERS, Tier, is_mint_eligible};
use crate::sim::{GapSource, Obstacle, SeededGaps, StepReport, World, impulse, step};
use crate::tuning::Tuning;

/// Opaque 32-byte run identifier
///
/// The first 8 bytes are the start time (ms, big-endian), the rest random.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub B256);

impl SessionId {
    pub fn generate(started_at_ms: u64, rng: &mut impl Rng) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&started_at_ms.to_be_bytes());
        rng.fill(&mut bytes[8..]);
        Self(B256::from(bytes))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == B256::ZERO
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Waiting for the first input
    NotStarted,
    /// Stepping every tick
    Active,
    /// Run over, world frozen until the next input
    Ended,
}

/// Discrete input from the input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Click / tap / space
    Activate,
}

/// A run that just ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinishedSession {
    pub id: SessionId,
    pub score: u32,
    pub duration_secs: u64,
    pub action_count: u32,
    /// Score beat the host's previous best
    pub new_high_score: bool,
    /// Hand-off for the minting collaborator, present only when eligible
    pub mint: Option<MintRequest>,
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Not active; nothing stepped
    Idle,
    /// Stepped and still running
    Running(StepReport),
    /// This step ended the run
    Ended(FinishedSession),
}

/// Immutable per-tick view for the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub body_y: f32,
    pub body_vy: f32,
    pub obstacles: Vec<Obstacle>,
    pub score: u32,
    pub phase: SessionPhase,
    pub high_score: u32,
    /// Live feedback tier for the current score
    pub tier: Tier,
}

/// One restartable play session
#[derive(Debug, Clone)]
pub struct Session<G: GapSource = SeededGaps> {
    tuning: Tuning,
    world: World,
    phase: SessionPhase,
    gaps: G,
    action_count: u32,
    id: Option<SessionId>,
    started_at_ms: Option<u64>,
    /// Inputs waiting for the next tick boundary
    pending: VecDeque<InputEvent>,
}

impl<G: GapSource> Session<G> {
    pub fn new(tuning: Tuning, gaps: G) -> Self {
        debug_assert!(tuning.validate().is_ok(), "invalid tuning: {:?}", tuning.validate());
        Self {
            world: World::new(&tuning),
            tuning,
            phase: SessionPhase::NotStarted,
            gaps,
            action_count: 0,
            id: None,
            started_at_ms: None,
            pending: VecDeque::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn score(&self) -> u32 {
        self.world.score
    }

    /// Impulses issued this run (the starting impulse included)
    pub fn action_count(&self) -> u32 {
        self.action_count
    }

    /// Identifier assigned when the current run started
    pub fn id(&self) -> Option<SessionId> {
        self.id
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    /// Number of inputs waiting for the next tick
    pub fn pending_inputs(&self) -> usize {
        self.pending.len()
    }

    /// Queue an input; it is applied at the start of the next tick
    pub fn queue_input(&mut self, event: InputEvent) {
        self.pending.push_back(event);
    }

    /// Drop queued inputs without applying them
    pub fn clear_inputs(&mut self) {
        self.pending.clear();
    }

    /// Apply one input right now
    pub fn handle_input(&mut self, event: InputEvent, host: &mut HostContext) -> SessionPhase {
        match (event, self.phase) {
            (InputEvent::Activate, SessionPhase::NotStarted | SessionPhase::Ended) => {
                self.begin(host);
            }
            (InputEvent::Activate, SessionPhase::Active) => self.flap(),
        }
        self.phase
    }

    /// Apply queued inputs, then advance one step if active
    pub fn tick(&mut self, host: &mut HostContext) -> StepOutcome {
        while let Some(event) = self.pending.pop_front() {
            self.handle_input(event, host);
        }

        if self.phase != SessionPhase::Active {
            return StepOutcome::Idle;
        }

        let report = step(&mut self.world, &self.tuning, &mut self.gaps);
        if report.is_terminal() {
            log::debug!("Run ended by {:?} at step {}", report.hit, self.world.steps);
            StepOutcome::Ended(self.finish(host))
        } else {
            StepOutcome::Running(report)
        }
    }

    /// Current view for the rendering collaborator
    pub fn snapshot(&self, host: &HostContext) -> Snapshot {
        Snapshot {
            body_y: self.world.body.y,
            body_vy: self.world.body.vy,
            obstacles: self.world.obstacles.clone(),
            score: self.world.score,
            phase: self.phase,
            high_score: host.high_score(),
            tier: LIVE_TIERS.tier_of(self.world.score),
        }
    }

    /// Fresh world, new identity, starting impulse
    fn begin(&mut self, host: &mut HostContext) {
        let now = host.now_ms();
        let id = host.next_session_id(now);

        self.world = World::new(&self.tuning);
        self.action_count = 0;
        self.id = Some(id);
        self.started_at_ms = Some(now);
        self.phase = SessionPhase::Active;
        self.flap();

        log::info!("Session {} started", id);
    }

    fn flap(&mut self) {
        impulse(&mut self.world.body, &self.tuning);
        self.action_count += 1;
    }

    /// Freeze the run and settle the high score, exactly once per run
    fn finish(&mut self, host: &mut HostContext) -> FinishedSession {
        self.phase = SessionPhase::Ended;

        let now = host.now_ms();
        let started = self.started_at_ms.unwrap_or(now);
        let duration_secs = now.saturating_sub(started) / 1000;
        let id = self.id.unwrap_or(SessionId(B256::ZERO));
        let score = self.world.score;

        let new_high_score = host.high_scores.is_new_best(score);
        host.high_scores.add_score(HighScoreEntry {
            score,
            duration_secs,
            actions: self.action_count,
            timestamp_ms: now,
        });

        let mint = (new_high_score && is_mint_eligible(score, host.eligibility_threshold)).then(|| MintRequest {
            session_id: id,
            score,
            duration_secs,
            action_count: self.action_count,
        });

        if new_high_score {
            log::info!("New high score {} (session {})", score, id);
        }
        log::info!(
            "Session {} ended: score {}, {}s, {} actions, mint {}",
            id,
            score,
            duration_secs,
            self.action_count,
            if mint.is_some() { "offered" } else { "not offered" }
        );

        FinishedSession {
            id,
            score,
            duration_secs,
            action_count: self.action_count,
            new_high_score,
            mint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ManualTime;
    use crate::sim::{Body, ScriptedGaps};

    fn context() -> (HostContext, ManualTime) {
        let time = ManualTime::new(1_700_000_000_000);
        (HostContext::new(Box::new(time.clone()), 7), time)
    }

    fn session() -> Session {
        Session::new(Tuning::default(), SeededGaps::new(42))
    }

    /// Push the body below the ground so the next step ends the run
    fn crash<G: GapSource>(session: &mut Session<G>) {
        session.world.body = Body { y: 590.0, vy: 0.0 };
    }

    fn run_to_end<G: GapSource>(session: &mut Session<G>, host: &mut HostContext) -> FinishedSession {
        for _ in 0..10_000 {
            if let StepOutcome::Ended(finished) = session.tick(host) {
                return finished;
            }
        }
        panic!("session never ended");
    }

    #[test]
    fn test_idle_until_first_input() {
        let (mut host, _) = context();
        let mut s = session();
        assert_eq!(s.tick(&mut host), StepOutcome::Idle);
        assert_eq!(s.world().steps, 0);
        assert_eq!(s.phase(), SessionPhase::NotStarted);
        assert!(s.id().is_none());
    }

    #[test]
    fn test_first_input_starts_and_flaps() {
        let (mut host, _) = context();
        let mut s = session();
        assert_eq!(s.handle_input(InputEvent::Activate, &mut host), SessionPhase::Active);
        assert_eq!(s.world().body.vy, -8.0);
        assert_eq!(s.world().body.y, 250.0);
        assert_eq!(s.action_count(), 1);
        assert_eq!(s.started_at_ms(), Some(1_700_000_000_000));
        let id = s.id().unwrap();
        assert!(!id.is_zero());
        assert_eq!(&id.0[..8], &1_700_000_000_000u64.to_be_bytes());
    }

    #[test]
    fn test_active_input_flaps() {
        let (mut host, _) = context();
        let mut s = session();
        s.handle_input(InputEvent::Activate, &mut host);
        for _ in 0..5 {
            s.tick(&mut host);
        }
        assert!(s.world().body.vy > -8.0);
        s.handle_input(InputEvent::Activate, &mut host);
        assert_eq!(s.world().body.vy, -8.0);
        assert_eq!(s.action_count(), 2);
    }

    #[test]
    fn test_queued_input_waits_for_tick_boundary() {
        let (mut host, _) = context();
        let mut s = session();
        s.queue_input(InputEvent::Activate);
        assert_eq!(s.phase(), SessionPhase::NotStarted);
        assert_eq!(s.pending_inputs(), 1);

        // Applied before the step, so this tick already integrates the impulse
        assert!(matches!(s.tick(&mut host), StepOutcome::Running(_)));
        assert_eq!(s.pending_inputs(), 0);
        assert_eq!(s.phase(), SessionPhase::Active);
        assert!((s.world().body.vy - (-8.0 + 0.4)).abs() < 1e-6);
        assert!((s.world().body.y - (250.0 - 7.6)).abs() < 1e-4);
    }

    #[test]
    fn test_collision_ends_and_freezes() {
        let (mut host, time) = context();
        let mut s = session();
        s.handle_input(InputEvent::Activate, &mut host);
        time.advance(4_500);
        let finished = run_to_end(&mut s, &mut host);

        assert_eq!(s.phase(), SessionPhase::Ended);
        assert_eq!(finished.duration_secs, 4);
        assert_eq!(finished.action_count, 1);

        let frozen = s.world().clone();
        for _ in 0..10 {
            assert_eq!(s.tick(&mut host), StepOutcome::Idle);
        }
        assert_eq!(s.world(), &frozen);
    }

    #[test]
    fn test_score_three_offers_mint() {
        let (mut host, _) = context();
        let mut s = session();
        s.handle_input(InputEvent::Activate, &mut host);
        s.world.score = 3;
        crash(&mut s);

        let StepOutcome::Ended(finished) = s.tick(&mut host) else {
            panic!("expected the run to end");
        };
        assert!(finished.new_high_score);
        let mint = finished.mint.expect("score 3 is eligible");
        assert_eq!(mint.score, 3);
        assert_eq!(mint.session_id, s.id().unwrap());
        assert_eq!(mint.action_count, 1);
        assert_eq!(host.high_score(), 3);
    }

    #[test]
    fn test_score_two_offers_nothing() {
        let (mut host, _) = context();
        let mut s = session();
        s.handle_input(InputEvent::Activate, &mut host);
        s.world.score = 2;
        crash(&mut s);

        let StepOutcome::Ended(finished) = s.tick(&mut host) else {
            panic!("expected the run to end");
        };
        assert!(finished.new_high_score);
        assert!(finished.mint.is_none());
        assert_eq!(host.high_score(), 2);
    }

    #[test]
    fn test_no_mint_without_new_high_score() {
        let (mut host, _) = context();
        let mut s = session();
        for score in [8, 5] {
            s.handle_input(InputEvent::Activate, &mut host);
            s.world.score = score;
            crash(&mut s);
            let StepOutcome::Ended(finished) = s.tick(&mut host) else {
                panic!("expected the run to end");
            };
            assert_eq!(finished.mint.is_some(), score == 8);
        }
        assert_eq!(host.high_score(), 8);
        assert_eq!(host.high_scores.entries.len(), 2);
    }

    #[test]
    fn test_restart_is_canonical() {
        let (mut host, _) = context();
        let mut s = Session::new(Tuning::default(), ScriptedGaps::new([160.0]));
        s.handle_input(InputEvent::Activate, &mut host);
        for _ in 0..30 {
            s.tick(&mut host);
        }
        s.world.score = 17;
        crash(&mut s);
        assert!(matches!(s.tick(&mut host), StepOutcome::Ended(_)));
        let first_id = s.id();

        s.handle_input(InputEvent::Activate, &mut host);
        assert_eq!(s.phase(), SessionPhase::Active);
        assert_eq!(s.world().score, 0);
        assert!(s.world().obstacles.is_empty());
        assert!(!s.world().terminal);
        assert_eq!(s.world().steps, 0);
        assert_eq!(s.world().body, Body { y: 250.0, vy: -8.0 });
        assert_eq!(s.action_count(), 1);
        assert_ne!(s.id(), first_id);
        // High score survives the restart
        assert_eq!(host.high_score(), 17);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let (mut host, _) = context();
        let mut s = session();
        let snap = s.snapshot(&host);
        assert_eq!(snap.phase, SessionPhase::NotStarted);
        assert_eq!(snap.tier, Tier::None);

        s.handle_input(InputEvent::Activate, &mut host);
        s.tick(&mut host);
        s.world.score = 10;
        let snap = s.snapshot(&host);
        assert_eq!(snap.phase, SessionPhase::Active);
        assert_eq!(snap.obstacles.len(), 1);
        assert_eq!(snap.tier, Tier::Silver);
        assert!(serde_json::to_string(&snap).is_ok());
    }
}
