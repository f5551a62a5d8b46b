//! Host side of the game loop
//!
//! The host owns everything that outlives a single run: the high-score
//! record, the time source, the step clock and the mint outbox. The core
//! never schedules anything itself; the host calls [`GameHost::frame`] from
//! whatever loop it has and hands snapshots to its renderer.

use std::cell::Cell;
use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::MINT_ELIGIBILITY_THRESHOLD;
use crate::highscores::HighScores;
use crate::mint::{MintNotice, MintRequest, MintService};
use crate::session::{FinishedSession, InputEvent, Session, SessionId, Snapshot, StepOutcome};
use crate::sim::{GapSource, SeededGaps, StepClock};

/// Wall-clock source for session timestamps
pub trait TimeSource {
    /// Milliseconds since the Unix epoch
    fn now_ms(&mut self) -> u64;
}

/// System time
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl TimeSource for WallClock {
    fn now_ms(&mut self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Manually advanced time; clones share the same instant
#[derive(Debug, Clone, Default)]
pub struct ManualTime(Rc<Cell<u64>>);

impl ManualTime {
    pub fn new(start_ms: u64) -> Self {
        Self(Rc::new(Cell::new(start_ms)))
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.0.set(ms);
    }
}

impl TimeSource for ManualTime {
    fn now_ms(&mut self) -> u64 {
        self.0.get()
    }
}

/// Host-owned state shared by every session the host runs
pub struct HostContext {
    pub high_scores: HighScores,
    /// Client-side score needed to hand a run to the minting collaborator
    pub eligibility_threshold: u32,
    time: Box<dyn TimeSource>,
    ids: Pcg32,
}

impl HostContext {
    pub fn new(time: Box<dyn TimeSource>, id_seed: u64) -> Self {
        Self {
            high_scores: HighScores::new(),
            eligibility_threshold: MINT_ELIGIBILITY_THRESHOLD,
            time,
            ids: Pcg32::seed_from_u64(id_seed),
        }
    }

    /// System time, ids seeded from the current time
    pub fn system() -> Self {
        let mut time = WallClock;
        let seed = time.now_ms();
        Self::new(Box::new(time), seed)
    }

    pub fn with_high_scores(mut self, high_scores: HighScores) -> Self {
        self.high_scores = high_scores;
        self
    }

    pub fn with_eligibility_threshold(mut self, threshold: u32) -> Self {
        self.eligibility_threshold = threshold;
        self
    }

    pub fn now_ms(&mut self) -> u64 {
        self.time.now_ms()
    }

    pub fn next_session_id(&mut self, started_at_ms: u64) -> SessionId {
        SessionId::generate(started_at_ms, &mut self.ids)
    }

    /// Best score recorded so far
    pub fn high_score(&self) -> u32 {
        self.high_scores.best()
    }
}

impl std::fmt::Debug for HostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostContext")
            .field("high_scores", &self.high_scores)
            .field("eligibility_threshold", &self.eligibility_threshold)
            .finish_non_exhaustive()
    }
}

/// Rendering collaborator
pub trait Renderer {
    /// Called once per tick with the post-tick state
    fn present(&mut self, snapshot: &Snapshot);
}

/// Renderer that draws nothing
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn present(&mut self, _snapshot: &Snapshot) {}
}

/// What one host frame did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Ticks delivered to the session
    pub ticks: u32,
    /// Set when a run ended during this frame
    pub finished: Option<FinishedSession>,
}

/// Drives one session from host frames and input callbacks
#[derive(Debug)]
pub struct GameHost<G: GapSource = SeededGaps> {
    session: Session<G>,
    context: HostContext,
    clock: StepClock,
    /// Mint hand-off waiting for the host to fire it
    mint_outbox: Option<MintRequest>,
}

impl<G: GapSource> GameHost<G> {
    pub fn new(session: Session<G>, context: HostContext, clock: StepClock) -> Self {
        Self {
            session,
            context,
            clock,
            mint_outbox: None,
        }
    }

    pub fn session(&self) -> &Session<G> {
        &self.session
    }

    pub fn context(&self) -> &HostContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut HostContext {
        &mut self.context
    }

    pub fn clock(&self) -> &StepClock {
        &self.clock
    }

    pub fn is_torn_down(&self) -> bool {
        !self.clock.is_running()
    }

    /// Input callback; applied at the next tick boundary
    pub fn input(&mut self, event: InputEvent) {
        if self.is_torn_down() {
            log::debug!("Ignoring {:?} after teardown", event);
            return;
        }
        self.session.queue_input(event);
    }

    /// Run the ticks the clock owes for this frame
    pub fn frame(&mut self, elapsed_secs: f32, renderer: &mut dyn Renderer) -> FrameReport {
        let ticks = self.clock.frame(elapsed_secs);
        let mut report = FrameReport {
            ticks,
            finished: None,
        };

        for _ in 0..ticks {
            let outcome = self.session.tick(&mut self.context);
            renderer.present(&self.session.snapshot(&self.context));

            if let StepOutcome::Ended(finished) = outcome {
                if let Some(request) = &finished.mint {
                    self.mint_outbox = Some(request.clone());
                }
                report.finished = Some(finished);
            }
        }
        report
    }

    /// Current snapshot without ticking (for redraws)
    pub fn snapshot(&self) -> Snapshot {
        self.session.snapshot(&self.context)
    }

    /// Whether a mint hand-off is waiting
    pub fn has_pending_mint(&self) -> bool {
        self.mint_outbox.is_some()
    }

    /// Take the pending mint hand-off; each request is handed out once
    pub fn take_mint_request(&mut self) -> Option<MintRequest> {
        self.mint_outbox.take()
    }

    /// Fire the pending mint hand-off against `service`
    ///
    /// Failures never touch the session; they come back as a dismissible
    /// notice for the player.
    pub fn settle_mint(&mut self, service: &dyn MintService) -> Option<MintNotice> {
        let request = self.take_mint_request()?;
        let notice = match service.request_mint(&request) {
            Ok(receipt) => {
                log::info!(
                    "Mint ready for session {}: {} tier, {} wei to {}",
                    request.session_id,
                    receipt.tier,
                    receipt.tx.value,
                    receipt.tx.to
                );
                MintNotice::Ready(receipt)
            }
            Err(err) => {
                log::warn!("Mint failed for session {}: {}", request.session_id, err);
                MintNotice::Failed(err)
            }
        };
        Some(notice)
    }

    /// Stop the clock and drop queued input; no tick reaches the session after this
    pub fn teardown(&mut self) {
        if self.is_torn_down() {
            return;
        }
        self.clock.stop();
        self.session.clear_inputs();
        log::info!("Host torn down after {} ticks", self.clock.issued());
    }

    /// Give back the host context (high scores) once the host is done
    pub fn into_context(mut self) -> HostContext {
        self.teardown();
        self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mint::{ContractMintService, MintError};
    use crate::session::SessionPhase;
    use crate::settings::MintSettings;
    use crate::sim::ClockMode;
    use crate::tuning::Tuning;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Snapshot>,
    }

    impl Renderer for Recorder {
        fn present(&mut self, snapshot: &Snapshot) {
            self.frames.push(snapshot.clone());
        }
    }

    fn host() -> (GameHost, ManualTime) {
        let time = ManualTime::new(1_000_000);
        let context = HostContext::new(Box::new(time.clone()), 11);
        let session = Session::new(Tuning::default(), SeededGaps::new(5));
        (GameHost::new(session, context, StepClock::new(ClockMode::PerFrame)), time)
    }

    fn play_until_end(host: &mut GameHost, renderer: &mut dyn Renderer) -> FinishedSession {
        for _ in 0..10_000 {
            if let Some(finished) = host.frame(1.0 / 60.0, renderer).finished {
                return finished;
            }
        }
        panic!("run never ended");
    }

    #[test]
    fn test_one_snapshot_per_tick() {
        let (mut host, _) = host();
        let mut recorder = Recorder::default();
        host.frame(0.016, &mut recorder);
        assert_eq!(recorder.frames.len(), 1);
        assert_eq!(recorder.frames[0].phase, SessionPhase::NotStarted);

        host.input(InputEvent::Activate);
        host.frame(0.016, &mut recorder);
        assert_eq!(recorder.frames.len(), 2);
        assert_eq!(recorder.frames[1].phase, SessionPhase::Active);
    }

    #[test]
    fn test_fixed_clock_delivers_owed_ticks() {
        let time = ManualTime::new(0);
        let context = HostContext::new(Box::new(time), 1);
        let session = Session::new(Tuning::default(), SeededGaps::new(5));
        let mut host = GameHost::new(session, context, StepClock::new(ClockMode::Fixed { step_secs: 0.01 }));
        let mut recorder = Recorder::default();
        let report = host.frame(0.035, &mut recorder);
        assert_eq!(report.ticks, 3);
        assert_eq!(recorder.frames.len(), 3);
    }

    #[test]
    fn test_no_ticks_after_teardown() {
        let (mut host, _) = host();
        let mut recorder = Recorder::default();
        host.input(InputEvent::Activate);
        for _ in 0..5 {
            host.frame(0.016, &mut recorder);
        }
        let steps = host.session().world().steps;
        let delivered = recorder.frames.len();

        host.teardown();
        host.input(InputEvent::Activate);
        for _ in 0..20 {
            let report = host.frame(0.016, &mut recorder);
            assert_eq!(report.ticks, 0);
        }
        assert!(host.is_torn_down());
        assert_eq!(host.session().world().steps, steps);
        assert_eq!(host.session().pending_inputs(), 0);
        assert_eq!(recorder.frames.len(), delivered);
    }

    #[test]
    fn test_no_mint_hand_off_for_zero_score() {
        let (mut host, _) = host();
        let mut recorder = Recorder::default();
        host.input(InputEvent::Activate);
        host.frame(0.016, &mut recorder);
        // A run that never flaps again ends on the ground with score 0
        let finished = play_until_end(&mut host, &mut recorder);
        assert_eq!(finished.score, 0);
        assert!(!host.has_pending_mint());
        assert_eq!(host.take_mint_request(), None);
    }

    #[test]
    fn test_settle_mint_surfaces_failure_without_touching_session() {
        let (mut host, _) = host();
        let mut recorder = Recorder::default();
        host.input(InputEvent::Activate);
        host.frame(0.016, &mut recorder);
        play_until_end(&mut host, &mut recorder);
        let world = host.session().world().clone();

        // Hand-craft an eligible request below the service floor
        host.mint_outbox = Some(MintRequest {
            session_id: host.session().id().unwrap(),
            score: 4,
            duration_secs: 3,
            action_count: 2,
        });
        let service = ContractMintService::new(MintSettings::default());
        let notice = host.settle_mint(&service).unwrap();
        assert!(matches!(notice, MintNotice::Failed(MintError::IneligibleScore { score: 4, floor: 10 })));
        assert!(notice.is_error());

        // Fire-once
        assert!(host.settle_mint(&service).is_none());
        assert_eq!(host.session().world(), &world);
        assert_eq!(host.session().phase(), SessionPhase::Ended);
    }

    #[test]
    fn test_input_after_end_restarts() {
        let (mut host, time) = host();
        let mut recorder = Recorder::default();
        host.input(InputEvent::Activate);
        host.frame(0.016, &mut recorder);
        time.advance(2_000);
        play_until_end(&mut host, &mut recorder);

        host.input(InputEvent::Activate);
        host.frame(0.016, &mut recorder);
        let snap = host.snapshot();
        assert_eq!(snap.phase, SessionPhase::Active);
        assert_eq!(snap.score, 0);
        assert_eq!(host.session().started_at_ms(), Some(1_002_000));
    }
}
