//! Flappy Mint headless runner
//!
//! Plays a few sessions with a simple gap-following autopilot, the way a
//! browser host would drive the core: one `frame` per display frame, input
//! callbacks in between, and a mint hand-off once a run qualifies.

use flappy_mint::host::{GameHost, HostContext, Renderer};
use flappy_mint::mint::{ContractMintService, MintNotice};
use flappy_mint::session::{FinishedSession, InputEvent, Session, SessionPhase, Snapshot};
use flappy_mint::sim::{SeededGaps, StepClock};
use flappy_mint::{HighScores, Settings, Tuning};

/// Frames simulated per session before giving up
const MAX_FRAMES: u32 = 60 * 60 * 5;
/// Sessions played per invocation
const SESSIONS: u32 = 3;

/// Logs a line every second of play
struct LogRenderer {
    frames: u64,
}

impl Renderer for LogRenderer {
    fn present(&mut self, snapshot: &Snapshot) {
        self.frames += 1;
        if self.frames % 60 == 0 && snapshot.phase == SessionPhase::Active {
            log::debug!(
                "y={:.1} vy={:.2} obstacles={} score={} tier={}",
                snapshot.body_y,
                snapshot.body_vy,
                snapshot.obstacles.len(),
                snapshot.score,
                snapshot.tier
            );
        }
    }
}

/// Flap when falling below the middle of the next gap
fn autopilot(snapshot: &Snapshot, tuning: &Tuning) -> bool {
    let body_left = tuning.body_x - tuning.body_half();
    let target = snapshot
        .obstacles
        .iter()
        .find(|o| o.x + tuning.obstacle_width >= body_left)
        .map(|o| o.gap_y + tuning.gap_height * 0.65)
        .unwrap_or(tuning.world_height * 0.5);
    snapshot.body_vy >= 0.0 && snapshot.body_y > target
}

/// Start a run and fly it with the autopilot until it ends or `max_frames` pass
///
/// Only call this while no run is active: an activate during a run is a flap,
/// not a new run.
fn play_round(
    host: &mut GameHost,
    renderer: &mut dyn Renderer,
    frame_secs: f32,
    max_frames: u32,
) -> Option<FinishedSession> {
    debug_assert_ne!(host.session().phase(), SessionPhase::Active);
    host.input(InputEvent::Activate);

    for _ in 0..max_frames {
        if let Some(done) = host.frame(frame_secs, renderer).finished {
            return Some(done);
        }
        if autopilot(&host.snapshot(), host.session().tuning()) {
            host.input(InputEvent::Activate);
        }
    }
    None
}

fn main() {
    env_logger::init();
    log::info!("Flappy Mint (headless) starting...");

    let settings = Settings::load();
    let seed = settings.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    log::info!("Gap seed {seed}");

    let high_scores = settings
        .high_scores_path
        .as_deref()
        .map(HighScores::load)
        .unwrap_or_default();
    let context = HostContext::system()
        .with_high_scores(high_scores)
        .with_eligibility_threshold(settings.mint.eligibility_threshold);
    let session = Session::new(settings.tuning.clone(), SeededGaps::new(seed));
    let mut host = GameHost::new(session, context, StepClock::new(settings.clock));
    let service = ContractMintService::new(settings.mint.clone());
    let mut renderer = LogRenderer { frames: 0 };
    let frame_secs = 1.0 / flappy_mint::consts::REFERENCE_HZ;

    for round in 1..=SESSIONS {
        match play_round(&mut host, &mut renderer, frame_secs, MAX_FRAMES) {
            Some(done) => println!(
                "Run {round}: score {} in {}s with {} flaps{}",
                done.score,
                done.duration_secs,
                done.action_count,
                if done.new_high_score { " (new high score!)" } else { "" }
            ),
            None => {
                // Another activate would only flap, so stop rather than report a new run
                println!("Run {round}: still flying after {MAX_FRAMES} frames, stopping");
                break;
            }
        }

        if let Some(notice) = host.settle_mint(&service) {
            println!("  {}", notice.message());
            if let MintNotice::Ready(receipt) = &notice {
                println!("  to={} value={} data={}", receipt.tx.to, receipt.tx.value, receipt.tx.data);
            }
        }
    }

    println!("High score: {}", host.context().high_score());
    let context = host.into_context();
    if let Some(path) = settings.high_scores_path.as_deref() {
        if let Err(e) = context.high_scores.save(path) {
            log::warn!("Could not save high scores: {e}");
        }
    }
}
