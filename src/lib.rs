//! Flappy Mint - a side-scrolling flap game with score-gated minting
//!
//! Core modules:
//! - `sim`: Deterministic simulation (clock, physics, collisions, spawning)
//! - `scoring`: Score to tier mapping over explicit threshold tables
//! - `session`: Session lifecycle state machine and finished-run payloads
//! - `host`: Host-side loop driver (clock, renderer hand-off, mint outbox)
//! - `mint`: Minting collaborator (payload, errors, call data)
//! - `tuning` / `settings`: Data-driven balance and runtime configuration

pub mod highscores;
pub mod host;
pub mod mint;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use host::{GameHost, HostContext, Renderer, TimeSource, WallClock};
pub use mint::{ContractMintService, MintError, MintReceipt, MintRequest, MintService};
pub use scoring::{LIVE_TIERS, MINT_TIERS, Tier, TierTable, tier_of};
pub use session::{InputEvent, Session, SessionId, SessionPhase, StepOutcome};
pub use settings::Settings;
pub use tuning::Tuning;

/// Reference game constants (one step = one frame at 60 Hz)
pub mod consts {
    /// Reference display rate the step constants were tuned at
    pub const REFERENCE_HZ: f32 = 60.0;
    /// Seconds per simulation step at the reference rate
    pub const STEP_DT: f32 = 1.0 / REFERENCE_HZ;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions
    pub const WORLD_WIDTH: f32 = 400.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    /// Body defaults - fixed column, square extent
    pub const BODY_X: f32 = 80.0;
    pub const BODY_SIZE: f32 = 30.0;
    pub const BODY_START_Y: f32 = 250.0;

    /// Velocity added every step (pixels/step²)
    pub const GRAVITY: f32 = 0.4;
    /// Velocity set by an impulse (negative = up)
    pub const IMPULSE_VELOCITY: f32 = -8.0;

    /// Obstacle defaults
    pub const OBSTACLE_WIDTH: f32 = 60.0;
    pub const GAP_HEIGHT: f32 = 180.0;
    /// Horizontal scroll per step
    pub const SCROLL_SPEED: f32 = 2.0;
    /// Distance the newest obstacle must travel before the next spawns
    pub const SPAWN_SPACING: f32 = 250.0;
    /// Minimum distance between a gap and the world's top/bottom edge
    pub const GAP_MARGIN: f32 = 50.0;

    /// Client-side score needed to offer minting
    pub const MINT_ELIGIBILITY_THRESHOLD: u32 = 3;
    /// Service-side score floor for minting
    pub const MINT_SERVICE_FLOOR: u32 = 10;
    /// Mint price in wei (0.0001 ETH)
    pub const MINT_PRICE_WEI: u128 = 100_000_000_000_000;
}
