//! Minting collaborator
//!
//! A finished run that qualifies is handed off as a [`MintRequest`]. The
//! service side validates it against its own score floor, names its tier
//! with [`MINT_TIERS`] and returns a transaction for the player's wallet to
//! sign. Every failure here is recoverable: the host shows a notice and the
//! session is left alone.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, sol};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::{MINT_TIERS, Tier};
use crate::session::SessionId;
use crate::settings::MintSettings;

sol! {
    /// Score NFT contract, payable mint keyed by session
    #[derive(Debug)]
    interface IFlappyBirdNFT {
        function mintFlappyBirdNFT(
            bytes32 session_id,
            uint256 score,
            uint256 game_time,
            uint256 jumps
        ) external payable;
    }
}

/// EIP-1193 "user rejected request"
pub const USER_REJECTED_CODE: i64 = 4001;

/// Errors on the minting path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MintError {
    /// Malformed hand-off (missing identifier or score, bad JSON)
    #[error("invalid mint request: {0}")]
    InvalidInput(String),

    /// Score below the service's floor
    #[error("score must be at least {floor} to mint, got {score}")]
    IneligibleScore { score: u32, floor: u32 },

    /// Service unreachable or contract not configured
    #[error("minting unavailable: {reason}")]
    ServiceUnavailable {
        reason: String,
        /// Tier the run would have been minted at
        tier: Tier,
    },

    /// Wallet signer declined
    #[error("transaction rejected by user")]
    UserRejected,

    /// Wallet lacks funds for price plus gas
    #[error("insufficient funds for mint price plus gas")]
    InsufficientResources,

    #[error("mint failed: {0}")]
    Unknown(String),
}

/// Result type for minting operations
pub type MintResult<T> = Result<T, MintError>;

/// Map a wallet/signer failure onto the error taxonomy
pub fn classify_signer_failure(code: Option<i64>, message: &str) -> MintError {
    if code == Some(USER_REJECTED_CODE) {
        MintError::UserRejected
    } else if message.to_lowercase().contains("insufficient funds") {
        MintError::InsufficientResources
    } else if message.is_empty() {
        MintError::Unknown("Failed to mint NFT".to_string())
    } else {
        MintError::Unknown(message.to_string())
    }
}

/// Finished-run payload handed to the minting collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    #[serde(rename = "sessionId")]
    pub session_id: SessionId,
    pub score: u32,
    #[serde(rename = "gameTime")]
    pub duration_secs: u64,
    #[serde(rename = "jumps")]
    pub action_count: u32,
}

/// Wire shape with every field optional, for validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MintBody {
    session_id: Option<SessionId>,
    score: Option<u32>,
    game_time: Option<u64>,
    jumps: Option<u32>,
}

impl MintRequest {
    /// Parse a JSON hand-off; identifier and score are required
    pub fn from_json(body: &str) -> MintResult<Self> {
        let body: MintBody = serde_json::from_str(body).map_err(|e| MintError::InvalidInput(e.to_string()))?;
        match (body.session_id, body.score) {
            (Some(session_id), Some(score)) if !session_id.is_zero() => Ok(Self {
                session_id,
                score,
                duration_secs: body.game_time.unwrap_or(0),
                action_count: body.jumps.unwrap_or(0),
            }),
            _ => Err(MintError::InvalidInput("missing required fields".to_string())),
        }
    }

    /// ABI-encoded `mintFlappyBirdNFT` call data
    pub fn call_data(&self) -> Bytes {
        IFlappyBirdNFT::mintFlappyBirdNFTCall {
            session_id: self.session_id.0,
            score: U256::from(self.score),
            game_time: U256::from(self.duration_secs),
            jumps: U256::from(self.action_count),
        }
        .abi_encode()
        .into()
    }
}

/// Unsigned transaction for the player's wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxDescriptor {
    pub to: Address,
    /// Wei
    pub value: U256,
    pub data: Bytes,
}

/// Successful service response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub tier: Tier,
    pub score: u32,
    pub tx: TxDescriptor,
}

/// The external minting collaborator
pub trait MintService {
    fn request_mint(&self, request: &MintRequest) -> MintResult<MintReceipt>;

    /// Validate and serve a raw JSON hand-off
    fn request_mint_json(&self, body: &str) -> MintResult<MintReceipt> {
        self.request_mint(&MintRequest::from_json(body)?)
    }
}

/// Reference service backed by a deployed mint contract
#[derive(Debug, Clone)]
pub struct ContractMintService {
    settings: MintSettings,
}

impl ContractMintService {
    pub fn new(settings: MintSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MintSettings {
        &self.settings
    }
}

impl MintService for ContractMintService {
    fn request_mint(&self, request: &MintRequest) -> MintResult<MintReceipt> {
        if request.session_id.is_zero() {
            return Err(MintError::InvalidInput("missing session id".to_string()));
        }

        let floor = self.settings.service_floor;
        if request.score < floor {
            return Err(MintError::IneligibleScore {
                score: request.score,
                floor,
            });
        }

        let tier = MINT_TIERS.tier_of(request.score);
        let Some(to) = self.settings.contract_address else {
            return Err(MintError::ServiceUnavailable {
                reason: "NFT contract not deployed yet".to_string(),
                tier,
            });
        };

        log::debug!("Encoding {} tier mint for session {}", tier, request.session_id);
        Ok(MintReceipt {
            tier,
            score: request.score,
            tx: TxDescriptor {
                to,
                value: U256::from(self.settings.mint_price_wei),
                data: request.call_data(),
            },
        })
    }
}

/// Outcome of a mint hand-off, shown to the player and dismissed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintNotice {
    Ready(MintReceipt),
    Failed(MintError),
}

impl MintNotice {
    pub fn is_error(&self) -> bool {
        matches!(self, MintNotice::Failed(_))
    }

    /// Player-facing text
    pub fn message(&self) -> String {
        match self {
            MintNotice::Ready(receipt) => format!(
                "{} {} tier ready to mint for score {}. Confirm the transaction in your wallet.",
                receipt.tier.badge(),
                receipt.tier,
                receipt.score
            ),
            MintNotice::Failed(MintError::ServiceUnavailable { reason, tier }) => {
                format!("❌ {reason} (your run qualifies for {tier})")
            }
            MintNotice::Failed(err) => format!("❌ {err}"),
        }
    }
}
