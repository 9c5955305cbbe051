//! Bets API entity types

use super::error::{ApiError, Result};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Identifier of a bet on the engine
pub type BetId = u64;

/// Timestamp format used for stake creation times
pub const STAKE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

// =============================================================================
// Bet
// =============================================================================

/// Lifecycle state of a bet
///
/// fresh → active → accept_end → executed / closed / calculated / returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetState {
    Fresh,
    Active,
    AcceptEnd,
    Executed,
    Closed,
    Calculated,
    Returned,
    /// State string this client does not know about yet
    #[serde(other)]
    Unknown,
}

impl BetState {
    /// States returned by the active bets listing
    pub const ACTIVE: [BetState; 3] = [BetState::Fresh, BetState::Active, BetState::AcceptEnd];

    pub fn as_str(&self) -> &'static str {
        match self {
            BetState::Fresh => "fresh",
            BetState::Active => "active",
            BetState::AcceptEnd => "accept_end",
            BetState::Executed => "executed",
            BetState::Closed => "closed",
            BetState::Calculated => "calculated",
            BetState::Returned => "returned",
            BetState::Unknown => "unknown",
        }
    }
}

/// Bet as returned by the API
///
/// Only the fields this client reads are typed, everything else the server
/// sends is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    pub id: BetId,

    pub state: BetState,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub stakes: Vec<StakeRecord>,

    /// JSON encoded parameters of the form the bet was created from
    #[serde(default)]
    pub form_params: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bet {
    pub fn is_executed(&self) -> bool {
        self.state == BetState::Executed
    }

    /// Slug of the project this bet is associated with
    ///
    /// `None` when the bet has no form parameters or they carry no project.
    pub fn project_slug(&self) -> Result<Option<String>> {
        let raw = match self.form_params.as_deref() {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(None),
        };

        let params: Map<String, Value> = serde_json::from_str(raw)
            .map_err(|e| ApiError::Deserialize(format!("form_params of bet {}: {}", self.id, e)))?;

        Ok(match params.get("project") {
            Some(Value::String(slug)) => Some(slug.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
    }

    /// All stakes on the 'in' side with their sum
    pub fn stakes_in(&self) -> Result<StakeSummary> {
        self.stakes_by_side(Side::In)
    }

    /// All stakes on the 'out' side with their sum
    pub fn stakes_out(&self) -> Result<StakeSummary> {
        self.stakes_by_side(Side::Out)
    }

    pub fn stakes_by_side(&self, side: Side) -> Result<StakeSummary> {
        let stakes = self
            .stakes
            .iter()
            .filter(|s| s.side == side)
            .map(StakeRecord::convert)
            .collect::<Result<Vec<_>>>()?;

        let sum = stakes.iter().try_fold(Decimal::ZERO, |sum, stake| {
            sum.checked_add(stake.amount).ok_or_else(|| {
                ApiError::InvalidAmount(format!(
                    "sum of {:?} stakes of bet {} overflows",
                    side, self.id
                ))
            })
        })?;
        Ok(StakeSummary { stakes, sum })
    }
}

// =============================================================================
// Stakes
// =============================================================================

/// Side of a bet a stake is placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    In,
    Out,
    #[serde(other)]
    Unknown,
}

/// Stake exactly as the API sends it
///
/// Amount and creation time are left unparsed so that one malformed stake
/// does not make a whole bet listing unreadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeRecord {
    pub side: Side,

    /// Decimal amount, sent either as a string or a number
    pub amount: Value,

    pub created: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StakeRecord {
    /// Parse amount and creation time into a typed stake
    pub fn convert(&self) -> Result<Stake> {
        let created = NaiveDateTime::parse_from_str(&self.created, STAKE_TIME_FORMAT).map_err(
            |_| ApiError::InvalidTimestamp {
                value: self.created.clone(),
                format: STAKE_TIME_FORMAT,
            },
        )?;

        Ok(Stake {
            side: self.side,
            amount: parse_amount(&self.amount)?,
            created,
            extra: self.extra.clone(),
        })
    }
}

/// Stake with typed amount and creation time
#[derive(Debug, Clone, PartialEq)]
pub struct Stake {
    pub side: Side,
    pub amount: Decimal,
    pub created: NaiveDateTime,
    pub extra: Map<String, Value>,
}

/// Stakes of one side together with their total amount
#[derive(Debug, Clone, PartialEq)]
pub struct StakeSummary {
    pub stakes: Vec<Stake>,
    pub sum: Decimal,
}

fn parse_amount(value: &Value) -> Result<Decimal> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => return Err(ApiError::InvalidAmount(other.to_string())),
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| ApiError::InvalidAmount(text))
}

// =============================================================================
// Response payloads
// =============================================================================

/// One page of a bets listing (`bets` field of the response)
#[derive(Debug, Deserialize)]
pub(crate) struct BetsPage {
    #[serde(default)]
    pub results: Vec<Bet>,

    /// Absolute URL of the next page, absent on the last one
    #[serde(default)]
    pub next: Option<String>,
}
