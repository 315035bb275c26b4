use crate::error::PipelineError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};

/// A user-initiated market operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// Stake on one side of a market.
    Stake,
    /// Claim winnings of a resolved market.
    Claim,
    /// List a position for sale on the P2P market.
    CreateListing,
    /// Buy a position listed on the P2P market.
    PurchaseListing,
    /// Exit a position before the market resolves.
    EarlyExit,
    /// Claim the payout of a settled market.
    ClaimPayout,
}

impl Operation {
    /// All operations.
    pub const ALL: [Self; 6] = [
        Self::Stake,
        Self::Claim,
        Self::CreateListing,
        Self::PurchaseListing,
        Self::EarlyExit,
        Self::ClaimPayout,
    ];

    /// Returns the identifier used on the wire and in endpoint paths.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stake => "stake",
            Self::Claim => "claim",
            Self::CreateListing => "create-listing",
            Self::PurchaseListing => "purchase-listing",
            Self::EarlyExit => "early-exit",
            Self::ClaimPayout => "claim-payout",
        }
    }

    /// Whether the operation spends the position token.
    ///
    /// Only these operations go through balance preflight and the allowance check.
    pub const fn moves_value(&self) -> bool {
        matches!(self, Self::Stake | Self::PurchaseListing)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == normalized)
            .ok_or_else(|| format!("unknown operation: {s}"))
    }
}

/// Side of a binary market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    /// The outcome happens.
    Yes,
    /// The outcome does not happen.
    No,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => f.write_str("YES"),
            Self::No => f.write_str("NO"),
        }
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "YES" => Ok(Self::Yes),
            "NO" => Ok(Self::No),
            _ => Err(format!("invalid position: {s}, expected YES or NO")),
        }
    }
}

/// Parameters of an operation.
///
/// Every variant carries exactly the fields its [`Operation`] requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum OperationParams {
    /// Stake `amount` of the position token on `position`.
    Stake {
        /// Market id.
        market_id: String,
        /// Side to stake on.
        position: Position,
        /// Amount of position token to stake.
        amount: Decimal,
    },
    /// Claim winnings.
    Claim {
        /// Market id.
        market_id: String,
    },
    /// List a position for sale.
    CreateListing {
        /// Market id.
        market_id: String,
        /// Asking price in position token.
        ask_price: Decimal,
        /// How long the listing stays open.
        #[serde(with = "crate::serde::duration")]
        duration: Duration,
    },
    /// Buy a listed position.
    PurchaseListing {
        /// Listing id.
        listing_id: String,
        /// Price the buyer confirmed, in position token.
        price: Decimal,
    },
    /// Exit a position early.
    EarlyExit {
        /// Market id.
        market_id: String,
    },
    /// Claim a settled payout.
    ClaimPayout {
        /// Market id.
        market_id: String,
    },
}

impl OperationParams {
    /// Builds typed parameters out of loosely typed input.
    ///
    /// Fails with [`PipelineError::MissingParameter`] when a field the operation requires is absent
    /// or blank.
    pub fn from_raw(operation: Operation, raw: RawOperationParams) -> Result<Self, PipelineError> {
        let field = |name| PipelineError::MissingParameter { operation, field: name };
        let text = |value: Option<String>, name| {
            value.filter(|value| !value.trim().is_empty()).ok_or_else(|| field(name))
        };

        let params = match operation {
            Operation::Stake => Self::Stake {
                market_id: text(raw.market_id, "marketId")?,
                position: raw.position.ok_or_else(|| field("position"))?,
                amount: raw.amount.ok_or_else(|| field("amount"))?,
            },
            Operation::Claim => Self::Claim { market_id: text(raw.market_id, "marketId")? },
            Operation::CreateListing => Self::CreateListing {
                market_id: text(raw.market_id, "marketId")?,
                ask_price: raw.ask_price.ok_or_else(|| field("askPrice"))?,
                duration: raw.duration.ok_or_else(|| field("duration"))?,
            },
            Operation::PurchaseListing => Self::PurchaseListing {
                listing_id: text(raw.listing_id, "listingId")?,
                price: raw.price.ok_or_else(|| field("price"))?,
            },
            Operation::EarlyExit => Self::EarlyExit { market_id: text(raw.market_id, "marketId")? },
            Operation::ClaimPayout => {
                Self::ClaimPayout { market_id: text(raw.market_id, "marketId")? }
            }
        };

        params.validate()?;
        Ok(params)
    }

    /// Returns the [`Operation`] these parameters belong to.
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Stake { .. } => Operation::Stake,
            Self::Claim { .. } => Operation::Claim,
            Self::CreateListing { .. } => Operation::CreateListing,
            Self::PurchaseListing { .. } => Operation::PurchaseListing,
            Self::EarlyExit { .. } => Operation::EarlyExit,
            Self::ClaimPayout { .. } => Operation::ClaimPayout,
        }
    }

    /// Returns the market the operation acts on, if it names one.
    pub fn market_id(&self) -> Option<&str> {
        match self {
            Self::Stake { market_id, .. }
            | Self::Claim { market_id }
            | Self::CreateListing { market_id, .. }
            | Self::EarlyExit { market_id }
            | Self::ClaimPayout { market_id } => Some(market_id),
            Self::PurchaseListing { .. } => None,
        }
    }

    /// Returns the amount of position token the operation spends.
    ///
    /// `Some` exactly for operations where [`Operation::moves_value`] holds.
    pub const fn spend_amount(&self) -> Option<Decimal> {
        match self {
            Self::Stake { amount, .. } => Some(*amount),
            Self::PurchaseListing { price, .. } => Some(*price),
            _ => None,
        }
    }

    /// Checks that ids are not blank and amounts are positive.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let operation = self.operation();
        let id = |value: &str, field| {
            if value.trim().is_empty() {
                return Err(PipelineError::MissingParameter { operation, field });
            }
            Ok(())
        };
        let positive = |value: Decimal, field| {
            if value <= Decimal::ZERO {
                return Err(PipelineError::InvalidParameter {
                    field,
                    reason: format!("must be positive, got {value}"),
                });
            }
            Ok(())
        };

        match self {
            Self::Stake { market_id, amount, .. } => {
                id(market_id, "marketId")?;
                positive(*amount, "amount")
            }
            Self::CreateListing { market_id, ask_price, duration } => {
                id(market_id, "marketId")?;
                positive(*ask_price, "askPrice")?;
                if duration.is_zero() {
                    return Err(PipelineError::InvalidParameter {
                        field: "duration",
                        reason: "must be at least one second".to_string(),
                    });
                }
                Ok(())
            }
            Self::PurchaseListing { listing_id, price } => {
                id(listing_id, "listingId")?;
                positive(*price, "price")
            }
            Self::Claim { market_id }
            | Self::EarlyExit { market_id }
            | Self::ClaimPayout { market_id } => id(market_id, "marketId"),
        }
    }
}

/// Operation parameters as they arrive from untyped callers, every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawOperationParams {
    /// Market id.
    pub market_id: Option<String>,
    /// Side to stake on.
    pub position: Option<Position>,
    /// Stake amount.
    pub amount: Option<Decimal>,
    /// Listing asking price.
    pub ask_price: Option<Decimal>,
    /// Listing duration in seconds.
    #[serde(with = "crate::serde::duration::option")]
    pub duration: Option<Duration>,
    /// Listing id.
    pub listing_id: Option<String>,
    /// Confirmed listing price.
    pub price: Option<Decimal>,
}
