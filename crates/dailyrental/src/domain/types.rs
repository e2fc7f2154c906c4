use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Rental identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RentalId(Uuid);

impl RentalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RentalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RentalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RentalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Customer identifier as issued by the customer registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Business context of a rental, which selects the checkout rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentalCategory {
    /// Business users renting through a garage
    Garage,
    Private,
}

impl fmt::Display for RentalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RentalCategory::Garage => write!(f, "garage"),
            RentalCategory::Private => write!(f, "private"),
        }
    }
}

impl FromStr for RentalCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "garage" => Ok(RentalCategory::Garage),
            "private" => Ok(RentalCategory::Private),
            other => Err(format!("unknown rental category: {}", other)),
        }
    }
}

/// Where the vehicle of a rental currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementState {
    NotMoved,
    CheckedOut,
    CheckedIn,
}

impl fmt::Display for MovementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementState::NotMoved => write!(f, "not_moved"),
            MovementState::CheckedOut => write!(f, "checked_out"),
            MovementState::CheckedIn => write!(f, "checked_in"),
        }
    }
}
