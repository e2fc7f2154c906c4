use crate::domain::types::{CustomerId, MovementState, RentalCategory, RentalId};
use crate::error::{RentalError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    /// Favorite customers are exempt from every checkout adjustment
    pub is_favorite: bool,
}

impl Customer {
    pub fn new(id: CustomerId, name: String, is_favorite: bool) -> Self {
        Self {
            id,
            name,
            is_favorite,
        }
    }
}

/// Actual handover timestamps of the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleMovement {
    pub checkout: NaiveDateTime,
    pub checkin: Option<NaiveDateTime>,
}

impl VehicleMovement {
    pub fn checked_out_at(checkout: NaiveDateTime) -> Self {
        Self {
            checkout,
            checkin: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rental {
    pub id: RentalId,
    /// Planned start
    pub start: NaiveDateTime,
    /// Planned end, moved by the checkout rules
    pub end: NaiveDateTime,
    pub category: RentalCategory,
    pub customer: Customer,
    pub movement: Option<VehicleMovement>,
}

impl Rental {
    pub fn new(
        start: NaiveDateTime,
        end: NaiveDateTime,
        category: RentalCategory,
        customer: Customer,
    ) -> Result<Self> {
        let rental = Self {
            id: RentalId::new(),
            start,
            end,
            category,
            customer,
            movement: None,
        };
        rental.validate()?;
        Ok(rental)
    }

    // Only enforced on creation: checkout adjustments may later move the end
    // before the start.
    fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(RentalError::invalid(format!(
                "rental {} starts at {} after its end {}",
                self.id, self.start, self.end
            )));
        }
        Ok(())
    }

    pub fn is_private(&self) -> bool {
        self.category == RentalCategory::Private
    }

    pub fn movement_state(&self) -> MovementState {
        match &self.movement {
            None => MovementState::NotMoved,
            Some(movement) if movement.checkin.is_some() => MovementState::CheckedIn,
            Some(_) => MovementState::CheckedOut,
        }
    }
}
