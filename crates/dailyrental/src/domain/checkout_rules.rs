//! Planned-end adjustment applied when a vehicle is checked out.
//!
//! A checkout is only eligible for an adjustment when it happens strictly
//! before the planned start and the customer is not a favorite. Private
//! rentals then move their end by the hour-of-day difference between start
//! and checkout. Garage rentals move their end by a fixed amount taken from
//! the first matching rule of a priority-ordered list.

use crate::domain::rentals::Rental;
use crate::error::{RentalError, Result};
use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const FOUR_MINUS_THRESHOLD_HOURS: i64 = 4;
pub const TWO_MINUS_THRESHOLD_HOURS: i64 = 2;

/// Default garage rules, highest priority first.
pub const GARAGE_CHECKOUT_RULES: [GarageRule; 2] = [GarageRule::FourMinus, GarageRule::TwoMinus];

pub fn is_early(rental: &Rental, checkout: NaiveDateTime) -> bool {
    checkout < rental.start
}

pub fn is_not_favorite_customer(rental: &Rental) -> bool {
    !rental.customer.is_favorite
}

pub fn is_private_rental(rental: &Rental) -> bool {
    rental.is_private()
}

/// How long before the planned start the checkout happened. Negative when late.
pub fn early_by(rental: &Rental, checkout: NaiveDateTime) -> Duration {
    rental.start.signed_duration_since(checkout)
}

pub fn four_minus_rule_applies(rental: &Rental, checkout: NaiveDateTime) -> bool {
    early_by(rental, checkout) >= Duration::hours(FOUR_MINUS_THRESHOLD_HOURS)
}

pub fn two_minus_rule_applies(rental: &Rental, checkout: NaiveDateTime) -> bool {
    early_by(rental, checkout) >= Duration::hours(TWO_MINUS_THRESHOLD_HOURS)
}

/// Fixed adjustments for garage rentals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GarageRule {
    /// Checkout at least four hours early: end moves four hours earlier
    FourMinus,
    /// Checkout at least two hours early: end moves two hours earlier
    TwoMinus,
}

impl GarageRule {
    pub fn applies(&self, rental: &Rental, checkout: NaiveDateTime) -> bool {
        match self {
            GarageRule::FourMinus => four_minus_rule_applies(rental, checkout),
            GarageRule::TwoMinus => two_minus_rule_applies(rental, checkout),
        }
    }

    /// Signed shift added to the planned end when the rule fires.
    pub fn end_shift(&self) -> Duration {
        match self {
            GarageRule::FourMinus => -Duration::hours(FOUR_MINUS_THRESHOLD_HOURS),
            GarageRule::TwoMinus => -Duration::hours(TWO_MINUS_THRESHOLD_HOURS),
        }
    }
}

impl fmt::Display for GarageRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GarageRule::FourMinus => write!(f, "four_minus"),
            GarageRule::TwoMinus => write!(f, "two_minus"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnchangedReason {
    NotEarly,
    FavoriteCustomer,
    BelowGarageThreshold,
}

impl fmt::Display for UnchangedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnchangedReason::NotEarly => write!(f, "checkout not early"),
            UnchangedReason::FavoriteCustomer => write!(f, "favorite customer"),
            UnchangedReason::BelowGarageThreshold => write!(f, "below garage thresholds"),
        }
    }
}

/// Outcome of evaluating a checkout: which branch fired and the resulting end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckoutDecision {
    Unchanged {
        reason: UnchangedReason,
        end: NaiveDateTime,
    },
    PrivateHourShift {
        hours: i64,
        end: NaiveDateTime,
    },
    Garage {
        rule: GarageRule,
        end: NaiveDateTime,
    },
}

impl CheckoutDecision {
    pub fn new_end(&self) -> NaiveDateTime {
        match self {
            CheckoutDecision::Unchanged { end, .. }
            | CheckoutDecision::PrivateHourShift { end, .. }
            | CheckoutDecision::Garage { end, .. } => *end,
        }
    }

    pub fn is_adjusted(&self) -> bool {
        !matches!(self, CheckoutDecision::Unchanged { .. })
    }
}

/// Pure decision logic for checkout adjustments.
#[derive(Debug, Clone)]
pub struct CheckoutRuleEngine {
    garage_rules: Vec<GarageRule>,
}

impl CheckoutRuleEngine {
    pub fn new() -> Self {
        Self::with_garage_rules(GARAGE_CHECKOUT_RULES.to_vec())
    }

    /// Rules are tried in the given order; the first match wins.
    pub fn with_garage_rules(garage_rules: Vec<GarageRule>) -> Self {
        Self { garage_rules }
    }

    pub fn garage_rules(&self) -> &[GarageRule] {
        &self.garage_rules
    }

    /// Decides the planned end the rental must carry after a checkout at `checkout`.
    ///
    /// Does not touch the rental. An earlier adjustment may already have moved
    /// the end before the start; that rental is still evaluated normally. Fails
    /// only when the adjusted end would leave the representable date range.
    pub fn evaluate(&self, rental: &Rental, checkout: NaiveDateTime) -> Result<CheckoutDecision> {
        if !is_early(rental, checkout) {
            return Ok(CheckoutDecision::Unchanged {
                reason: UnchangedReason::NotEarly,
                end: rental.end,
            });
        }
        if !is_not_favorite_customer(rental) {
            return Ok(CheckoutDecision::Unchanged {
                reason: UnchangedReason::FavoriteCustomer,
                end: rental.end,
            });
        }

        if is_private_rental(rental) {
            self.evaluate_private(rental, checkout)
        } else {
            self.evaluate_garage(rental, checkout)
        }
    }

    // Compares hour-of-day fields only, not elapsed time: a checkout on the
    // previous day at a later hour yields a negative delta and moves the end later.
    fn evaluate_private(&self, rental: &Rental, checkout: NaiveDateTime) -> Result<CheckoutDecision> {
        let hours = i64::from(rental.start.hour()) - i64::from(checkout.hour());
        let end = shift_end(rental, -Duration::hours(hours))?;

        debug!(rental_id = %rental.id, hours, "private hour shift applies");
        Ok(CheckoutDecision::PrivateHourShift { hours, end })
    }

    fn evaluate_garage(&self, rental: &Rental, checkout: NaiveDateTime) -> Result<CheckoutDecision> {
        match self
            .garage_rules
            .iter()
            .find(|rule| rule.applies(rental, checkout))
        {
            Some(rule) => {
                debug!(rental_id = %rental.id, %rule, "garage rule applies");
                Ok(CheckoutDecision::Garage {
                    rule: *rule,
                    end: shift_end(rental, rule.end_shift())?,
                })
            }
            None => Ok(CheckoutDecision::Unchanged {
                reason: UnchangedReason::BelowGarageThreshold,
                end: rental.end,
            }),
        }
    }
}

impl Default for CheckoutRuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn shift_end(rental: &Rental, shift: Duration) -> Result<NaiveDateTime> {
    rental.end.checked_add_signed(shift).ok_or_else(|| {
        RentalError::invalid(format!(
            "adjusting end {} of rental {} by {} leaves the supported date range",
            rental.end, rental.id, shift
        ))
    })
}
