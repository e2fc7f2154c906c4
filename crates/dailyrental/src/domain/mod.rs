pub mod checkout_rules;
pub mod rentals;
pub mod types;
pub mod vehicle_handler;

pub use checkout_rules::{CheckoutDecision, CheckoutRuleEngine, GarageRule, UnchangedReason};
pub use rentals::{Customer, Rental, VehicleMovement};
pub use types::{CustomerId, MovementState, RentalCategory, RentalId};
pub use vehicle_handler::VehicleHandler;
