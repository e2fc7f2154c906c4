use crate::domain::checkout_rules::{CheckoutDecision, CheckoutRuleEngine};
use crate::domain::rentals::{Rental, VehicleMovement};
use crate::error::Result;
use crate::storage::RentalRepository;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Records vehicle handovers on rentals and persists them.
///
/// Garage rentals (business users):
/// - checkout at least 4 hours early: planned end moves exactly 4 hours earlier
/// - checkout at least 2 hours early: planned end moves exactly 2 hours earlier
///
/// Private rentals: an early checkout moves the planned end earlier by the
/// difference between the hour of the planned start and the hour of checkout.
///
/// Favorite customers never get an adjustment.
pub struct VehicleHandler {
    repository: Arc<dyn RentalRepository>,
    engine: CheckoutRuleEngine,
}

impl VehicleHandler {
    pub fn new(repository: Arc<dyn RentalRepository>) -> Self {
        Self::with_engine(repository, CheckoutRuleEngine::new())
    }

    pub fn with_engine(repository: Arc<dyn RentalRepository>, engine: CheckoutRuleEngine) -> Self {
        Self { repository, engine }
    }

    /// Checks the vehicle out at `checkout_at`, adjusts the planned end and
    /// persists the rental.
    ///
    /// Any previous movement is replaced. The in-memory changes stay applied
    /// when persisting fails; the storage error is returned unchanged.
    pub async fn checkout(
        &self,
        rental: &mut Rental,
        checkout_at: NaiveDateTime,
    ) -> Result<CheckoutDecision> {
        let decision = self.engine.evaluate(rental, checkout_at)?;

        rental.movement = Some(VehicleMovement::checked_out_at(checkout_at));
        rental.end = decision.new_end();

        info!(
            rental_id = %rental.id,
            category = %rental.category,
            checkout = %checkout_at,
            end = %rental.end,
            adjusted = decision.is_adjusted(),
            "Vehicle checked out"
        );

        if let Err(e) = self.repository.update_rental(rental).await {
            warn!(rental_id = %rental.id, "Failed to persist checkout: {}", e);
            return Err(e);
        }

        Ok(decision)
    }

    /// Placeholder for the checkin flow; leaves the rental untouched.
    pub async fn checkin(&self, rental: &mut Rental) -> Result<()> {
        debug!(rental_id = %rental.id, state = %rental.movement_state(), "Checkin requested, nothing to do");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkout_rules::{GarageRule, UnchangedReason};
    use crate::domain::rentals::Customer;
    use crate::domain::types::{CustomerId, MovementState, RentalCategory};
    use crate::error::RentalError;
    use crate::storage::MockRentalRepository;
    use chrono::NaiveDate;
    use mockall::predicate::*;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 9, 9)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn rental(category: RentalCategory, is_favorite: bool) -> Rental {
        Rental::new(
            at(10, 0),
            at(18, 0),
            category,
            Customer::new(
                CustomerId::new("customer-42".to_string()),
                "Fleet Ltd".to_string(),
                is_favorite,
            ),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_checkout_persists_exactly_once_after_mutation() {
        let mut repo = MockRentalRepository::new();
        repo.expect_update_rental()
            .withf(|r: &Rental| {
                r.end == at(14, 0) && r.movement == Some(VehicleMovement::checked_out_at(at(5, 30)))
            })
            .times(1)
            .returning(|_| Ok(()));

        let handler = VehicleHandler::new(Arc::new(repo));
        let mut rental = rental(RentalCategory::Garage, false);

        let decision = handler.checkout(&mut rental, at(5, 30)).await.unwrap();
        assert_eq!(
            decision,
            CheckoutDecision::Garage {
                rule: GarageRule::FourMinus,
                end: at(14, 0),
            }
        );
        assert_eq!(rental.movement_state(), MovementState::CheckedOut);
    }

    #[tokio::test]
    async fn test_favorite_still_records_movement() {
        let mut repo = MockRentalRepository::new();
        repo.expect_update_rental().times(1).returning(|_| Ok(()));

        let handler = VehicleHandler::new(Arc::new(repo));
        let mut rental = rental(RentalCategory::Garage, true);

        let decision = handler.checkout(&mut rental, at(5, 0)).await.unwrap();
        assert_eq!(
            decision,
            CheckoutDecision::Unchanged {
                reason: UnchangedReason::FavoriteCustomer,
                end: at(18, 0),
            }
        );
        assert_eq!(rental.end, at(18, 0));
        assert_eq!(rental.movement.unwrap().checkout, at(5, 0));
    }

    #[tokio::test]
    async fn test_storage_failure_propagates_without_rollback() {
        let mut repo = MockRentalRepository::new();
        repo.expect_update_rental()
            .times(1)
            .returning(|_| Err(RentalError::storage("update_rental", "connection reset")));

        let handler = VehicleHandler::new(Arc::new(repo));
        let mut rental = rental(RentalCategory::Private, false);

        let result = handler.checkout(&mut rental, at(8, 0)).await;
        assert!(matches!(result, Err(RentalError::StorageError { .. })));
        assert_eq!(rental.end, at(16, 0));
        assert_eq!(rental.movement.unwrap().checkout, at(8, 0));
    }

    #[tokio::test]
    async fn test_checkout_again_after_end_moved_before_start() {
        let mut repo = MockRentalRepository::new();
        repo.expect_update_rental().times(2).returning(|_| Ok(()));

        let handler = VehicleHandler::new(Arc::new(repo));
        let mut rental = Rental::new(
            at(10, 0),
            at(11, 0),
            RentalCategory::Garage,
            Customer::new(
                CustomerId::new("customer-43".to_string()),
                "Short Hire".to_string(),
                false,
            ),
        )
        .unwrap();

        handler.checkout(&mut rental, at(5, 30)).await.unwrap();
        assert_eq!(rental.end, at(7, 0));
        assert!(rental.end < rental.start);

        let decision = handler.checkout(&mut rental, at(6, 0)).await.unwrap();
        assert_eq!(
            decision,
            CheckoutDecision::Garage {
                rule: GarageRule::FourMinus,
                end: at(3, 0),
            }
        );
        assert_eq!(rental.end, at(3, 0));
        assert_eq!(rental.movement.unwrap().checkout, at(6, 0));
    }

    #[tokio::test]
    async fn test_repeated_checkout_replaces_movement() {
        let mut repo = MockRentalRepository::new();
        repo.expect_update_rental().times(2).returning(|_| Ok(()));

        let handler = VehicleHandler::new(Arc::new(repo));
        let mut rental = rental(RentalCategory::Garage, false);

        handler.checkout(&mut rental, at(7, 30)).await.unwrap();
        assert_eq!(rental.end, at(16, 0));

        // Second checkout is evaluated against the already adjusted end
        handler.checkout(&mut rental, at(9, 0)).await.unwrap();
        assert_eq!(rental.end, at(16, 0));
        assert_eq!(rental.movement.unwrap().checkout, at(9, 0));
    }

    #[tokio::test]
    async fn test_checkin_is_a_no_op() {
        let mut repo = MockRentalRepository::new();
        repo.expect_update_rental().never();
        repo.expect_get_rental().never();

        let handler = VehicleHandler::new(Arc::new(repo));
        let mut rental = rental(RentalCategory::Private, false);
        rental.movement = Some(VehicleMovement::checked_out_at(at(9, 0)));
        let before = rental.clone();

        handler.checkin(&mut rental).await.unwrap();
        assert_eq!(rental, before);
        assert_eq!(rental.movement_state(), MovementState::CheckedOut);
    }

    #[tokio::test]
    async fn test_custom_engine_is_used() {
        let mut repo = MockRentalRepository::new();
        repo.expect_update_rental()
            .with(always())
            .times(1)
            .returning(|_| Ok(()));

        let engine = CheckoutRuleEngine::with_garage_rules(vec![]);
        let handler = VehicleHandler::with_engine(Arc::new(repo), engine);
        let mut rental = rental(RentalCategory::Garage, false);

        handler.checkout(&mut rental, at(5, 0)).await.unwrap();
        assert_eq!(rental.end, at(18, 0));
    }
}
