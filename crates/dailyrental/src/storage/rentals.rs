use crate::domain::{rentals::Rental, types::RentalId};
use crate::error::{RentalError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Persistence collaborator for rentals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RentalRepository: Send + Sync {
    async fn create_rental(&self, rental: &Rental) -> Result<()>;
    async fn get_rental(&self, id: &RentalId) -> Result<Option<Rental>>;
    async fn update_rental(&self, rental: &Rental) -> Result<()>;
}

/// In-memory repository for development/testing
#[derive(Default)]
pub struct InMemoryRentalRepository {
    rentals: Arc<RwLock<HashMap<RentalId, Rental>>>,
}

impl InMemoryRentalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rentals.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rentals.read().await.is_empty()
    }
}

#[async_trait]
impl RentalRepository for InMemoryRentalRepository {
    async fn create_rental(&self, rental: &Rental) -> Result<()> {
        let mut rentals = self.rentals.write().await;
        if rentals.contains_key(&rental.id) {
            return Err(RentalError::storage(
                "create_rental",
                format!("rental {} already exists", rental.id),
            ));
        }
        rentals.insert(rental.id, rental.clone());
        Ok(())
    }

    async fn get_rental(&self, id: &RentalId) -> Result<Option<Rental>> {
        let rentals = self.rentals.read().await;
        Ok(rentals.get(id).cloned())
    }

    async fn update_rental(&self, rental: &Rental) -> Result<()> {
        let mut rentals = self.rentals.write().await;
        let stored = rentals
            .get_mut(&rental.id)
            .ok_or_else(|| RentalError::RentalNotFound {
                id: rental.id.to_string(),
            })?;
        *stored = rental.clone();
        Ok(())
    }
}
