use crate::domain::{rentals::Rental, types::RentalId};
use crate::error::{RentalError, Result};
use crate::storage::rentals::RentalRepository;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;

/// Keeps every rental in a single JSON document.
///
/// The whole file is read and rewritten on each mutation. Writes go to a
/// sibling temporary file first and are renamed into place.
pub struct JsonFileRentalRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileRentalRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<Rental>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(RentalError::storage("load_rentals", e)),
        }
    }

    async fn store(&self, rentals: &[Rental]) -> Result<()> {
        let json = serde_json::to_vec_pretty(rentals)?;
        let tmp_path = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|e| RentalError::storage("store_rentals", e))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| RentalError::storage("store_rentals", e))?;

        debug!(path = %self.path.display(), count = rentals.len(), "rentals written");
        Ok(())
    }
}

#[async_trait]
impl RentalRepository for JsonFileRentalRepository {
    async fn create_rental(&self, rental: &Rental) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut rentals = self.load().await?;
        if rentals.iter().any(|r| r.id == rental.id) {
            return Err(RentalError::storage(
                "create_rental",
                format!("rental {} already exists", rental.id),
            ));
        }
        rentals.push(rental.clone());
        self.store(&rentals).await
    }

    async fn get_rental(&self, id: &RentalId) -> Result<Option<Rental>> {
        let rentals = self.load().await?;
        Ok(rentals.into_iter().find(|r| r.id == *id))
    }

    async fn update_rental(&self, rental: &Rental) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut rentals = self.load().await?;
        let stored = rentals
            .iter_mut()
            .find(|r| r.id == rental.id)
            .ok_or_else(|| RentalError::RentalNotFound {
                id: rental.id.to_string(),
            })?;
        *stored = rental.clone();
        self.store(&rentals).await
    }
}
