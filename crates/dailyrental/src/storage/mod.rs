pub mod json_file;
pub mod rentals;

pub use json_file::JsonFileRentalRepository;
pub use rentals::{InMemoryRentalRepository, RentalRepository};

#[cfg(test)]
pub use rentals::MockRentalRepository;
