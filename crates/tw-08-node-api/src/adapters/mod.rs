//! # Adapters Layer

pub mod memory;
pub mod notifier;

pub use memory::InMemoryDatasetCatalogue;
pub use notifier::EventingNotifier;
