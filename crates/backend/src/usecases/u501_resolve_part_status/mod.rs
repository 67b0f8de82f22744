pub mod cli;
pub mod digikey_api_client;
pub mod digikey_models;
pub mod error;
pub mod executor;
pub mod progress_tracker;
pub mod snapshot;
pub mod token_cache;

pub use digikey_api_client::{DigiKeyApiClient, LookupOutcome, ProductCatalog, RetryPolicy};
pub use error::ResolveError;
pub use executor::{ResolveExecutor, RunOutcome};
pub use progress_tracker::{ProgressReporter, ProgressTracker, RunHandle};
