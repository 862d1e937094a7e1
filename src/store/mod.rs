pub mod results_store;

pub use results_store::{ResultsState, ResultsStore, STORAGE_KEY};
