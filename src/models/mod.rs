pub mod loaders;
pub mod result;
pub mod sample;
pub mod selected_file;

pub use loaders::{load_sample_catalog, load_sample_catalog_or_empty};
pub use result::{data_url, BatchSummary, EntryStatus, PredictResponse, ResultEntry};
pub use sample::{SampleCatalog, SampleImage};
pub use selected_file::{list_files, SelectedFile};
