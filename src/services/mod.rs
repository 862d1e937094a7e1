pub mod file_staging;
pub mod result_writer;
pub mod sample_selection;

pub use file_staging::{FileStaging, StageError, StagedFile};
pub use result_writer::{ResultWriter, WriteReport};
pub use sample_selection::SampleSelection;
