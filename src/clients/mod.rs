pub mod predict_client;
pub mod transport;

pub use predict_client::{build_file_batch, progress, PredictClient};
pub use transport::{FileBatch, FilePart, HttpTransport, PredictTransport};
