pub mod toml_loader;

pub use toml_loader::{load_sample_catalog, load_sample_catalog_or_empty};
