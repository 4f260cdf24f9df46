pub mod extractor;

pub use extractor::{extract, FetchKind};
