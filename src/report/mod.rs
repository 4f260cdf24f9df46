pub mod layout;
pub mod pdf;
pub mod text;

pub use pdf::PdfReport;
pub use text::TextReport;
