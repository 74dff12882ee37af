pub mod picker;
pub mod quote_service;
pub mod sanitize;

pub use picker::{CoinFlip, QuoteSource, SourcePicker};
pub use quote_service::QuoteService;
