pub mod page;
pub mod quote;
