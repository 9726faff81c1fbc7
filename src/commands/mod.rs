pub mod cache;
pub mod convert;
pub mod similar;
