pub mod forecast;
pub mod sma;
pub mod validate;
