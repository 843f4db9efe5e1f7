pub mod date;
pub mod xml;
