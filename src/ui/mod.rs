pub mod panels;
pub mod plot;
pub mod regression;
pub mod table;
