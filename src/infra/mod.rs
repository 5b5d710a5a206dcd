pub mod csv;
pub mod store;
