pub mod load_service;
pub mod merge_service;
pub mod table_service;
