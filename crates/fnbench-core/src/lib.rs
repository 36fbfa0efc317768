pub mod catalog;
pub mod engine;
pub mod errors;
pub mod model;
pub mod providers;
pub mod selector;
pub mod storage;
