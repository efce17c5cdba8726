mod check_tests;
mod config_tests;
mod store_tests;
pub mod utils;
