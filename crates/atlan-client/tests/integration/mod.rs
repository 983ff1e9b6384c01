pub mod common;

mod asset_helper_tests;
mod http_connector_tests;
mod search_tests;
