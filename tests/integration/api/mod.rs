//! Web tier API integration tests

mod status_proxy_test;
