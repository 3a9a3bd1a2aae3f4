//! Collaboration service integration tests

mod service_test;
