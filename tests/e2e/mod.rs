//! End-to-end tests against a live listener

mod app_suite;
mod socket_suite;
