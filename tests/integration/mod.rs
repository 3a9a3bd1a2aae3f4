//! Integration tests, router-level

mod api;
mod collab;
