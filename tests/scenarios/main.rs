//! Scenario-based tests for taxopipe

#[path = "../helpers.rs"]
mod helpers;

mod fail_fast;
mod success_chain;
