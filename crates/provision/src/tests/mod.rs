//! Scenario tests for the provisioning run.

mod http_fetch;
mod support;
