//! HTTP request handlers for the nowcast API.

pub mod common;
pub mod health;
pub mod risk;
