// ABOUTME: Library crate for firm-intake exposing the wizard engine for the CLI and tests

#![allow(missing_docs)]

pub mod config;
pub mod models;
pub mod payload;
pub mod schema;
pub mod submission;
pub mod wizard;
