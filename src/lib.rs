//! Client library and CLI for the financial document analyzer backend.

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod flows;
pub mod utils;
