//! Core protocol types: configuration and identity.

pub mod config;
