//! Configuration management.
//!
//! Index-file conventions ([`settings::IndexConfig`]) are stored in a TOML
//! file and loaded with [`settings::Config::load`].

pub mod settings;
