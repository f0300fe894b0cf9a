//! Shared types, adapter traits, and core utilities for ga4tag.
//!
//! This crate contains the foundational types shared between the core crate,
//! the admin crate, and the storage adapters. The host platform plugs its
//! storage and session handling in through the adapter traits defined here.

pub mod error;
pub mod prelude;
pub mod session_adapter;
pub mod settings_adapter;
pub mod types;
pub mod utils;

// vim: ts=4
