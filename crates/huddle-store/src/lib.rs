//! # huddle-store
//!
//! Local persistence for the Huddle workspace.
//!
//! Storage is a plain string key-value contract ([`KeyValueStore`]) with two
//! backends: an SQLite file ([`Database`]) and an in-process map
//! ([`MemoryStore`]).  [`JsonStore`] layers typed JSON records on top, and
//! [`models`] holds every persisted record type.

pub mod database;
pub mod json;
pub mod kv;
pub mod memory;
pub mod migrations;
pub mod models;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use json::JsonStore;
pub use kv::KeyValueStore;
pub use memory::MemoryStore;
pub use models::*;
