// src/lib.rs

//! stove-notify Library
//!
//! Watches the STOVE store for games that are temporarily free and posts a
//! webhook notification for each one the first time it shows up. Seen
//! listings are remembered in a JSON table between runs.
//!
//! Runs are single-pass and meant to be started by an external scheduler;
//! two runs must never overlap (see [`storage`]).

pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
