//! Haunted Run: a side-scrolling platformer simulation with a terminal renderer.
//!
//! The library holds the whole game: level data, the per-frame [`engine`],
//! and a [`renderer`] that paints onto a cell [`surface`]. The binary only
//! wires a terminal, the keyboard and persistent storage to it.

pub mod arena;
pub mod audio;
pub mod collision;
pub mod config;
pub mod effects;
pub mod engine;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod input;
pub mod levels;
pub mod renderer;
pub mod storage;
pub mod surface;
pub mod timers;
