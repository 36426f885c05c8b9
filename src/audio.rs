//! Audio engine adapter.
//!
//! The playback controller talks to audio output only through the [`Engine`]
//! trait. [`RodioEngine`] implements it on top of a `rodio` output stream.

mod clock;
mod engine;
mod rodio_engine;
mod sink;
mod types;

pub use engine::Engine;
pub use rodio_engine::RodioEngine;
pub use types::{EngineError, ItemId};
