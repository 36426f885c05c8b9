use std::time::Duration;

use crate::library::Track;

use super::types::{EngineError, ItemId};

/// Operations the playback controller needs from an audio backend.
///
/// Only one item is loaded at a time. Loading a new item invalidates the
/// previous one: its end-of-track event is never reported afterwards.
pub trait Engine {
    /// Replace the current item with `track`, paused at its start.
    fn load(&mut self, track: &Track) -> Result<ItemId, EngineError>;

    /// Resume the loaded item. No-op when nothing is loaded.
    fn play(&mut self);

    /// Pause the loaded item. No-op when nothing is loaded.
    fn pause(&mut self);

    /// Stop and unload the current item.
    fn stop(&mut self);

    /// Move the loaded item to `position`, keeping its paused/playing state.
    fn seek(&mut self, position: Duration) -> Result<(), EngineError>;

    /// Playback position of the loaded item (zero when nothing is loaded).
    fn position(&self) -> Duration;

    /// Total length of the loaded item, if known.
    fn duration(&self) -> Option<Duration>;

    /// Id of the loaded item, if any.
    fn loaded(&self) -> Option<ItemId>;

    /// One-shot end-of-track event: returns the id of the loaded item once
    /// after it has played to the end.
    fn take_finished(&mut self) -> Option<ItemId>;
}
