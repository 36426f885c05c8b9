//! Playback sequencing and position reporting.
//!
//! [`PlaybackController`] owns the current playlist and drives an
//! [`Engine`](crate::audio::Engine); [`NowPlaying`] is the payload it pushes
//! to the desktop after every change.

mod controller;
mod now_playing;
mod progress;

pub use controller::PlaybackController;
pub use now_playing::{MediaType, NowPlaying, NowPlayingSink, PlaybackSnapshot, PlaybackStatus};
pub use progress::{Progress, duration_from_secs_f64, format_mmss};
