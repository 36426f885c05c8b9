use std::thread;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::library::Track;

use super::clock::PlayClock;
use super::engine::Engine;
use super::sink::create_sink_at;
use super::types::{EngineError, ItemId};

struct Loaded {
    id: ItemId,
    track: Track,
    sink: Sink,
    duration: Option<Duration>,
    clock: PlayClock,
    finished_reported: bool,
}

/// `Engine` backed by the default `rodio` output device.
///
/// Each loaded track gets its own `Sink`; end of track is detected by the
/// sink running dry while not paused.
pub struct RodioEngine {
    stream: OutputStream,
    current: Option<Loaded>,
    next_id: u64,
}

impl RodioEngine {
    pub fn open_default() -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            current: None,
            next_id: 0,
        })
    }

    /// Fade the current item out over `fade_out` and unload it.
    pub fn fade_out_and_stop(&mut self, fade_out: Duration) {
        if let Some(cur) = self.current.as_ref() {
            if cur.clock.is_running() {
                fade_out_sink(&cur.sink, fade_out);
            }
        }
        self.stop();
    }
}

fn fade_out_sink(sink: &Sink, fade_out: Duration) {
    let fade_out_ms = fade_out.as_millis() as u64;
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    sink.set_volume(1.0);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(1.0 - t);
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

impl Engine for RodioEngine {
    fn load(&mut self, track: &Track) -> Result<ItemId, EngineError> {
        // Whatever was loaded is gone even if the new file fails to open.
        self.stop();

        let (sink, decoded_len) = create_sink_at(&self.stream, track, Duration::ZERO)?;
        sink.set_volume(1.0);

        self.next_id += 1;
        let id = ItemId(self.next_id);
        log::debug!("loaded {} as {id}", track.path.display());

        self.current = Some(Loaded {
            id,
            track: track.clone(),
            sink,
            duration: decoded_len.or(track.duration),
            clock: PlayClock::default(),
            finished_reported: false,
        });
        Ok(id)
    }

    fn play(&mut self) {
        if let Some(cur) = self.current.as_mut() {
            cur.sink.play();
            cur.clock.start();
        }
    }

    fn pause(&mut self) {
        if let Some(cur) = self.current.as_mut() {
            cur.sink.pause();
            cur.clock.pause();
        }
    }

    fn stop(&mut self) {
        if let Some(cur) = self.current.take() {
            cur.sink.stop();
            log::debug!("unloaded {}", cur.id);
        }
    }

    fn seek(&mut self, position: Duration) -> Result<(), EngineError> {
        let Some(cur) = self.current.as_mut() else {
            return Err(EngineError::NotLoaded);
        };

        // Rebuild the sink and skip into the file.
        let (sink, _) = create_sink_at(&self.stream, &cur.track, position)?;
        let running = cur.clock.is_running();
        cur.sink.stop();

        cur.clock.reset(position);
        if running {
            sink.play();
            cur.clock.start();
        }
        cur.sink = sink;
        cur.finished_reported = false;
        Ok(())
    }

    fn position(&self) -> Duration {
        match self.current.as_ref() {
            Some(cur) => {
                let elapsed = cur.clock.elapsed();
                cur.duration.map_or(elapsed, |d| elapsed.min(d))
            }
            None => Duration::ZERO,
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.current.as_ref().and_then(|cur| cur.duration)
    }

    fn loaded(&self) -> Option<ItemId> {
        self.current.as_ref().map(|cur| cur.id)
    }

    fn take_finished(&mut self) -> Option<ItemId> {
        let cur = self.current.as_mut()?;
        if cur.finished_reported || !cur.clock.is_running() || !cur.sink.empty() {
            return None;
        }
        cur.finished_reported = true;
        cur.clock.pause();
        Some(cur.id)
    }
}
