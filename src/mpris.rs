use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use zbus::object_server::InterfaceRef;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::playback::{MediaType, NowPlaying, NowPlayingSink, PlaybackStatus};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.platter";

/// Commands arriving from media keys and desktop widgets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    /// Relative seek in whole seconds.
    Seek(i64),
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackStatus,
    media_type: MediaType,
    seekable: bool,
    title: Option<String>,
    artist: Vec<String>,
    album: Option<String>,
    url: Option<String>,
    art_url: Option<String>,
    length_micros: Option<i64>,
    position_micros: i64,
    track_id: Option<OwnedObjectPath>,
    last: Option<NowPlaying>,
}

/// Now-playing surface backed by the MPRIS service thread.
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

impl MprisHandle {
    /// Store `now` for the bus interfaces. Returns whether anything besides
    /// the position changed.
    fn store(&self, now: &NowPlaying) -> bool {
        let Ok(mut s) = self.state.lock() else {
            return false;
        };

        let changed = s
            .last
            .as_ref()
            .map(|prev| !prev.same_item_and_status(now))
            .unwrap_or(true);

        s.playback = now.status;
        s.media_type = now.media_type;
        s.position_micros = now.elapsed.as_micros().min(i64::MAX as u128) as i64;
        if changed {
            let loaded = now.asset_url.is_some();
            s.seekable = loaded && !now.is_live_stream;
            s.title = Some(now.title.clone()).filter(|t| loaded && !t.is_empty());
            s.artist = if loaded && !now.artist.is_empty() {
                vec![now.artist.clone()]
            } else {
                Vec::new()
            };
            s.album = now.album.clone().filter(|_| loaded);
            s.url = now.asset_url.clone();
            s.art_url = now.art_url.clone().filter(|_| loaded);
            s.length_micros = now
                .length
                .filter(|_| loaded && !now.is_live_stream)
                .map(|d| d.as_micros().min(i64::MAX as u128) as i64);
            s.track_id = now
                .track_index
                .and_then(|i| ObjectPath::try_from(format!("{OBJECT_PATH}/track/{i}")).ok())
                .map(OwnedObjectPath::from);
        }
        s.last = Some(now.clone());
        changed
    }
}

impl NowPlayingSink for MprisHandle {
    fn publish(&self, now: &NowPlaying) {
        if self.store(now) {
            let _ = self.notify.send(());
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "platter"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        let media_type = self.state.lock().map(|s| s.media_type).unwrap_or_default();
        media_type.mime_types().iter().map(|m| m.to_string()).collect()
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

fn owned(v: Value<'_>) -> Option<OwnedValue> {
    OwnedValue::try_from(v).ok()
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    /// `offset` is in microseconds; sub-second offsets are dropped.
    fn seek(&self, offset: i64) {
        let seconds = offset / 1_000_000;
        if seconds != 0 && self.can_seek() {
            let _ = self.tx.send(ControlCmd::Seek(seconds));
        }
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackStatus::Stopped => "Stopped",
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.state.lock().map(|s| s.position_micros).unwrap_or(0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        self.state.lock().map(|s| s.seekable).unwrap_or(false)
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let mut put = |key: &str, v: Option<OwnedValue>| {
            if let Some(v) = v {
                map.insert(key.to_string(), v);
            }
        };

        let track_id = s
            .track_id
            .clone()
            .map(OwnedObjectPath::into_inner)
            .unwrap_or_else(|| {
                ObjectPath::from_static_str_unchecked("/org/mpris/MediaPlayer2/TrackList/NoTrack")
            });
        put("mpris:trackid", owned(Value::from(track_id)));
        put(
            "xesam:title",
            owned(Value::from(s.title.clone().unwrap_or_default())),
        );
        if !s.artist.is_empty() {
            put("xesam:artist", owned(Value::from(s.artist.clone())));
        }
        if let Some(album) = s.album.clone() {
            put("xesam:album", owned(Value::from(album)));
        }
        if let Some(url) = s.url.clone() {
            put("xesam:url", owned(Value::from(url)));
        }
        if let Some(art) = s.art_url.clone() {
            put("mpris:artUrl", owned(Value::from(art)));
        }
        if let Some(len) = s.length_micros {
            put("mpris:length", owned(Value::from(len)));
        }
        map
    }
}

async fn emit_changes(player: &InterfaceRef<PlayerIface>) -> zbus::Result<()> {
    let emitter = player.signal_emitter();
    let iface = player.get().await;
    iface.playback_status_changed(emitter).await?;
    iface.can_seek_changed(emitter).await?;
    iface.metadata_changed(emitter).await?;
    Ok(())
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    changes: Receiver<()>,
) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let object_server = connection.object_server();
    object_server
        .at(
            OBJECT_PATH,
            RootIface {
                tx: tx.clone(),
                state: state.clone(),
            },
        )
        .await?;
    object_server
        .at(OBJECT_PATH, PlayerIface { tx, state })
        .await?;
    let player = object_server
        .interface::<_, PlayerIface>(OBJECT_PATH)
        .await?;

    log::info!("MPRIS service registered as {BUS_NAME}");

    loop {
        Timer::after(Duration::from_millis(200)).await;

        let mut pending = false;
        loop {
            match changes.try_recv() {
                Ok(()) => pending = true,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        if pending {
            if let Err(e) = emit_changes(&player).await {
                log::warn!("MPRIS: failed to emit PropertiesChanged: {e}");
            }
        }
    }
}

/// Start the MPRIS service on its own thread.
///
/// Bus failures are logged; the player keeps working without MPRIS.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        if let Err(e) = block_on(serve(tx, state_for_thread, notify_rx)) {
            log::warn!("MPRIS unavailable: {e}");
        }
    });

    MprisHandle {
        state,
        notify: notify_tx,
    }
}
