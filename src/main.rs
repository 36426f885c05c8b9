mod app;
mod audio;
mod config;
mod library;
mod mpris;
mod notify;
mod playback;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
