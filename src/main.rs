mod app;
mod catalog;
mod config;
mod cover;
mod events;
mod format;
mod playback;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
