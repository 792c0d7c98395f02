//! `rodio`-backed media: previews are downloaded and decoded off-thread, then
//! appended to a paused `Sink` once the event loop polls for them.

use std::io::Cursor;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use super::media::{MediaBackend, MediaHandle};
use super::types::{MediaError, MediaStatus};

type Preview = Decoder<Cursor<Vec<u8>>>;

pub struct RodioBackend {
    stream: Result<OutputStream, String>,
}

impl RodioBackend {
    /// Open the default output device. Failure is remembered and reported on every `open`.
    pub fn new() -> Self {
        let stream = OutputStreamBuilder::open_default_stream()
            .map(|mut stream| {
                // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
                // but noisy for a TUI app.
                stream.log_on_drop(false);
                stream
            })
            .map_err(|e| e.to_string());
        Self { stream }
    }
}

impl MediaBackend for RodioBackend {
    type Handle = RodioHandle;

    fn open(&mut self, url: &str) -> Result<RodioHandle, MediaError> {
        let stream = self
            .stream
            .as_ref()
            .map_err(|e| MediaError::Output(e.clone()))?;

        let sink = Sink::connect_new(stream.mixer());
        sink.pause();

        let (tx, rx) = mpsc::channel();
        let url = url.to_string();
        thread::spawn(move || {
            let _ = tx.send(fetch_preview(&url));
        });

        Ok(RodioHandle::new(sink, rx))
    }
}

fn fetch_preview(url: &str) -> Result<Preview, MediaError> {
    let download = |e: reqwest::Error| MediaError::Download(e.to_string());

    let bytes = reqwest::blocking::get(url)
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.bytes())
        .map_err(download)?;

    decode_preview(bytes.to_vec())
}

/// Decode a fully downloaded preview.
///
/// The byte length lets the decoder estimate the duration of MP3 streams that
/// carry no Xing/Info header.
fn decode_preview(bytes: Vec<u8>) -> Result<Preview, MediaError> {
    let byte_len = bytes.len() as u64;
    Decoder::builder()
        .with_data(Cursor::new(bytes))
        .with_byte_len(byte_len)
        .with_seekable(true)
        .build()
        .map_err(|e| MediaError::Decode(e.to_string()))
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Phase {
    Loading,
    Ready,
    Done,
}

pub struct RodioHandle {
    sink: Sink,
    rx: Receiver<Result<Preview, MediaError>>,
    phase: Phase,
}

impl RodioHandle {
    fn new(sink: Sink, rx: Receiver<Result<Preview, MediaError>>) -> Self {
        Self {
            sink,
            rx,
            phase: Phase::Loading,
        }
    }
}

impl MediaHandle for RodioHandle {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn is_paused(&self) -> bool {
        self.sink.is_paused()
    }

    fn position(&self) -> f64 {
        self.sink.get_pos().as_secs_f64()
    }

    fn poll_status(&mut self) -> Option<MediaStatus> {
        match self.phase {
            Phase::Loading => {
                let status = match self.rx.try_recv() {
                    Ok(Ok(preview)) => {
                        let duration_secs = preview
                            .total_duration()
                            .map_or(f64::NAN, |d| d.as_secs_f64());
                        self.sink.append(preview);
                        self.phase = Phase::Ready;
                        MediaStatus::Ready { duration_secs }
                    }
                    Ok(Err(e)) => {
                        self.phase = Phase::Done;
                        MediaStatus::Failed(e)
                    }
                    Err(TryRecvError::Empty) => return None,
                    Err(TryRecvError::Disconnected) => {
                        self.phase = Phase::Done;
                        MediaStatus::Failed(MediaError::Download(
                            "preview loader exited early".to_string(),
                        ))
                    }
                };
                Some(status)
            }
            Phase::Ready if self.sink.empty() => {
                self.phase = Phase::Done;
                Some(MediaStatus::Finished)
            }
            Phase::Ready | Phase::Done => None,
        }
    }

    fn stop(&mut self) {
        self.sink.stop();
        self.phase = Phase::Done;
    }
}
