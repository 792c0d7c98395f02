//! Best-effort album cover thumbnails.
//!
//! A terminal cannot show the JPEG itself, so each cover is reduced to its
//! average colour and drawn as a small swatch next to the row. Any failure
//! along the way just leaves the swatch empty.

use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use log::debug;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Result of one cover load, keyed by track id.
#[derive(Debug, Clone)]
pub struct CoverUpdate {
    pub id: u64,
    pub colour: Option<Rgb>,
}

/// Average colour of an encoded image, or `None` if it cannot be decoded.
pub fn average_colour(bytes: &[u8]) -> Option<Rgb> {
    let img = image::load_from_memory(bytes).ok()?.to_rgb8();
    let pixels = u64::from(img.width()) * u64::from(img.height());
    if pixels == 0 {
        return None;
    }

    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    for p in img.pixels() {
        r += u64::from(p[0]);
        g += u64::from(p[1]);
        b += u64::from(p[2]);
    }
    Some(Rgb(
        (r / pixels) as u8,
        (g / pixels) as u8,
        (b / pixels) as u8,
    ))
}

fn load(url: &str) -> Result<Vec<u8>, reqwest::Error> {
    let resp = reqwest::blocking::get(url)?.error_for_status()?;
    Ok(resp.bytes()?.to_vec())
}

/// Fetch the cover at `url` on a background thread and report its colour to `tx`.
pub fn spawn_cover_load(id: u64, url: String, tx: Sender<CoverUpdate>) -> JoinHandle<()> {
    thread::spawn(move || {
        let colour = match load(&url) {
            Ok(bytes) => {
                let colour = average_colour(&bytes);
                if colour.is_none() {
                    debug!("cover for track {id} is not a decodable image");
                }
                colour
            }
            Err(e) => {
                debug!("cover for track {id} failed to load: {e}");
                None
            }
        };
        let _ = tx.send(CoverUpdate { id, colour });
    })
}
