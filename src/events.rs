//! In-process publish/subscribe between the track list and the player.
//!
//! Each subscriber gets its own `mpsc` receiver; publishing clones the event
//! into every live subscriber and forgets the ones whose receiver was dropped.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::catalog::Track;

/// Events flowing from the UI to interested components.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The user activated a row; carries the same `Arc` the list holds.
    TrackSelected(Arc<Track>),
}

pub struct EventBus<E> {
    subscribers: Vec<Sender<E>>,
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Register a new subscriber. Events published from now on are delivered to it.
    pub fn subscribe(&mut self) -> Receiver<E> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver `event` to every subscriber, dropping disconnected ones.
    /// Returns how many subscribers received it.
    pub fn publish(&mut self, event: E) -> usize {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        self.subscribers.len()
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}
