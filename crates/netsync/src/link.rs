//! In-process peer link over crossbeam channels.
//!
//! Each end can send without blocking and drains whatever has arrived at
//! the start of its own tick, so messages never land mid-tick.

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::message::PeerMessage;

/// One end of a bidirectional link.
#[derive(Debug)]
pub struct PeerLink {
    tx: Sender<PeerMessage>,
    rx: Receiver<PeerMessage>,
}

impl PeerLink {
    /// Two connected ends.
    pub fn pair() -> (PeerLink, PeerLink) {
        let (a_tx, b_rx) = crossbeam_channel::unbounded();
        let (b_tx, a_rx) = crossbeam_channel::unbounded();
        (PeerLink { tx: a_tx, rx: a_rx }, PeerLink { tx: b_tx, rx: b_rx })
    }

    /// Queue a message for the other end. Returns false once it is gone.
    pub fn send(&self, message: PeerMessage) -> bool {
        match self.tx.send(message) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Peer disconnected, dropped {:?}", err.into_inner().character());
                false
            }
        }
    }

    /// Everything received so far, in arrival order.
    pub fn drain(&self) -> Vec<PeerMessage> {
        let mut messages = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(message) => messages.push(message),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::debug!("Peer link closed");
                    break;
                }
            }
        }
        messages
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
