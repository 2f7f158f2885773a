//! Network state synchronisation between an owning peer and its replicas.
//!
//! This crate provides:
//! - Fixed-order snapshot records and per-kind extensions
//! - A positional binary codec for snapshot frames
//! - Sequence gating and position reconciliation on replicas
//! - Typed peer messages over an in-process channel link
//! - Owner-side publishing and receiver-side dispatch

pub mod codec;
pub mod link;
pub mod message;
pub mod publisher;
pub mod reconcile;
pub mod replica;
pub mod replica_set;
pub mod snapshot;

pub use codec::{decode_frame, encode_frame, CodecError};
pub use link::*;
pub use message::*;
pub use publisher::*;
pub use reconcile::*;
pub use replica::*;
pub use replica_set::*;
pub use snapshot::*;
