//! Positional binary codec for snapshot frames.
//!
//! Fields are written back to back with no tags: header, base snapshot,
//! then the kind's extension. The receiver must know the layout.

use thiserror::Error;

use crate::snapshot::{CharacterId, ExplorerExtension, FrameHeader, NetworkSnapshot, SnapshotFrame, SnapshotLayout};

/// Errors that can occur during encoding/decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("{0} trailing bytes after frame")]
    TrailingBytes(usize),

    #[error("no layout known for character {0:?}")]
    UnknownLayout(CharacterId),
}

/// Encode a frame to bytes.
pub fn encode_frame(frame: &SnapshotFrame) -> Result<Vec<u8>, CodecError> {
    let mut bytes = Vec::with_capacity(estimate_size(frame.layout()));
    bincode::serialize_into(&mut bytes, &frame.header)?;
    bincode::serialize_into(&mut bytes, &frame.base)?;
    if let Some(extension) = &frame.extension {
        bincode::serialize_into(&mut bytes, extension)?;
    }
    Ok(bytes)
}

/// Decode a frame laid out as `layout`. The whole buffer must be consumed.
pub fn decode_frame(bytes: &[u8], layout: SnapshotLayout) -> Result<SnapshotFrame, CodecError> {
    let mut reader = bytes;
    let header: FrameHeader = bincode::deserialize_from(&mut reader)?;
    let base: NetworkSnapshot = bincode::deserialize_from(&mut reader)?;
    let extension = match layout {
        SnapshotLayout::Base => None,
        SnapshotLayout::Explorer => Some(bincode::deserialize_from::<_, ExplorerExtension>(&mut reader)?),
    };
    if !reader.is_empty() {
        return Err(CodecError::TrailingBytes(reader.len()));
    }
    Ok(SnapshotFrame {
        header,
        base,
        extension,
    })
}

/// Encoded size of a frame, for buffer allocation.
pub fn estimate_size(layout: SnapshotLayout) -> usize {
    // header 8, state tag 4, three vectors 24, three flags 3
    let base = 8 + 4 + 24 + 3;
    match layout {
        SnapshotLayout::Base => base,
        SnapshotLayout::Explorer => base + 9,
    }
}
