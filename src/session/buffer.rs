use crate::audio::AudioFragment;

use super::config::LanguagePair;

/// Accumulates raw audio fragments between flush points.
///
/// Fragments are appended in arrival order; a flush atomically takes the
/// entire buffered sequence and leaves the buffer empty. A fragment is never
/// part of two flushes and none is dropped while the buffer is non-empty at
/// flush time. Only ever touched from the session's driver task.
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    fragments: Vec<AudioFragment>,
    byte_len: usize,
}

impl ChunkBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment. Empty payloads are discarded.
    pub fn append(&mut self, fragment: AudioFragment) {
        if fragment.payload.is_empty() {
            return;
        }
        self.byte_len += fragment.payload.len();
        self.fragments.push(fragment);
    }

    /// Atomically take all buffered fragments, leaving the buffer empty.
    ///
    /// Returns `None` when nothing is buffered so callers never build an
    /// empty upload window.
    pub fn drain(&mut self) -> Option<Vec<AudioFragment>> {
        if self.fragments.is_empty() {
            return None;
        }
        self.byte_len = 0;
        Some(std::mem::take(&mut self.fragments))
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Total payload bytes currently buffered
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

/// One flushed unit: the concatenated audio of a single window, its language
/// pair, and a monotonically increasing sequence number.
#[derive(Debug, Clone)]
pub struct UploadWindow {
    pub sequence: u64,
    pub languages: LanguagePair,
    pub payload: Vec<u8>,
}

impl UploadWindow {
    /// Build a window by concatenating fragment payloads in buffer order
    pub fn from_fragments(
        sequence: u64,
        languages: LanguagePair,
        fragments: Vec<AudioFragment>,
    ) -> Self {
        let total: usize = fragments.iter().map(|f| f.payload.len()).sum();
        let mut payload = Vec::with_capacity(total);
        for fragment in &fragments {
            payload.extend_from_slice(&fragment.payload);
        }

        Self {
            sequence,
            languages,
            payload,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.payload.len()
    }
}
