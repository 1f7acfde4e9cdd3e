// Unit tests for chunk buffering and window assembly
//
// These tests verify that fragments are collected in arrival order and that
// a flush atomically takes everything buffered, exactly once.

use polyglot_captions::{AudioFragment, ChunkBuffer, LanguagePair, UploadWindow};

fn fragment(payload: &[u8], timestamp_ms: u64) -> AudioFragment {
    AudioFragment {
        payload: payload.to_vec(),
        timestamp_ms,
    }
}

#[test]
fn test_append_preserves_arrival_order() {
    let mut buffer = ChunkBuffer::new();
    buffer.append(fragment(b"first", 0));
    buffer.append(fragment(b"second", 100));
    buffer.append(fragment(b"third", 200));

    let drained = buffer.drain().expect("buffer should not be empty");
    assert_eq!(drained.len(), 3);
    assert_eq!(drained[0].payload, b"first");
    assert_eq!(drained[1].payload, b"second");
    assert_eq!(drained[2].payload, b"third");
}

#[test]
fn test_drain_empties_the_buffer() {
    let mut buffer = ChunkBuffer::new();
    buffer.append(fragment(b"audio", 0));

    assert!(buffer.drain().is_some());
    assert!(buffer.is_empty());
    assert_eq!(buffer.byte_len(), 0);
    assert!(buffer.drain().is_none());
}

#[test]
fn test_drain_on_empty_buffer_returns_none() {
    let mut buffer = ChunkBuffer::new();
    assert!(buffer.drain().is_none());
}

#[test]
fn test_no_fragment_spans_two_drains() {
    let mut buffer = ChunkBuffer::new();
    buffer.append(fragment(b"aaa", 0));

    let first = buffer.drain().unwrap();
    assert_eq!(first.len(), 1);

    buffer.append(fragment(b"bbb", 100));

    let second = buffer.drain().unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].payload, b"bbb");
}

#[test]
fn test_empty_fragments_are_discarded() {
    let mut buffer = ChunkBuffer::new();
    buffer.append(fragment(b"", 0));

    assert!(buffer.is_empty());
    assert!(buffer.drain().is_none());
}

#[test]
fn test_byte_len_tracks_buffered_payloads() {
    let mut buffer = ChunkBuffer::new();
    buffer.append(fragment(&[0u8; 2000], 0));
    buffer.append(fragment(&[0u8; 2000], 100));

    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer.byte_len(), 4000);
}

#[test]
fn test_window_concatenates_payloads_in_order() {
    let fragments = vec![
        fragment(b"abc", 0),
        fragment(b"def", 100),
        fragment(b"ghi", 200),
    ];

    let window = UploadWindow::from_fragments(7, LanguagePair::new("en", "es"), fragments);

    assert_eq!(window.sequence, 7);
    assert_eq!(window.payload, b"abcdefghi");
    assert_eq!(window.byte_len(), 9);
    assert_eq!(window.languages.from, "en");
    assert_eq!(window.languages.to, "es");
}
