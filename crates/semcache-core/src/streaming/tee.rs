//! The `StreamTee` primitive (spec.md §4.6, §9).
//!
//! A single pump task drives the upstream byte stream to completion and
//! fans each chunk out to two destinations: a bounded `Live` channel the
//! HTTP handler forwards to the client, and a `Capture` channel a second
//! task accumulates into a byte buffer for [`crate::cache::BackgroundWriter`].
//!
//! The pump is the one task actually polling upstream, so it keeps running
//! (for Capture's sake) even after the client disconnects and the Live
//! receiver is dropped — `send` on a dropped receiver just errors, which the
//! pump ignores. Capture uses `try_send` on a bounded channel so a slow or
//! stalled background reader can never add latency to Live: once Capture
//! can't keep up, it self-cancels.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;

/// Capacity of the channel that feeds the live (client-facing) consumer.
/// Bounded so a slow client naturally backpressures the upstream pump (§5:
/// "Live reads drive upstream consumption").
const LIVE_CHANNEL_CAPACITY: usize = 8;

/// Conservative lower bound on a plausible upstream chunk size, used to
/// derive the capture channel's depth from `capture_max_bytes` (see
/// `capture_channel_capacity`) rather than hardcoding a message count
/// independent of the byte cap `tee` is actually given.
const MIN_CHUNK_BYTES_ESTIMATE: usize = 16;

/// Floor and ceiling on the derived depth: never shallower than the live
/// channel, never so deep that a very large `capture_max_bytes` sizes an
/// unreasonable buffer of in-flight messages.
const MIN_CAPTURE_CHANNEL_CAPACITY: usize = LIVE_CHANNEL_CAPACITY;
const MAX_CAPTURE_CHANNEL_CAPACITY: usize = 4096;

/// Depth of the channel that feeds the capture accumulator, in messages.
///
/// Sized off `capture_max_bytes` rather than fixed, so a slow-but-keeping-up
/// capture task is never starved by hitting the channel's message-count
/// bound before the byte cap would bind: at `MIN_CHUNK_BYTES_ESTIMATE` bytes
/// per chunk, this many in-flight messages cover `capture_max_bytes` worth
/// of data, so overflow is always detected as the documented byte-cap
/// overflow rather than a silent channel-full discard.
fn capture_channel_capacity(capture_max_bytes: usize) -> usize {
    (capture_max_bytes / MIN_CHUNK_BYTES_ESTIMATE)
        .clamp(MIN_CAPTURE_CHANNEL_CAPACITY, MAX_CAPTURE_CHANNEL_CAPACITY)
}

pub type UpstreamItem<E> = Result<Bytes, E>;
pub type LiveStream<E> = ReceiverStream<UpstreamItem<E>>;

enum CaptureMsg {
    Data(Bytes),
    End { clean: bool },
}

/// Outcome of the capture side once the pump finishes (or Capture overflows).
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub bytes: Vec<u8>,
    /// `true` iff the upstream stream ended without a transport error and
    /// without a capture overflow (§4.6: "When S ends cleanly, Capture is
    /// marked 'done'").
    pub done: bool,
    pub overflowed: bool,
}

/// Splits `source` into a live stream and a capture handle.
///
/// `capture_max_bytes` is the §4.6 Capture memory cap (default 1 MiB).
pub fn tee<S, E>(
    mut source: S,
    capture_max_bytes: usize,
) -> (LiveStream<E>, JoinHandle<CaptureOutcome>)
where
    S: Stream<Item = UpstreamItem<E>> + Send + Unpin + 'static,
    E: Send + 'static,
{
    let (live_tx, live_rx) = mpsc::channel::<UpstreamItem<E>>(LIVE_CHANNEL_CAPACITY);
    let (capture_tx, mut capture_rx) =
        mpsc::channel::<CaptureMsg>(capture_channel_capacity(capture_max_bytes));

    let capture_handle = tokio::spawn(async move {
        let mut buf = Vec::new();
        let mut overflowed = false;
        let mut clean = false;

        while let Some(msg) = capture_rx.recv().await {
            match msg {
                CaptureMsg::Data(chunk) => {
                    if overflowed {
                        continue;
                    }
                    buf.extend_from_slice(&chunk);
                    if buf.len() > capture_max_bytes {
                        overflowed = true;
                        buf.clear();
                        buf.shrink_to_fit();
                    }
                }
                CaptureMsg::End { clean: c } => {
                    clean = c;
                    break;
                }
            }
        }

        CaptureOutcome {
            bytes: buf,
            done: clean && !overflowed,
            overflowed,
        }
    });

    tokio::spawn(async move {
        let mut capture_closed = false;

        loop {
            match source.next().await {
                Some(Ok(bytes)) => {
                    if !capture_closed
                        && capture_tx
                            .try_send(CaptureMsg::Data(bytes.clone()))
                            .is_err()
                    {
                        capture_closed = true;
                    }
                    // Ignore send errors: the client disconnected, but the
                    // pump must keep draining `source` for Capture's sake.
                    let _ = live_tx.send(Ok(bytes)).await;
                }
                Some(Err(err)) => {
                    if !capture_closed {
                        let _ = capture_tx.try_send(CaptureMsg::End { clean: false });
                    }
                    let _ = live_tx.send(Err(err)).await;
                    return;
                }
                None => {
                    if !capture_closed {
                        let _ = capture_tx.try_send(CaptureMsg::End { clean: true });
                    }
                    return;
                }
            }
        }
    });

    (ReceiverStream::new(live_rx), capture_handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::convert::Infallible;

    #[tokio::test]
    async fn live_receives_every_byte_in_order() {
        let chunks: Vec<UpstreamItem<Infallible>> = vec![
            Ok(Bytes::from_static(b"a")),
            Ok(Bytes::from_static(b"b")),
            Ok(Bytes::from_static(b"c")),
        ];
        let (live, capture) = tee(stream::iter(chunks), 1024);

        let collected: Vec<Bytes> = live.map(|r| r.unwrap()).collect().await;
        assert_eq!(collected, vec![Bytes::from_static(b"a"), Bytes::from_static(b"b"), Bytes::from_static(b"c")]);

        let outcome = capture.await.unwrap();
        assert_eq!(outcome.bytes, b"abc");
        assert!(outcome.done);
        assert!(!outcome.overflowed);
    }

    #[tokio::test]
    async fn capture_continues_after_live_is_dropped() {
        let chunks: Vec<UpstreamItem<Infallible>> = (0..50)
            .map(|_| Ok(Bytes::from_static(b"x")))
            .collect();
        let (live, capture) = tee(stream::iter(chunks), 1024);
        drop(live);

        let outcome = capture.await.unwrap();
        assert_eq!(outcome.bytes.len(), 50);
        assert!(outcome.done);
    }

    #[tokio::test]
    async fn overflow_abandons_capture_without_affecting_live() {
        let chunks: Vec<UpstreamItem<Infallible>> = (0..10)
            .map(|_| Ok(Bytes::from_static(b"0123456789")))
            .collect();
        let (live, capture) = tee(stream::iter(chunks), 50);

        let collected: Vec<Bytes> = live.map(|r| r.unwrap()).collect().await;
        assert_eq!(collected.len(), 10);

        let outcome = capture.await.unwrap();
        assert!(outcome.overflowed);
        assert!(!outcome.done);
        assert!(outcome.bytes.is_empty());
    }

    #[tokio::test]
    async fn many_small_chunks_within_the_byte_cap_do_not_spuriously_overflow() {
        // 500 one-byte chunks against the spec's default 1 MiB cap: nowhere
        // near the byte budget, but more in-flight messages than the old
        // fixed 64-slot capture channel could hold without backing up.
        let chunks: Vec<UpstreamItem<Infallible>> =
            (0..500).map(|_| Ok(Bytes::from_static(b"x"))).collect();
        let (live, capture) = tee(stream::iter(chunks), crate::constants::DEFAULT_CAPTURE_MAX_BYTES);

        let collected: Vec<Bytes> = live.map(|r| r.unwrap()).collect().await;
        assert_eq!(collected.len(), 500);

        let outcome = capture.await.unwrap();
        assert_eq!(outcome.bytes.len(), 500);
        assert!(outcome.done);
        assert!(!outcome.overflowed);
    }

    #[test]
    fn capture_channel_capacity_scales_with_the_byte_cap() {
        assert_eq!(capture_channel_capacity(1024), 64);
        assert_eq!(
            capture_channel_capacity(crate::constants::DEFAULT_CAPTURE_MAX_BYTES),
            MAX_CAPTURE_CHANNEL_CAPACITY
        );
        assert_eq!(capture_channel_capacity(0), MIN_CAPTURE_CHANNEL_CAPACITY);
    }

    #[tokio::test]
    async fn transport_error_marks_capture_not_done() {
        let chunks: Vec<UpstreamItem<&'static str>> =
            vec![Ok(Bytes::from_static(b"partial")), Err("boom")];
        let (live, capture) = tee(stream::iter(chunks), 1024);

        let collected: Vec<_> = live.collect().await;
        assert!(collected[1].is_err());

        let outcome = capture.await.unwrap();
        assert!(!outcome.done);
        assert_eq!(outcome.bytes, b"partial");
    }
}
