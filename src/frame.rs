//! Frame extraction from raw capture streams.
//!
//! STK500v1 is a half-duplex request/response protocol over a serial link:
//!
//! ```text
//! Commands  (host -> device): <opcode> [params...] <EOP=0x20>
//! Responses (device -> host): <INSYNC=0x14> [payload...] <OK=0x10 | FAILED=0x11>
//! ```
//!
//! The framer splits each captured stream into [`Frame`]s by scanning for the
//! markers. Captures are rarely clean: the host may be killed mid-command, the
//! device may emit stray bytes after a desync. Nothing is silently dropped:
//! trailing bytes without a terminator become a [`FrameKind::Truncated`] frame,
//! and device-stream bytes outside any frame are recorded as [`NoiseRun`]s.
//! Concatenating the frames (plus noise runs for the response stream) in order
//! reproduces the input byte for byte.

/// First byte of every response frame (`Resp_STK_INSYNC`).
pub const INSYNC: u8 = 0x14;
/// Success terminator of a response frame (`Resp_STK_OK`).
pub const OK: u8 = 0x10;
/// Failure terminator of a response frame (`Resp_STK_FAILED`).
pub const FAILED: u8 = 0x11;
/// Lone not-in-sync reply (`Resp_STK_NOSYNC`); never part of a frame.
pub const NOSYNC: u8 = 0x15;
/// Terminator of every command frame (`Sync_CRC_EOP`).
pub const EOP: u8 = 0x20;

/// Which capture stream a frame was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    HostToDevice,
    DeviceToHost,
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stream::HostToDevice => write!(f, "command"),
            Stream::DeviceToHost => write!(f, "response"),
        }
    }
}

/// Whether a frame reached its terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// The frame ends with its terminator marker.
    Complete,
    /// The stream ended (or the next frame began) before a terminator was seen.
    Truncated,
}

/// A contiguous byte run extracted from one capture stream.
///
/// Frames borrow the caller's capture buffer and are never mutated; the
/// decoding layers hold a `Frame` and derive from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub stream: Stream,
    /// Byte offset of the frame's first byte in its stream.
    pub offset: usize,
    pub bytes: &'a [u8],
    pub kind: FrameKind,
}

/// Bytes in the response stream that belong to no frame (before the first
/// sync marker, or between frames). Counted, never silently skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseRun<'a> {
    pub offset: usize,
    pub bytes: &'a [u8],
}

/// Full partition of a device-to-host capture: frames plus noise runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseScan<'a> {
    pub frames: Vec<Frame<'a>>,
    pub noise: Vec<NoiseRun<'a>>,
}

impl ResponseScan<'_> {
    /// Total number of noise bytes across all runs.
    pub fn noise_bytes(&self) -> usize {
        self.noise.iter().map(|n| n.bytes.len()).sum()
    }
}

/// Split a host-to-device capture into command frames.
///
/// A frame closes at each EOP marker. Trailing bytes with no terminator are
/// emitted as a final [`FrameKind::Truncated`] frame. The returned frames
/// partition the input exactly.
pub fn frame_commands(input: &[u8]) -> Vec<Frame<'_>> {
    let mut frames = Vec::new();
    let mut start = 0;
    for (i, &b) in input.iter().enumerate() {
        if b == EOP {
            frames.push(Frame {
                stream: Stream::HostToDevice,
                offset: start,
                bytes: &input[start..=i],
                kind: FrameKind::Complete,
            });
            start = i + 1;
        }
    }
    if start < input.len() {
        frames.push(Frame {
            stream: Stream::HostToDevice,
            offset: start,
            bytes: &input[start..],
            kind: FrameKind::Truncated,
        });
    }
    frames
}

/// Split a device-to-host capture into response frames and noise runs.
///
/// A frame opens at INSYNC and closes at the first OK or FAILED marker. If
/// another INSYNC appears first, the open frame is emitted as
/// [`FrameKind::Truncated`] and the scan resumes at the new sync marker, so no
/// byte is counted twice. A dangling frame at end of stream is likewise
/// emitted truncated. Bytes outside any frame are recorded as [`NoiseRun`]s.
pub fn frame_responses(input: &[u8]) -> ResponseScan<'_> {
    let mut frames = Vec::new();
    let mut noise = Vec::new();
    let mut i = 0;
    while i < input.len() {
        let run_start = i;
        while i < input.len() && input[i] != INSYNC {
            i += 1;
        }
        if i > run_start {
            noise.push(NoiseRun {
                offset: run_start,
                bytes: &input[run_start..i],
            });
        }
        if i >= input.len() {
            break;
        }

        let start = i;
        i += 1;
        let mut kind = FrameKind::Truncated;
        while i < input.len() {
            match input[i] {
                OK | FAILED => {
                    i += 1;
                    kind = FrameKind::Complete;
                    break;
                }
                INSYNC => break,
                _ => i += 1,
            }
        }
        frames.push(Frame {
            stream: Stream::DeviceToHost,
            offset: start,
            bytes: &input[start..i],
            kind,
        });
    }
    ResponseScan { frames, noise }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_trailing_bytes_are_truncated() {
        let frames = frame_commands(&[0x30, 0x20, 0x55, 0x00]);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].kind, FrameKind::Complete);
        assert_eq!(frames[1].kind, FrameKind::Truncated);
        assert_eq!(frames[1].bytes, &[0x55, 0x00]);
        assert_eq!(frames[1].offset, 2);
    }

    #[test]
    fn responses_sync_before_terminator_splits_frames() {
        let scan = frame_responses(&[INSYNC, INSYNC, OK]);
        assert_eq!(scan.frames.len(), 2);
        assert_eq!(scan.frames[0].kind, FrameKind::Truncated);
        assert_eq!(scan.frames[0].bytes, &[INSYNC]);
        assert_eq!(scan.frames[1].kind, FrameKind::Complete);
        assert_eq!(scan.frames[1].bytes, &[INSYNC, OK]);
        assert!(scan.noise.is_empty());
    }

    #[test]
    fn responses_failed_terminator_closes_frame() {
        let scan = frame_responses(&[INSYNC, FAILED]);
        assert_eq!(scan.frames.len(), 1);
        assert_eq!(scan.frames[0].kind, FrameKind::Complete);
    }
}
