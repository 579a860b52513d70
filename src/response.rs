//! Response validation: structural checks against the sync/terminator
//! contract, outcome classification, and the payload-length check implied by
//! the paired command.

use crate::command::DecodedCommand;
use crate::frame::{Frame, FrameKind, FAILED, INSYNC, OK};

/// Classification of a response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Sync present, OK terminator.
    Ok,
    /// Structure intact, but the device answered with the failure marker.
    Failed,
    /// Sync byte missing, or terminator missing/truncated.
    Malformed,
}

/// A response frame after validation. References exactly one source
/// [`Frame`] and never outlives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedResponse<'a> {
    pub frame: Frame<'a>,
    /// First byte is the INSYNC marker.
    pub sync_ok: bool,
    /// Bytes between sync and terminator (best effort on malformed frames:
    /// whatever lies after a sync byte, before a terminator if one exists).
    pub payload: &'a [u8],
    /// Last byte is OK or the recognized failure marker.
    pub terminator_ok: bool,
    pub outcome: Outcome,
    /// Payload length disagrees with what the paired command implies.
    /// Independent of `outcome`: a structurally clean READ_SIGN reply with a
    /// short signature is `Ok` with this flag set.
    pub length_mismatch: bool,
}

/// Validate one response frame against the command it answers, if any.
///
/// An orphan response (no paired command) still gets the structural checks;
/// only the payload-length check needs the command.
pub fn validate<'a>(
    frame: Frame<'a>,
    command: Option<&DecodedCommand<'_>>,
) -> DecodedResponse<'a> {
    let bytes = frame.bytes;
    let sync_ok = bytes.first() == Some(&INSYNC);
    let terminator = match frame.kind {
        FrameKind::Complete => bytes.last().copied(),
        FrameKind::Truncated => None,
    };
    let terminator_ok = matches!(terminator, Some(OK) | Some(FAILED));

    let start = usize::from(sync_ok);
    let end = bytes.len() - usize::from(terminator_ok);
    let payload = if start <= end { &bytes[start..end] } else { &bytes[0..0] };

    let outcome = if !sync_ok || !terminator_ok {
        Outcome::Malformed
    } else if terminator == Some(FAILED) {
        Outcome::Failed
    } else {
        Outcome::Ok
    };

    // Length check only applies to clean success replies; the expected sizes
    // in the schema table describe OK payloads.
    let length_mismatch = outcome == Outcome::Ok
        && command
            .and_then(|c| c.expected_response_len())
            .is_some_and(|expected| payload.len() != expected);

    DecodedResponse {
        frame,
        sync_ok,
        payload,
        terminator_ok,
        outcome,
        length_mismatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Stream;

    fn rsp_frame(bytes: &[u8], kind: FrameKind) -> Frame<'_> {
        Frame {
            stream: Stream::DeviceToHost,
            offset: 0,
            bytes,
            kind,
        }
    }

    #[test]
    fn failed_marker_classifies_failed() {
        let rsp = validate(rsp_frame(&[INSYNC, FAILED], FrameKind::Complete), None);
        assert_eq!(rsp.outcome, Outcome::Failed);
        assert!(rsp.sync_ok);
        assert!(rsp.terminator_ok);
        assert!(rsp.payload.is_empty());
    }

    #[test]
    fn truncated_frame_is_malformed() {
        let rsp = validate(rsp_frame(&[INSYNC, 0x00, 0x00], FrameKind::Truncated), None);
        assert_eq!(rsp.outcome, Outcome::Malformed);
        assert!(!rsp.terminator_ok);
        assert_eq!(rsp.payload, &[0x00, 0x00]);
    }

    #[test]
    fn missing_sync_is_malformed_even_with_terminator() {
        let rsp = validate(rsp_frame(&[0x42, OK], FrameKind::Complete), None);
        assert_eq!(rsp.outcome, Outcome::Malformed);
        assert!(!rsp.sync_ok);
        assert!(rsp.terminator_ok);
    }
}
