//! Preview session: cut-line editing plus background compositing
//!
//! A session owns one source image, its [`SliceEditor`] and the current target
//! size. Compositing and PNG encoding run on a worker thread so the caller
//! stays responsive. Only one request may be in flight at a time, and every
//! result carries the [`RequestId`] that produced it. At most one finished
//! preview is retained; a newer one replaces it.

use image::RgbaImage;
use std::fmt;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use thiserror::Error;

use crate::compositor::{composite_with, CompositeOptions, Warning};
use crate::editor::{EditorSettings, SliceEditor};
use crate::models::{CutLines, TargetSize};
use crate::output::{encode_png, OutputError};

/// Identifies one compositing request within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Session errors. All are recoverable; the session stays usable.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A request is already in flight
    #[error("render request {0} is still in progress")]
    Busy(RequestId),
    /// Nothing to wait for
    #[error("no render request is pending")]
    NoPending,
    /// The source was replaced while the request was rendering
    #[error("render request {0} was made for a source that has since been replaced")]
    Superseded(RequestId),
    /// Worker exited without reporting a result
    #[error("render worker for request {0} stopped unexpectedly")]
    Disconnected(RequestId),
    /// Encoding the output failed; the request can be retried
    #[error("encoding request {request} failed: {source}")]
    Encode {
        request: RequestId,
        #[source]
        source: OutputError,
    },
}

/// A finished render: the composited image and its encoded PNG.
#[derive(Debug, Clone)]
pub struct RenderedPreview {
    pub request: RequestId,
    /// Lines and target the image was rendered with
    pub lines: CutLines,
    pub target: TargetSize,
    pub image: RgbaImage,
    pub png: Vec<u8>,
    pub warnings: Vec<Warning>,
}

type WorkerResult = Result<RenderedPreview, OutputError>;

struct Pending {
    id: RequestId,
    generation: u64,
    rx: Receiver<WorkerResult>,
}

/// Interactive preview state for one source image.
pub struct PreviewSession {
    source: Arc<RgbaImage>,
    editor: SliceEditor,
    target: TargetSize,
    options: CompositeOptions,
    next_id: u64,
    /// Bumped on every source replacement
    generation: u64,
    pending: Option<Pending>,
    latest: Option<RenderedPreview>,
}

impl PreviewSession {
    /// Start a session with default editor settings and compositing options.
    ///
    /// Lines start at the default thirds and the target at the source size.
    pub fn new(source: RgbaImage) -> Self {
        Self::with_options(source, EditorSettings::default(), CompositeOptions::default())
    }

    pub fn with_options(
        source: RgbaImage,
        settings: EditorSettings,
        options: CompositeOptions,
    ) -> Self {
        let (width, height) = source.dimensions();
        Self {
            source: Arc::new(source),
            editor: SliceEditor::with_settings(width, height, settings),
            target: TargetSize::new(width, height),
            options,
            next_id: 0,
            generation: 0,
            pending: None,
            latest: None,
        }
    }

    pub fn source(&self) -> &RgbaImage {
        &self.source
    }

    /// Replace the source image; lines and target reset to their defaults.
    ///
    /// The retained preview is dropped. A request already in flight still
    /// occupies the session until it is collected, but its output is
    /// discarded: [`poll`](Self::poll) reports nothing and
    /// [`wait`](Self::wait) fails with [`SessionError::Superseded`].
    pub fn replace_source(&mut self, source: RgbaImage) {
        let (width, height) = source.dimensions();
        let settings = *self.editor.settings();
        self.generation += 1;
        self.source = Arc::new(source);
        self.editor = SliceEditor::with_settings(width, height, settings);
        self.target = TargetSize::new(width, height);
        self.latest = None;
    }

    pub fn editor(&self) -> &SliceEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut SliceEditor {
        &mut self.editor
    }

    pub fn target(&self) -> TargetSize {
        self.target
    }

    pub fn set_target(&mut self, target: TargetSize) {
        self.target = target;
    }

    pub fn options(&self) -> &CompositeOptions {
        &self.options
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Most recent finished preview, if any.
    pub fn latest(&self) -> Option<&RenderedPreview> {
        self.latest.as_ref()
    }

    /// Hand the most recent preview to the caller.
    pub fn take_latest(&mut self) -> Option<RenderedPreview> {
        self.latest.take()
    }

    /// Start compositing the current lines and target on a worker thread.
    ///
    /// Fails with [`SessionError::Busy`] while a previous request is pending.
    pub fn request_render(&mut self) -> Result<RequestId, SessionError> {
        if let Some(pending) = &self.pending {
            return Err(SessionError::Busy(pending.id));
        }

        self.next_id += 1;
        let id = RequestId(self.next_id);
        let source = Arc::clone(&self.source);
        let lines = self.editor.lines();
        let target = self.target;
        let options = self.options;
        let (tx, rx) = channel();

        log::debug!("session: request {} ({} -> {})", id, lines, target);
        thread::spawn(move || {
            let (image, warnings) = composite_with(&source, &lines, target, &options);
            let result = encode_png(&image).map(|png| RenderedPreview {
                request: id,
                lines,
                target,
                image,
                png,
                warnings,
            });
            // Receiver gone means the session was dropped; nothing to report
            let _ = tx.send(result);
        });

        self.pending = Some(Pending { id, generation: self.generation, rx });
        Ok(id)
    }

    /// Check for a finished request without blocking.
    ///
    /// Returns the id of a request that just completed (its preview is now
    /// [`latest`](Self::latest)), or `None` if nothing finished yet or the
    /// finished request belonged to a replaced source.
    pub fn poll(&mut self) -> Result<Option<RequestId>, SessionError> {
        let Some(pending) = &self.pending else {
            return Ok(None);
        };
        match pending.rx.try_recv() {
            Ok(result) => match self.finish(result) {
                Ok(id) => Ok(Some(id)),
                Err(SessionError::Superseded(_)) => Ok(None),
                Err(e) => Err(e),
            },
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                let id = pending.id;
                self.pending = None;
                Err(SessionError::Disconnected(id))
            }
        }
    }

    /// Block until the pending request finishes.
    pub fn wait(&mut self) -> Result<&RenderedPreview, SessionError> {
        let Some(pending) = &self.pending else {
            return Err(SessionError::NoPending);
        };
        let result = match pending.rx.recv() {
            Ok(result) => result,
            Err(_) => {
                let id = pending.id;
                self.pending = None;
                return Err(SessionError::Disconnected(id));
            }
        };
        self.finish(result)?;
        self.latest.as_ref().ok_or(SessionError::NoPending)
    }

    fn finish(&mut self, result: WorkerResult) -> Result<RequestId, SessionError> {
        let Some(pending) = self.pending.take() else {
            return Err(SessionError::NoPending);
        };
        let id = pending.id;
        if pending.generation != self.generation {
            log::debug!("session: dropping request {} rendered from a replaced source", id);
            return Err(SessionError::Superseded(id));
        }
        match result {
            Ok(preview) => {
                log::debug!(
                    "session: request {} done ({} bytes, {} warning(s))",
                    id,
                    preview.png.len(),
                    preview.warnings.len()
                );
                self.latest = Some(preview);
                Ok(id)
            }
            Err(source) => {
                log::warn!("session: request {} failed: {}", id, source);
                Err(SessionError::Encode { request: id, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineId;
    use image::Rgba;
    use std::time::{Duration, Instant};

    fn session_90() -> PreviewSession {
        PreviewSession::new(RgbaImage::from_pixel(90, 90, Rgba([40, 80, 120, 255])))
    }

    #[test]
    fn test_defaults_follow_source() {
        let session = session_90();
        assert_eq!(session.target(), TargetSize::new(90, 90));
        assert_eq!(session.editor().lines(), CutLines::new(30, 60, 30, 60));
        assert!(!session.is_pending());
        assert!(session.latest().is_none());
    }

    #[test]
    fn test_render_and_wait() {
        let mut session = session_90();
        session.set_target(TargetSize::new(150, 120));
        let id = session.request_render().unwrap();

        let preview = session.wait().unwrap();
        assert_eq!(preview.request, id);
        assert_eq!(preview.image.dimensions(), (150, 120));
        assert_eq!(&preview.png[1..4], b"PNG");
        assert!(!session.is_pending());
    }

    #[test]
    fn test_second_request_while_pending_is_busy() {
        let mut session = session_90();
        let first = session.request_render().unwrap();
        match session.request_render() {
            Err(SessionError::Busy(id)) => assert_eq!(id, first),
            other => panic!("expected Busy, got {:?}", other.map(|_| ())),
        }
        session.wait().unwrap();

        let second = session.request_render().unwrap();
        assert!(second > first);
        assert_eq!(session.wait().unwrap().request, second);
    }

    #[test]
    fn test_result_records_request_inputs() {
        let mut session = session_90();
        session.editor_mut().move_line(LineId::Vertical1, 20);
        session.request_render().unwrap();
        // Edits after the request do not affect it
        session.editor_mut().move_line(LineId::Vertical1, 40);

        let preview = session.wait().unwrap();
        assert_eq!(preview.lines.vertical1, 20);
    }

    #[test]
    fn test_poll_eventually_completes() {
        let mut session = session_90();
        let id = session.request_render().unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        let finished = loop {
            if let Some(done) = session.poll().unwrap() {
                break done;
            }
            assert!(Instant::now() < deadline, "render did not finish");
            thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(finished, id);
        assert!(session.latest().is_some());
        assert_eq!(session.poll().unwrap(), None);
    }

    #[test]
    fn test_wait_without_request() {
        let mut session = session_90();
        assert!(matches!(session.wait(), Err(SessionError::NoPending)));
    }

    #[test]
    fn test_replace_source_resets_state() {
        let mut session = session_90();
        session.request_render().unwrap();
        session.wait().unwrap();

        session.replace_source(RgbaImage::new(30, 60));
        assert_eq!(session.target(), TargetSize::new(30, 60));
        assert_eq!(session.editor().lines(), CutLines::new(10, 20, 20, 40));
        assert!(session.latest().is_none());
        assert!(session.take_latest().is_none());
    }

    #[test]
    fn test_render_in_flight_during_replace_is_discarded() {
        let mut session = session_90();
        session.set_target(TargetSize::new(300, 300));
        let stale = session.request_render().unwrap();
        session.replace_source(RgbaImage::new(30, 60));

        match session.wait() {
            Err(SessionError::Superseded(id)) => assert_eq!(id, stale),
            other => panic!("expected Superseded, got {:?}", other.map(|p| p.request)),
        }
        assert!(session.latest().is_none());
        assert!(!session.is_pending());

        let fresh = session.request_render().unwrap();
        let preview = session.wait().unwrap();
        assert_eq!(preview.request, fresh);
        assert_eq!(preview.target, TargetSize::new(30, 60));
        assert_eq!(preview.image.dimensions(), (30, 60));
    }

    #[test]
    fn test_poll_skips_render_from_replaced_source() {
        let mut session = session_90();
        session.request_render().unwrap();
        session.replace_source(RgbaImage::new(30, 60));

        let deadline = Instant::now() + Duration::from_secs(10);
        while session.is_pending() {
            assert_eq!(session.poll().unwrap(), None);
            assert!(Instant::now() < deadline, "render did not finish");
            thread::sleep(Duration::from_millis(5));
        }
        assert!(session.latest().is_none());
    }
}
