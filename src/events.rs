// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Notifications sent from the engine, canvas and background savers to the
//! UI thread.

use crate::models::{
    annotation::{ShapeKind, Tool},
    color::Color,
};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A one-shot draw operation composited a shape.
    ShapeAdded(ShapeKind),
    /// A draw or overlay operation failed; the input image was kept.
    ShapeDrawingFailed(String),
    SaveSucceeded(PathBuf),
    SaveFailed { message: String, path: PathBuf },
    ToolChanged(Tool),
    ColorChanged(Color),
    WidthChanged(u32),
    /// The canvas finished a pointer gesture.
    DrawingCompleted,
    /// A frame could not be captured from the playback source.
    ScreenshotFailed(String),
}

/// Sending half of the event channel. Cheap to clone and safe to move to
/// worker threads.
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: Option<Sender<Event>>,
}

impl EventSink {
    /// A new channel; the receiver is drained by the UI thread.
    pub fn channel() -> (Self, Receiver<Event>) {
        let (sender, receiver) = channel();
        (Self { sender: Some(sender) }, receiver)
    }

    /// A sink that drops everything.
    pub fn discard() -> Self {
        Self { sender: None }
    }

    /// Send an event. A closed channel is not an error.
    pub fn emit(&self, event: Event) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }
}

impl Default for EventSink {
    fn default() -> Self {
        Self::discard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_arrive_in_order() {
        let (sink, events) = EventSink::channel();
        sink.emit(Event::ToolChanged(Tool::Arrow));
        sink.clone().emit(Event::DrawingCompleted);

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(received, vec![Event::ToolChanged(Tool::Arrow), Event::DrawingCompleted]);
    }

    #[test]
    fn test_emit_after_receiver_dropped() {
        let (sink, events) = EventSink::channel();
        drop(events);
        sink.emit(Event::DrawingCompleted);
        EventSink::discard().emit(Event::DrawingCompleted);
    }
}
