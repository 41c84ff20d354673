// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background image saving.
//!
//! Each save request gets its own worker thread holding a private copy of
//! the image. Results come back as events; the owner keeps the join handles
//! and waits for them on teardown.

use crate::events::{Event, EventSink};
use crate::io::media::write_png;
use crate::render::RasterImage;
use std::path::PathBuf;
use std::thread::JoinHandle;

/// In-flight save workers.
#[derive(Debug)]
pub struct SaveWorkers {
    events: EventSink,
    handles: Vec<JoinHandle<()>>,
}

impl SaveWorkers {
    pub fn new(events: EventSink) -> Self {
        Self {
            events,
            handles: Vec::new(),
        }
    }

    /// Start writing `image` to `path` as PNG. Returns `false` if no worker
    /// could be started; the outcome of a started save arrives as
    /// `SaveSucceeded` or `SaveFailed`.
    pub fn submit(&mut self, image: RasterImage, path: PathBuf) -> bool {
        self.reap_finished();

        let events = self.events.clone();
        let worker_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name("image-save".to_string())
            .spawn(move || {
                let result = write_png(&image, &worker_path).map_err(|e| format!("{:#}", e));
                match result {
                    Ok(()) => {
                        log::info!("Saved image to {}", worker_path.display());
                        events.emit(Event::SaveSucceeded(worker_path));
                    }
                    Err(message) => {
                        log::error!("Failed to save {}: {}", worker_path.display(), message);
                        events.emit(Event::SaveFailed {
                            message,
                            path: worker_path,
                        });
                    }
                }
            });

        match spawned {
            Ok(handle) => {
                self.handles.push(handle);
                true
            }
            Err(e) => {
                let message = format!("cannot start save worker: {}", e);
                log::error!("{}", message);
                self.events.emit(Event::SaveFailed { message, path });
                false
            }
        }
    }

    /// Number of workers not yet joined.
    pub fn pending(&self) -> usize {
        self.handles.len()
    }

    /// Join and forget workers that have already finished.
    pub fn reap_finished(&mut self) {
        let (finished, running): (Vec<_>, Vec<_>) =
            self.handles.drain(..).partition(|handle| handle.is_finished());
        self.handles = running;
        for handle in finished {
            Self::join(handle);
        }
    }

    /// Block until every outstanding save has completed.
    pub fn wait_all(&mut self) {
        let count = self.handles.len();
        for handle in self.handles.drain(..) {
            Self::join(handle);
        }
        if count > 0 {
            log::debug!("Joined {} save worker(s)", count);
        }
    }

    fn join(handle: JoinHandle<()>) {
        if handle.join().is_err() {
            log::error!("Save worker panicked");
        }
    }
}

impl Drop for SaveWorkers {
    fn drop(&mut self) {
        self.wait_all();
    }
}
