// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! FRAMEMARK - frame capture annotation for video review
//!
//! Command line front end: burn info text into a frame, or flatten a saved
//! shape document onto one.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use framemark::{
    io::{media, serialization},
    util::time::{ms_to_time_string, time_string_to_ms},
    AnnotationEngine, Event, EventSink, Settings,
};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;

#[derive(Parser)]
#[command(name = "framemark", version, about = "Annotate captured video frames")]
struct Cli {
    /// Settings file (JSON or YAML)
    #[arg(long, global = true, default_value = "settings.json")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Burn the file name and playback position into an image
    Overlay {
        input: PathBuf,
        output: PathBuf,
        /// Video file name shown on the first line
        #[arg(long)]
        name: String,
        /// Playback position, HH:MM:SS or MM:SS
        #[arg(long)]
        time: String,
    },
    /// Draw the shapes from a YAML or JSON document onto an image
    Flatten {
        input: PathBuf,
        shapes: PathBuf,
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.settings);
    let (sink, events) = EventSink::channel();
    let mut engine = AnnotationEngine::new(settings, sink);

    let (image, output) = match cli.command {
        Command::Overlay {
            input,
            output,
            name,
            time,
        } => {
            let position = time_string_to_ms(&time);
            if position == 0 && time.trim().chars().any(|c| c != '0' && c != ':') {
                bail!("invalid playback position: {}", time);
            }
            let frame = media::load_image(&input)?;
            let timestamp = ms_to_time_string(position);
            (engine.create_screenshot_with_info(&frame, &name, &timestamp), output)
        }
        Command::Flatten {
            input,
            shapes,
            output,
        } => {
            let frame = media::load_image(&input)?;
            let document = serialization::import_document(&shapes)?;
            if document.frame_width != frame.width() || document.frame_height != frame.height() {
                log::warn!(
                    "Shapes were drawn on a {}x{} frame, image is {}x{}",
                    document.frame_width,
                    document.frame_height,
                    frame.width(),
                    frame.height()
                );
            }
            (engine.flatten_shapes(&frame, &document.shapes), output)
        }
    };

    engine.save_image(&image, &output);
    engine.cleanup();
    report(&events)
}

fn report(events: &Receiver<Event>) -> Result<()> {
    let mut failure = None;
    for event in events.try_iter() {
        match event {
            Event::SaveSucceeded(path) => println!("Saved {}", path.display()),
            Event::ShapeDrawingFailed(message) => log::warn!("{}", message),
            Event::SaveFailed { message, path } => {
                failure = Some(format!("cannot save {}: {}", path.display(), message));
            }
            _ => {}
        }
    }
    match failure {
        Some(message) => bail!(message),
        None => Ok(()),
    }
}
