// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for frames, saved images and shape documents.

pub mod media;
pub mod save;
pub mod serialization;
