// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Small helpers shared across the crate.

pub mod files;
pub mod geometry;
pub mod time;
