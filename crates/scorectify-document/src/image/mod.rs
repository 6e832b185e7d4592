// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — grayscale normalization, edge-padded rotation and encoding.

pub mod processor;

pub use processor::{ImageProcessor, rotate_edge_padded, to_grayscale};
