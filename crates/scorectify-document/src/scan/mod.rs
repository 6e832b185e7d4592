// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectification pipeline — binarization, constrained line search, skew
// estimation and correction of scanned score pages.

pub mod hough;
pub mod primitives;
pub mod rectify;
pub mod threshold;

pub use hough::{AngleCandidateSet, HoughAccumulator, HoughPeak, LineSearch};
pub use primitives::{ImageprocPrimitives, VisionPrimitives};
pub use rectify::{Rectified, Rectifier};
pub use threshold::{BinaryMask, yen_threshold};
