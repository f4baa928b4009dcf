// SPDX-License-Identifier: GPL-3.0-only

//! Frame sources
//!
//! - [`camera`]: the stream abstraction, frame types and pixel conversion
//! - [`virtual_camera`]: a stream that replays a still image

pub mod camera;
pub mod virtual_camera;
