// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Documentation
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// No panicking in library code
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]
// No debug/print artifacts
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
// Import hygiene
#![warn(clippy::wildcard_imports)]
// Geometry allowances — casts between f32/f64/usize are pervasive and
// intentional in camera and mesh code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::float_cmp)]

//! Interactive first-person walkthrough of a 3D science museum.
//!
//! The museum is a single navigable room with a tiled floor, a textured
//! ceiling, a glass window onto a city skyline, and five animated
//! sculptures: an orbital system, nested rotating toruses, a teapot on a
//! frustum pedestal, a piston/crank mechanism, and a double-helix model.
//!
//! # Key entry points
//!
//! - [`navigator::Navigator`] — the reusable first-person camera and
//!   input component. It owns camera state (position, heading, pitch,
//!   zoom), turns input events into camera mutations, drives smooth
//!   keyboard motion from a single tick clock, and exposes pluggable
//!   draw/clip/key hooks so it stays independent of the hosting scene.
//! - [`scene::Museum`] — the museum itself: room constants, sculpture
//!   kinematics, and the wall-clipping policy installed on the navigator.
//! - [`texture`] — the PNG loading collaborator.
//!
//! # Architecture
//!
//! Everything runs on the single UI thread. The host window delivers
//! input events and timer ticks; the navigator mutates camera state and
//! reports whether a redraw or pointer warp is needed; the renderer
//! (feature `viewer`) draws the scene from the navigator's view
//! transform once per frame.

pub mod error;
pub mod navigator;
pub mod scene;
pub mod texture;

#[cfg(feature = "viewer")]
pub mod gpu;
#[cfg(feature = "viewer")]
pub mod renderer;

pub use error::GalleriaError;
pub use navigator::Navigator;
pub use scene::Museum;
