// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Procedural visualization renderer for the fraud-detection dashboard.
//!
//! Two decorative, purely computed scenes are animated here: a rotating
//! Fibonacci sphere of nodes and edges with orbiting rings, and an ambient
//! 2D particle field with proximity links. Neither consumes external data.
//!
//! # Key entry points
//!
//! - [`sphere::SphereScene`] - the rotating sphere scene
//! - [`particles::ParticleField`] - the ambient particle background
//! - [`animation::AnimationScheduler`] - the `Idle`/`Running` frame loop
//! - [`surface::Surface`] - the drawing boundary scenes paint onto
//! - [`graph_style::GraphStyle`] - styling callbacks for the transaction graph widget
//! - [`options::Options`] - TOML-backed tuning for every scene constant
//!
//! # Architecture
//!
//! Each scene generates its geometry once at activation, then the scheduler
//! calls [`scene::Scene::advance`] followed by [`scene::Scene::draw`] once
//! per host frame and re-registers with the host
//! [`animation::FrameClock`]. Teardown cancels the pending frame request, so
//! no draw call can reach a surface after deactivation.
//!
//! Drawing targets are pluggable: [`surface::RasterSurface`] rasterizes into
//! an RGBA buffer (presented through wgpu by the `viewer` feature),
//! [`surface::RecordingSurface`] records calls for inspection, and the `web`
//! feature paints straight onto an HTML canvas.

pub mod animation;
pub mod error;
pub mod graph_style;
pub mod options;
pub mod particles;
pub mod scene;
pub mod sphere;
pub mod surface;
pub mod util;

#[cfg(feature = "viewer")]
pub mod gpu;
#[cfg(feature = "viewer")]
pub mod viewer;
#[cfg(feature = "web")]
pub mod web;

pub use error::VizError;
pub use options::Options;
#[cfg(feature = "viewer")]
pub use viewer::{SceneKind, Viewer};
