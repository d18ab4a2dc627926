//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that surface adapters must implement:
//! - Surface: read/write contract over one text control
//! - SurfaceDiscovery: loads the target and locates the input/output pair
//!
//! These traits keep the poller, oracles and runner independent of the
//! rendering technology behind the widget.

pub mod surface;

pub use surface::{Surface, SurfaceDiscovery, SurfacePair, SurfaceRole};
