//! Headless sticker composer.
//!
//! | Module | Role |
//! |---|---|
//! | [`config`] | Environment configuration |
//! | [`loader`] | Image sources, fetching, and decoding |
//! | [`palette`] | Named built-in sticker sources |
//! | [`session`] | Engine, surface, async loads, and export |
//! | [`script`] | JSON editing scripts replayed against a session |
//!
//! Geometry, the scene model, gestures, and rendering live in the `canvas` crate.

pub mod config;
pub mod loader;
pub mod palette;
pub mod script;
pub mod session;
