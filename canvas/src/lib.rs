//! Scene, interaction, and rendering engine for the sticker composer.
//!
//! This crate owns everything about a composition that is not I/O: the
//! placed elements and their transforms, translating raw pointer and touch
//! events into element mutations, hit-testing, and compositing the scene
//! into an RGBA surface. The host layer is responsible only for decoding
//! images, feeding input events, and acting on the returned
//! [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::EngineCore`]: event dispatch and editing-control hooks |
//! | [`scene`] | Background, sticker sequence, and selection |
//! | [`images`] | Decoded image handles and the per-sticker image store |
//! | [`geometry`] | Points, client-to-canvas mapping, placement math |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Topmost-first hit-testing |
//! | [`render`] | Software compositor and PNG encoding |
//! | [`consts`] | Shared numeric constants (scale floor, zoom speed, outline style) |

pub mod consts;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod images;
pub mod input;
pub mod render;
pub mod scene;
