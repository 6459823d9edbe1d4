//! Survival-mode arcade shooter: an avatar fends off waves of chasing,
//! shooting enemies and picks up power-ups.
//!
//! The library is the whole simulation.  A frontend supplies key state, a
//! drawing [`render::Surface`], an optional [`audio::AudioSink`], and calls
//! [`session::Session::pump`] once per refresh.

pub mod audio;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod input;
pub mod render;
pub mod scheduler;
pub mod session;
