//! Client-side core of a four-player flower mahjong game.
//!
//! The crate keeps the local seat's hand and everything visible on the
//! table in sync with an authoritative server, computes the legal
//! responses to each event and serializes every state change through a
//! single-flight queue.

#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

mod macros;

pub mod action;
pub mod algo;
pub mod call;
pub mod config;
pub mod event;
pub mod hand;
pub mod present;
pub mod queue;
pub mod score;
pub mod seat;
pub mod session;
pub mod state;
pub mod tile;

pub use session::ClientSession;
pub use state::TableState;
