//! itch.io platform access: metadata, uploads, collections and the takedown
//! probe.

mod client;
mod models;
pub mod probe;

pub use client::{ItchClient, ItchEndpoints};
pub use models::{Collection, CollectionGame, Download, Game, Platforms, Upload};
