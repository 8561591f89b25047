//! URL handling for the legacy wiki address scheme
//!
//! The wiki percent-escapes the EUC-JP bytes of a page title to form its
//! detail-page path segment. This module owns that codec; every URL identity
//! decision in the crate goes through it.

pub mod codec;

pub use codec::{decode, encode};
