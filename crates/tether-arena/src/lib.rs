//! Handle-indexed sparse storage for Tether.
//!
//! The host layer keeps one wrapper object per native entity. Native
//! handles are dense slot indices with a reuse generation, so the natural
//! container is a vector addressed by slot index: [`Coarena`].
//!
//! ```text
//! slots: [ Some((h0, w0)) | None | Some((h2, w2)) | None | ... ]
//!           index 0          1      index 2
//! ```
//!
//! Storage only grows. Removing an entity clears its slot; the slot is
//! filled again when the native module reuses the index with a bumped
//! generation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod coarena;

pub use coarena::Coarena;
