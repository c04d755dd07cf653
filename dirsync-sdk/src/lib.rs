//! Wire types for dirsync.
//!
//! Everything in this crate is plain serde data shared between the server and
//! anything that talks to it: the directory provider's push conventions and the
//! operator API request/response bodies. Database representations live in
//! `dirsync-core`.

pub mod headers;
pub mod objects;
