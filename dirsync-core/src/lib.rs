#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod directory;
pub mod entities;
pub mod framework;
pub mod intake;
pub mod lifecycle;
pub mod registry;
pub mod storage;
