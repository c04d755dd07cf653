//! HTTP API surface.
//!
//! - `POST /receive` takes push notifications from the directory provider.
//! - `/api/v1/admin/*` is the operator API, guarded by [`extractors::AdminAuth`].

pub mod admin;
pub mod extractors;
pub mod receive;
