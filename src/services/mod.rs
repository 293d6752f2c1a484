//! Server actions: one function per remote endpoint.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the remote calls and the shaping of their results so
//! route handlers can stay focused on extraction, cookies and status codes.
//! Every function takes the shared [`crate::api::ApiClient`] and, when the
//! call is authenticated, the request's [`crate::session::Session`].

pub mod auth;
pub mod catalog;
pub mod reservation;
