//! HTTP request handlers.

pub(crate) mod home;
