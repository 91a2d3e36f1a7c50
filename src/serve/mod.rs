//! Serving archive entries as responses to resource requests.
//!
//! The embedding application hands each fetched URL to a [`Responder`], which
//! maps it to an archive path, extracts the entry and returns a [`Response`]
//! with the content type and cross-origin headers a browser engine expects.

mod mime;
mod request;
mod responder;

pub use mime::MimeResolver;
pub use request::request_path;
pub use responder::{Responder, Response};
