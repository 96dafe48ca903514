//! Loreweave — external service clients.
//!
//! `reqwest` implementations of the `TextCompletion`, `ImageGeneration` and
//! `ImageHosting` contracts, plus a retrying wrapper for image generation.

mod http;

pub mod cloudinary;
pub mod images;
pub mod retry;
pub mod sinkin;
pub mod venice;
