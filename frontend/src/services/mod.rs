//! Browser-side services.
//!
//! # Services
//!
//! - [`appwrite`] - Service construction and the async calls the views start
//! - [`picker`] - Reading the chosen `.ply` file from an `<input>`

pub mod appwrite;
pub mod picker;

pub use appwrite::*;
pub use picker::*;
