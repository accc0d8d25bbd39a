//! Signal codec: bit reader/writer, scaled signal engine, and the payload traits
//! implemented by every typed command layout.
pub mod bits;
pub mod signal;
pub mod traits;
