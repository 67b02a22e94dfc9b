//! Named script and configuration templates, and the renderer that fills them.
//!
//! Templates are grouped in immutable collections built once on first use. Rendering is pure
//! text substitution through [`tera`]: every placeholder must be present in the data, so a typo
//! in a template or a missing field surfaces as an error instead of an empty value.

mod collections;
mod data;
mod render;
mod template;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use collections::*;
pub use data::*;
pub use render::*;
pub use template::*;
