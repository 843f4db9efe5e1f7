//! Metadata resolution and rendering.
//!
//! `resolve` turns a render context (home page or single content item),
//! the settings snapshot and the site identity into a [`ResolvedMeta`]
//! value; `render` serializes that value into the head block, the JSON-LD
//! script and the robots.txt text.

pub mod render;
pub mod resolve;

pub use render::{filter_robots, head_block, jsonld_script, meta_tags};
pub use resolve::{RenderContext, ResolvedMeta, resolve};
