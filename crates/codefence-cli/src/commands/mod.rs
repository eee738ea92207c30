//! CLI command implementations.

pub(crate) mod css;
pub(crate) mod render;
pub(crate) mod styles;

pub(crate) use css::CssArgs;
pub(crate) use render::RenderArgs;
