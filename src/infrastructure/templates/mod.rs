//! Templates - 基于 Tera 的页面渲染

mod tera_renderer;

pub use tera_renderer::TeraTemplateRenderer;
