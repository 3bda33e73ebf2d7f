//! Tera Template Renderer
//!
//! 内置模板编译进二进制；配置了模板目录时，目录中的同名模板优先

use serde_json::Value;
use std::error::Error as StdError;
use std::path::Path;
use tera::{Context, ErrorKind, Tera};

use crate::application::ports::{RenderError, TemplateRendererPort};

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../../templates/base.html")),
    ("index.html", include_str!("../../../templates/index.html")),
    ("changelist.html", include_str!("../../../templates/changelist.html")),
    ("add.html", include_str!("../../../templates/add.html")),
    ("change.html", include_str!("../../../templates/change.html")),
];

/// Tera 模板渲染器
pub struct TeraTemplateRenderer {
    tera: Tera,
}

impl TeraTemplateRenderer {
    /// 创建渲染器
    ///
    /// # 参数
    /// - `templates_dir` - 可选的模板目录，其中的 `*.html` 覆盖内置模板
    pub fn new(templates_dir: Option<&Path>) -> Result<Self, RenderError> {
        let mut builtin = Tera::default();
        builtin
            .add_raw_templates(BUILTIN_TEMPLATES.iter().copied())
            .map_err(|e| render_failed("<builtin>", &e))?;

        let tera = match templates_dir {
            Some(dir) => {
                let pattern = format!("{}/**/*.html", dir.display());
                // 目录中的模板可能继承内置的 base.html，合并后再构建继承链
                let mut tera = Tera::parse(&pattern).map_err(|e| render_failed(&pattern, &e))?;
                // extend 不会覆盖目录中已存在的模板
                tera.extend(&builtin)
                    .map_err(|e| render_failed(&pattern, &e))?;
                tera.build_inheritance_chains()
                    .map_err(|e| render_failed(&pattern, &e))?;
                tracing::info!(
                    dir = %dir.display(),
                    templates = tera.get_template_names().count(),
                    "Templates loaded"
                );
                tera
            }
            None => builtin,
        };

        Ok(Self { tera })
    }
}

impl TemplateRendererPort for TeraTemplateRenderer {
    fn render(&self, name: &str, context: &Value) -> Result<String, RenderError> {
        let context = Context::from_serialize(context).map_err(|e| render_failed(name, &e))?;

        self.tera.render(name, &context).map_err(|e| match &e.kind {
            ErrorKind::TemplateNotFound(missing) => RenderError::TemplateNotFound(missing.clone()),
            _ => render_failed(name, &e),
        })
    }
}

/// Tera 的错误信息分散在 source 链上
fn render_failed(name: &str, error: &tera::Error) -> RenderError {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    tracing::error!(template = %name, error = %message, "Template render error");

    RenderError::RenderFailed {
        name: name.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index_context() -> Value {
        json!({
            "site_title": "Blog <Admin>",
            "index_url": "/admin",
            "sections": [{
                "name": "blog",
                "display_name": "Blog",
                "entities": [{
                    "name": "post",
                    "display_name": "Post",
                    "changelist_url": "/admin/blog/post",
                    "add_url": "/admin/blog/post/add",
                }],
            }],
        })
    }

    #[test]
    fn test_render_builtin_index() {
        let renderer = TeraTemplateRenderer::new(None).unwrap();
        let html = renderer.render("index.html", &index_context()).unwrap();

        assert!(html.contains("href=\"/admin/blog/post\""));
        assert!(html.contains("Blog &lt;Admin&gt;"));
    }

    #[test]
    fn test_render_missing_template() {
        let renderer = TeraTemplateRenderer::new(None).unwrap();
        let result = renderer.render("missing.html", &json!({}));
        assert!(matches!(result, Err(RenderError::TemplateNotFound(_))));
    }

    #[test]
    fn test_templates_dir_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.html"),
            "custom {% for s in sections %}{{ s.name }}{% endfor %}",
        )
        .unwrap();

        let renderer = TeraTemplateRenderer::new(Some(dir.path())).unwrap();
        let html = renderer.render("index.html", &index_context()).unwrap();
        assert_eq!(html, "custom blog");

        // 未覆盖的模板仍来自内置
        assert!(renderer.tera.get_template_names().any(|n| n == "change.html"));
    }

    #[test]
    fn test_override_extends_builtin_base() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.html"),
            r#"{% extends "base.html" %}{% block content %}custom index{% endblock content %}"#,
        )
        .unwrap();

        let renderer = TeraTemplateRenderer::new(Some(dir.path())).unwrap();
        let html = renderer.render("index.html", &index_context()).unwrap();

        assert!(html.contains("custom index"));
        assert!(html.contains("<title>Blog &lt;Admin&gt;</title>"));
        assert!(!html.contains("href=\"/admin/blog/post\""));
    }
}
