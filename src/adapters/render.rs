use crate::core::Renderer;
use crate::utils::error::{MarketplaceError, Result};
use serde_json::{json, Value};

/// 將渲染 context 以 JSON 輸出；正式的 HTML 模板引擎由外部提供
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, template: &str, context: &Value) -> Result<String> {
        serde_json::to_string_pretty(&json!({
            "template": template,
            "context": context,
        }))
        .map_err(|e| MarketplaceError::RenderError {
            template: template.to_string(),
            message: e.to_string(),
        })
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_wraps_context() {
        let body = JsonRenderer
            .render("question", &json!({ "questionId": "q1" }))
            .unwrap();
        let parsed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["template"], "question");
        assert_eq!(parsed["context"]["questionId"], "q1");
    }
}
