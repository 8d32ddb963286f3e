//! 响应分类器 (Response Classifier)
//!
//! 只依据响应体判断形态。Content-Type 与首字符 `{` 仅作为日志提示，
//! 请求 URL 不参与判断。

use serde_json::Value;
use strum::Display;
use tracing::trace;

/// 响应形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Shape {
    /// `code == "100000"` 且 `data` 为对象
    JsonDetail,
    /// 仅 `data` 为对象
    JsonWrapper,
    /// `ok == 1` 且带 `data`
    JsonOk,
    /// 非 JSON，按 HTML 处理
    HtmlDocument,
    /// 合法 JSON 但不符合任何已知结构
    Unparseable,
}

/// 分类结果，JSON 形态附带已解析的值，避免二次解析
#[derive(Debug)]
pub struct Classified {
    pub shape: Shape,
    pub json: Option<Value>,
}

pub fn inspect(body: &str, content_type: Option<&str>) -> Classified {
    let looks_json = content_type.is_some_and(|ct| ct.contains("application/json"))
        || body.trim_start().starts_with('{');

    let json: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => {
            trace!(hint_json = looks_json, "严格 JSON 解析失败，按 HTML 处理");
            return Classified {
                shape: Shape::HtmlDocument,
                json: None,
            };
        }
    };

    let shape = shape_of(&json);
    trace!(hint_json = looks_json, %shape, "响应分类完成");
    Classified {
        shape,
        json: Some(json),
    }
}

fn shape_of(json: &Value) -> Shape {
    let Some(obj) = json.as_object() else {
        return Shape::Unparseable;
    };
    let data = obj.get("data");
    let data_is_object = data.is_some_and(Value::is_object);

    let success_code = match obj.get("code") {
        Some(Value::String(s)) => s == "100000",
        Some(Value::Number(n)) => n.as_u64() == Some(100000),
        _ => false,
    };

    if success_code && data_is_object {
        Shape::JsonDetail
    } else if obj.get("ok").and_then(Value::as_i64) == Some(1) && data.is_some() {
        Shape::JsonOk
    } else if data_is_object {
        Shape::JsonWrapper
    } else {
        Shape::Unparseable
    }
}

pub fn classify(body: &str, content_type: Option<&str>) -> Shape {
    inspect(body, content_type).shape
}
