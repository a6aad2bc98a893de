//! manifest 內宣告式的驗證與分支規則
//!
//! 問題 payload 可用的欄位：
//! - `required: bool`
//! - `options: [{ "value": ... }]` 答案必須是其中之一
//! - `optionsFrom: "pricePoints"` 答案必須是 manifest 中某個價格點的 id
//! - `next`: 字串（固定下一題）或物件（答案 -> 下一題，`"*"` 為預設）
//!
//! 錯誤訊息可由 manifest 的 `errorMessages.<question-id>.<code>` 覆寫。

use crate::core::{Manifest, QuestionDefinition};
use serde::Serialize;
use serde_json::Value;

const PRICE_POINTS_SOURCE: &str = "pricePoints";
const FALLBACK_BRANCH: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueCode {
    Required,
    InvalidOption,
    UnknownPricePoint,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::Required => "required",
            IssueCode::InvalidOption => "invalidOption",
            IssueCode::UnknownPricePoint => "unknownPricePoint",
        }
    }

    fn default_message(&self) -> &'static str {
        match self {
            IssueCode::Required => "An answer is required",
            IssueCode::InvalidOption => "Select one of the available options",
            IssueCode::UnknownPricePoint => "Select one of the available prices",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub question_id: String,
    pub code: IssueCode,
    pub message: String,
}

pub fn validate_answer(
    manifest: &Manifest,
    question: &QuestionDefinition,
    answer: &Value,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if is_blank(answer) {
        if question.is_required() {
            issues.push(issue(manifest, question, IssueCode::Required));
        }
        return issues;
    }

    let submitted = answer_values(answer);

    if let Some(allowed) = question.option_values() {
        let allowed: Vec<String> = allowed.into_iter().map(as_text).collect();
        if submitted.iter().any(|value| !allowed.contains(value)) {
            issues.push(issue(manifest, question, IssueCode::InvalidOption));
        }
    }

    let from_price_points = question
        .data
        .get("optionsFrom")
        .and_then(Value::as_str)
        .map(|source| source == PRICE_POINTS_SOURCE)
        .unwrap_or(false);
    if from_price_points
        && submitted
            .iter()
            .any(|value| manifest.price_point(value).is_none())
    {
        issues.push(issue(manifest, question, IssueCode::UnknownPricePoint));
    }

    issues
}

/// 依 `next` 宣告決定下一題；沒有宣告時流程結束
pub fn next_question(question: &QuestionDefinition, answer: &Value) -> Option<String> {
    match question.data.get("next")? {
        Value::String(next) => Some(next.clone()),
        Value::Object(branches) => branches
            .get(&as_text(answer))
            .or_else(|| branches.get(FALLBACK_BRANCH))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

fn issue(manifest: &Manifest, question: &QuestionDefinition, code: IssueCode) -> ValidationIssue {
    let message = manifest
        .extra
        .get("errorMessages")
        .and_then(|messages| messages.get(&question.id))
        .and_then(|messages| messages.get(code.as_str()))
        .and_then(Value::as_str)
        .unwrap_or_else(|| code.default_message());

    ValidationIssue {
        question_id: question.id.clone(),
        code,
        message: message.to_string(),
    }
}

fn is_blank(answer: &Value) -> bool {
    match answer {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

fn answer_values(answer: &Value) -> Vec<String> {
    match answer {
        Value::Array(items) => items.iter().map(as_text).collect(),
        other => vec![as_text(other)],
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
