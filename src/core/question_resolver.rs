use crate::core::{Manifest, QuestionDefinition};

/// 依序掃描，回傳第一個 id 完全相符（區分大小寫）的問題。
/// 找不到是正常情況，回傳 `None` 而不是錯誤。
pub fn resolve<'m>(question_id: &str, manifest: &'m Manifest) -> Option<&'m QuestionDefinition> {
    manifest.questions.iter().find(|q| q.id == question_id)
}
