use crate::core::flow::FlowEngine;
use crate::core::{Manifest, ManifestSource};
use crate::utils::price::format_json_price;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LintFinding {
    pub manifest: String,
    pub level: LintLevel,
    pub problem: String,
}

#[derive(Debug, Clone, Default)]
pub struct LintReport {
    pub checked: usize,
    pub findings: Vec<LintFinding>,
}

impl LintReport {
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.level == LintLevel::Error)
    }

    fn push(&mut self, manifest: &str, level: LintLevel, problem: impl Into<String>) {
        self.findings.push(LintFinding {
            manifest: manifest.to_string(),
            level,
            problem: problem.into(),
        });
    }

    fn inspect(&mut self, label: &str, manifest: &Manifest) {
        for duplicate in manifest.duplicate_question_ids() {
            self.push(
                label,
                LintLevel::Warning,
                format!("duplicate question id '{}' (first definition wins)", duplicate),
            );
        }

        for point in &manifest.price_points {
            if let Err(e) = format_json_price(&point.price) {
                self.push(
                    label,
                    LintLevel::Error,
                    format!("price point '{}': {}", point.id, e),
                );
            }
        }
    }
}

/// 載入所有頁面與指定的價格 manifest，收集問題而不中途停止
pub async fn lint<S: ManifestSource>(
    engine: &FlowEngine<S>,
    provisioning_types: &[String],
) -> LintReport {
    let mut report = LintReport::default();

    let mut pages: Vec<&str> = engine.page_keys().collect();
    pages.sort_unstable();

    for page in pages {
        let label = format!("page:{}", page);
        report.checked += 1;
        match engine.page_manifest(page).await {
            Ok(manifest) => report.inspect(&label, &manifest),
            Err(e) => report.push(&label, LintLevel::Error, e.to_string()),
        }
    }

    for provisioning_type in provisioning_types {
        let label = format!("price:{}", provisioning_type);
        report.checked += 1;
        match engine.prices().get_price_manifest(provisioning_type).await {
            Ok(manifest) => report.inspect(&label, &manifest),
            Err(e) => report.push(&label, LintLevel::Error, e.to_string()),
        }
    }

    report
}
