use crate::core::manifest_store::ManifestStore;
use crate::core::price_manifest::PriceManifestProvider;
use crate::core::question_resolver::resolve;
use crate::core::rules::{next_question, validate_answer, ValidationIssue};
use crate::core::session_gateway::{get_from_session, save_to_session, SessionScope};
use crate::core::{ConfigProvider, Manifest, ManifestSource, QuestionDefinition};
use crate::utils::error::{MarketplaceError, Result};
use crate::utils::price::format_json_price;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// 單一題目頁面的渲染 context
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStep {
    pub page: String,
    pub question_id: String,
    /// `None` 代表 manifest 中沒有這一題
    pub question: Option<QuestionDefinition>,
    pub saved_answer: Option<Value>,
    pub page_data: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    pub question: QuestionDefinition,
    pub saved_answer: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPricePoint {
    pub id: String,
    pub price: Value,
    pub formatted_price: String,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

/// 價格選擇頁面的渲染 context
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceStep {
    pub provisioning_type: String,
    pub questions: Vec<AnsweredQuestion>,
    pub price_points: Vec<DisplayPricePoint>,
    pub page_data: Map<String, Value>,
}

/// 「確認答案」頁面的渲染 context
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub page: String,
    pub questions: Vec<AnsweredQuestion>,
    pub page_data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Submission {
    /// 答案已寫入 session
    Accepted { next: Option<String> },
    /// 未通過 manifest 宣告的驗證，session 不變
    Invalid { issues: Vec<ValidationIssue> },
    /// manifest 中沒有這一題，session 不變
    UnknownQuestion,
}

/// 串接 manifest、題目解析、價格與 session 的流程引擎
pub struct FlowEngine<S: ManifestSource> {
    store: Arc<ManifestStore<S>>,
    prices: PriceManifestProvider<S>,
    pages: HashMap<String, PathBuf>,
}

impl<S: ManifestSource> FlowEngine<S> {
    pub fn new(
        source: S,
        price_dir: impl Into<PathBuf>,
        pages: HashMap<String, PathBuf>,
    ) -> Self {
        let store = Arc::new(ManifestStore::new(source));
        let prices = PriceManifestProvider::new(Arc::clone(&store), price_dir);
        Self {
            store,
            prices,
            pages,
        }
    }

    pub fn from_config<C: ConfigProvider>(source: S, config: &C) -> Self {
        let pages = config
            .page_keys()
            .into_iter()
            .filter_map(|key| {
                config
                    .page_manifest(key)
                    .map(|path| (key.to_string(), PathBuf::from(path)))
            })
            .collect();

        Self::new(source, config.price_manifest_dir(), pages)
    }

    pub fn store(&self) -> &ManifestStore<S> {
        &self.store
    }

    pub fn prices(&self) -> &PriceManifestProvider<S> {
        &self.prices
    }

    pub fn page_keys(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    pub async fn page_manifest(&self, page: &str) -> Result<Manifest> {
        let path = self
            .pages
            .get(page)
            .ok_or_else(|| MarketplaceError::ManifestNotFound {
                path: format!("<page:{}>", page),
            })?;
        self.store.load(path).await
    }

    pub async fn question_step<C: SessionScope + ?Sized>(
        &self,
        page: &str,
        question_id: &str,
        ctx: &C,
    ) -> Result<QuestionStep> {
        let manifest = self.page_manifest(page).await?;
        let question = resolve(question_id, &manifest).cloned();

        if question.is_none() {
            tracing::info!("Question '{}' not found in page '{}'", question_id, page);
        }

        Ok(QuestionStep {
            page: page.to_string(),
            question_id: question_id.to_string(),
            question,
            saved_answer: get_from_session(ctx, question_id).cloned(),
            page_data: manifest.extra,
        })
    }

    pub async fn page_summary<C: SessionScope + ?Sized>(
        &self,
        page: &str,
        ctx: &C,
    ) -> Result<PageSummary> {
        let manifest = self.page_manifest(page).await?;

        Ok(PageSummary {
            page: page.to_string(),
            questions: answered_questions(&manifest, ctx),
            page_data: manifest.extra,
        })
    }

    pub async fn price_step<C: SessionScope + ?Sized>(
        &self,
        provisioning_type: &str,
        ctx: &C,
    ) -> Result<PriceStep> {
        let manifest = self.prices.get_price_manifest(provisioning_type).await?;

        let price_points = manifest
            .price_points
            .iter()
            .map(|point| {
                Ok(DisplayPricePoint {
                    id: point.id.clone(),
                    price: point.price.clone(),
                    formatted_price: format_json_price(&point.price)?,
                    data: point.data.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PriceStep {
            provisioning_type: PriceManifestProvider::<S>::normalize_type(provisioning_type)
                .unwrap_or_else(|| provisioning_type.to_lowercase()),
            questions: answered_questions(&manifest, ctx),
            price_points,
            page_data: manifest.extra,
        })
    }

    pub async fn submit_answer<C: SessionScope + ?Sized>(
        &self,
        page: &str,
        question_id: &str,
        answer: Value,
        ctx: &mut C,
    ) -> Result<Submission> {
        let manifest = self.page_manifest(page).await?;
        Ok(apply_answer(&manifest, question_id, answer, ctx))
    }

    pub async fn submit_price_selection<C: SessionScope + ?Sized>(
        &self,
        provisioning_type: &str,
        question_id: &str,
        answer: Value,
        ctx: &mut C,
    ) -> Result<Submission> {
        let manifest = self.prices.get_price_manifest(provisioning_type).await?;
        Ok(apply_answer(&manifest, question_id, answer, ctx))
    }
}

fn answered_questions<C: SessionScope + ?Sized>(
    manifest: &Manifest,
    ctx: &C,
) -> Vec<AnsweredQuestion> {
    manifest
        .questions
        .iter()
        .map(|question| AnsweredQuestion {
            saved_answer: get_from_session(ctx, &question.id).cloned(),
            question: question.clone(),
        })
        .collect()
}

fn apply_answer<C: SessionScope + ?Sized>(
    manifest: &Manifest,
    question_id: &str,
    answer: Value,
    ctx: &mut C,
) -> Submission {
    let Some(question) = resolve(question_id, manifest) else {
        tracing::warn!("⚠️ Answer submitted for unknown question '{}'", question_id);
        return Submission::UnknownQuestion;
    };

    let issues = validate_answer(manifest, question, &answer);
    if !issues.is_empty() {
        tracing::debug!(
            "Answer for '{}' rejected with {} issue(s)",
            question_id,
            issues.len()
        );
        return Submission::Invalid { issues };
    }

    let next = next_question(question, &answer);
    save_to_session(ctx, question_id, answer);
    Submission::Accepted { next }
}
