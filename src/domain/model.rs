use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// 解析後的 manifest。載入後不可變，兩次載入同一路徑應得到相等的值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub questions: Vec<QuestionDefinition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub price_points: Vec<PricePoint>,

    /// 其餘頂層欄位（標題、errorMessages 等）原樣保留
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    pub fn question_ids(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(|q| q.id.as_str())
    }

    pub fn price_point(&self, id: &str) -> Option<&PricePoint> {
        self.price_points.iter().find(|p| p.id == id)
    }

    /// 重複的 question id（只回報第一次以外的重複項）
    pub fn duplicate_question_ids(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();
        for id in self.question_ids() {
            if !seen.insert(id) && !duplicates.iter().any(|d: &String| d == id) {
                duplicates.push(id.to_string());
            }
        }
        duplicates
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    pub id: String,

    /// 由 manifest 作者定義的內容（label、type、required、options、next...）
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl QuestionDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }

    pub fn is_required(&self) -> bool {
        self.data
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// `options: [{ "value": ... }]` 中宣告的可選值
    pub fn option_values(&self) -> Option<Vec<&Value>> {
        let options = self.data.get("options")?.as_array()?;
        Some(options.iter().filter_map(|o| o.get("value")).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub id: String,
    pub price: Value,

    #[serde(flatten)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 單一使用者進行中的作答資料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub entries: HashMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(SessionId::generate())
    }

    pub fn with_id(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            entries: HashMap::new(),
            created_at: now,
            last_accessed: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_accessed = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
