use std::path::Path;
use tempfile::TempDir;

pub const ORDER_MANIFEST: &str = r#"{
    "title": "Order items",
    "questions": [
        { "id": "solution", "label": "Which solution?", "required": true, "next": "quantity" },
        {
            "id": "quantity",
            "type": "radio",
            "options": [{ "value": "1" }, { "value": "2" }, { "value": "many" }],
            "next": { "many": "estimate" }
        },
        { "id": "estimate", "type": "text" }
    ],
    "errorMessages": {
        "solution": { "required": "Select a solution" }
    }
}"#;

pub const PATIENT_PRICES: &str = r#"{
    "title": "Per patient pricing",
    "questions": [
        { "id": "selectedPrice", "required": true, "optionsFrom": "pricePoints" }
    ],
    "pricePoints": [
        { "id": "standard", "price": 1.64, "unit": "per patient per year" },
        { "id": "enterprise", "price": 1234.567, "unit": "per practice" },
        { "id": "bulk", "price": 1000 }
    ]
}"#;

pub const DECLARATIVE_PRICES: &str = r#"{
    "questions": [{ "id": "quantity", "required": true }],
    "pricePoints": [{ "id": "flat", "price": 999.999 }]
}"#;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// 建立一個含頁面與價格 manifest 的暫存目錄
pub fn manifest_tree() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    write(root, "pages/order/manifest.json", ORDER_MANIFEST);
    write(root, "pages/broken/manifest.json", r#"{"questions": [{"id": }"#);
    write(root, "price/patient/manifest.json", PATIENT_PRICES);
    write(root, "price/declarative/manifest.json", DECLARATIVE_PRICES);

    temp_dir
}
