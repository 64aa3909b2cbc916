//! Request bodies for the software routes.
//!
//! The SPA sends loosely typed JSON (arrays as strings, numbers as text), so bodies are
//! read as [`Value`]s and coerced here into [`SoftwareCreate`] / [`SoftwarePatch`].

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::db::{SoftwareCreate, SoftwarePatch};
use crate::error::CatalogError;
use crate::secrets::SecretInput;
use crate::utils::serde_ext::{lax_raw_text, lax_text, raw_text_of, string_list, text_of};

const DEFAULT_LICENSE: &str = "免费";

const MISSING_INFO: &str = "缺少必要信息";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateSoftwareBody {
    #[serde(deserialize_with = "lax_text")]
    pub name: String,
    #[serde(deserialize_with = "lax_text")]
    pub category: String,
    #[serde(deserialize_with = "lax_raw_text")]
    pub description: String,
    #[serde(deserialize_with = "lax_text")]
    pub icon: String,
    #[serde(deserialize_with = "lax_text")]
    pub license: String,
    #[serde(deserialize_with = "lax_text")]
    pub website: String,
    pub systems: Value,
    pub pros: Value,
    pub cons: Value,
    pub download_links: Value,
    pub secrets: Value,
}

impl CreateSoftwareBody {
    /// Required-field check and array coercion. The icon is left for the handler to vet.
    pub fn into_create(self) -> Result<SoftwareCreate, CatalogError> {
        if self.name.is_empty() || self.category.is_empty() {
            return Err(CatalogError::validation(
                MISSING_INFO,
                "软件名称和分类是必填项",
            ));
        }
        let license = if self.license.is_empty() {
            DEFAULT_LICENSE.to_string()
        } else {
            self.license
        };
        let download_links = match self.download_links {
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        Ok(SoftwareCreate {
            name: self.name,
            category: self.category,
            description: self.description,
            icon: self.icon,
            license,
            systems: string_list(&self.systems),
            website: self.website,
            pros: string_list(&self.pros),
            cons: string_list(&self.cons),
            download_links,
            secrets: match &self.secrets {
                Value::Array(items) => secret_inputs(items),
                _ => Vec::new(),
            },
        })
    }
}

/// Elements that are not objects (`null` included) become empty inputs.
fn secret_inputs(items: &[Value]) -> Vec<SecretInput> {
    items
        .iter()
        .map(|item| serde_json::from_value(item.clone()).unwrap_or_default())
        .collect()
}

/// An array, or a string holding a JSON array. `Ok(None)` for `null`.
fn json_array(
    value: &Value,
    field: &'static str,
    invalid_shape: &'static str,
) -> Result<Option<Vec<Value>>, CatalogError> {
    let not_array = || CatalogError::validation(invalid_shape, format!("{field} 必须是数组"));
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => Ok(Some(items.clone())),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => Ok(Some(items)),
            Ok(_) => Err(not_array()),
            Err(_) => Err(CatalogError::validation(
                "无效的 JSON",
                format!("{field} 不是合法的 JSON"),
            )),
        },
        _ => Err(not_array()),
    }
}

fn required_text(value: &Value, message: &'static str) -> Result<String, CatalogError> {
    let text = text_of(value);
    if text.is_empty() {
        return Err(CatalogError::validation(MISSING_INFO, message));
    }
    Ok(text)
}

/// Body of `PUT /api/software/{id}`: only the keys present are updated.
#[derive(Debug, Default)]
pub struct UpdateSoftwareBody {
    pub patch: SoftwarePatch,
    /// `Some("")` when the client cleared the icon; checked against the store by the handler.
    pub icon: Option<String>,
}

impl UpdateSoftwareBody {
    /// `id`, `created_at`, `updated_at` and unknown keys are ignored.
    pub fn parse(body: &Map<String, Value>) -> Result<Self, CatalogError> {
        let mut patch = SoftwarePatch::default();

        if let Some(v) = body.get("name") {
            patch.name = Some(required_text(v, "软件名称不能为空")?);
        }
        if let Some(v) = body.get("category") {
            patch.category = Some(required_text(v, "软件分类不能为空")?);
        }
        patch.description = body.get("description").map(raw_text_of);
        patch.license = body.get("license").map(text_of);
        patch.website = body.get("website").map(text_of);
        patch.systems = body.get("systems").map(string_list);
        patch.pros = body.get("pros").map(string_list);
        patch.cons = body.get("cons").map(string_list);

        if let Some(v) = body.get("download_links") {
            let links = json_array(v, "download_links", "无效的下载链接格式")?;
            patch.download_links = Some(links.unwrap_or_default());
        }
        if let Some(v) = body.get("secrets") {
            patch.secrets =
                json_array(v, "secrets", "无效的 secrets 格式")?.map(|items| secret_inputs(&items));
        }

        Ok(Self {
            patch,
            icon: body.get("icon").map(text_of),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(value: Value) -> Result<SoftwareCreate, CatalogError> {
        serde_json::from_value::<CreateSoftwareBody>(value)
            .unwrap()
            .into_create()
    }

    fn update(value: Value) -> Result<UpdateSoftwareBody, CatalogError> {
        let Value::Object(map) = value else {
            panic!("object expected");
        };
        UpdateSoftwareBody::parse(&map)
    }

    #[test]
    fn create_requires_name_and_category() {
        let err = create(json!({ "name": "VS Code" })).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation { message, .. } if message == "软件名称和分类是必填项"
        ));
        assert!(create(json!({ "name": "  ", "category": "editor" })).is_err());
    }

    #[test]
    fn create_coerces_arrays_and_defaults_license() {
        let created = create(json!({
            "name": "VS Code",
            "category": "editor",
            "systems": "Windows",
            "pros": ["fast", 1],
            "download_links": { "url": "x" },
            "secrets": [null, { "label": "key", "value": "abc" }],
        }))
        .unwrap();
        assert_eq!(created.license, "免费");
        assert!(created.systems.is_empty());
        assert_eq!(created.pros, vec!["fast", "1"]);
        assert!(created.cons.is_empty());
        assert!(created.download_links.is_empty());
        assert_eq!(created.secrets.len(), 2);
        assert_eq!(created.secrets[1].label, "key");
    }

    #[test]
    fn update_only_touches_present_keys() {
        let parsed = update(json!({
            "id": 99,
            "created_at": "2020-01-01",
            "description": "new",
            "pros": "not an array",
        }))
        .unwrap();
        let patch = parsed.patch;
        assert_eq!(patch.description.as_deref(), Some("new"));
        assert_eq!(patch.pros, Some(Vec::new()));
        assert!(patch.name.is_none());
        assert!(patch.cons.is_none());
        assert!(patch.secrets.is_none());
        assert!(parsed.icon.is_none());
    }

    #[test]
    fn update_rejects_blank_name() {
        assert!(update(json!({ "name": "" })).is_err());
        assert!(update(json!({ "category": null })).is_err());
    }

    #[test]
    fn download_links_accept_json_strings() {
        let parsed = update(json!({ "download_links": r#"[{"url":"https://a"}]"# })).unwrap();
        assert_eq!(parsed.patch.download_links.unwrap().len(), 1);

        let cleared = update(json!({ "download_links": null })).unwrap();
        assert_eq!(cleared.patch.download_links, Some(Vec::new()));

        let err = update(json!({ "download_links": "{}" })).unwrap_err();
        assert!(matches!(err, CatalogError::Validation { error: "无效的下载链接格式", .. }));

        let err = update(json!({ "download_links": "[oops" })).unwrap_err();
        assert!(matches!(err, CatalogError::Validation { error: "无效的 JSON", .. }));

        let err = update(json!({ "download_links": 3 })).unwrap_err();
        assert!(matches!(err, CatalogError::Validation { error: "无效的下载链接格式", .. }));
    }

    #[test]
    fn secrets_null_leaves_them_untouched() {
        let parsed = update(json!({ "secrets": null })).unwrap();
        assert!(parsed.patch.secrets.is_none());

        let parsed = update(json!({ "secrets": r#"[{"id":"a"}]"# })).unwrap();
        assert_eq!(parsed.patch.secrets.unwrap()[0].id.as_deref(), Some("a"));

        let err = update(json!({ "secrets": { "id": "a" } })).unwrap_err();
        assert!(matches!(err, CatalogError::Validation { error: "无效的 secrets 格式", .. }));
    }

    #[test]
    fn cleared_icon_is_reported_as_empty() {
        assert_eq!(update(json!({ "icon": null })).unwrap().icon.as_deref(), Some(""));
        assert_eq!(update(json!({ "icon": "" })).unwrap().icon.as_deref(), Some(""));
    }
}
