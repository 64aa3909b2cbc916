use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category of a protected value attached to a software entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretKind {
    License,
    Account,
    Config,
    #[default]
    #[serde(other)]
    Other,
}

/// Secret metadata as returned to clients. Never carries the value itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretView {
    pub id: String,
    pub kind: SecretKind,
    pub label: String,
    pub notes: String,
    pub expires_at: Option<String>,
    pub created_at: String,
    pub has_value: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftwareView {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub icon: String,
    pub license: String,
    pub systems: Vec<String>,
    pub website: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    /// Free-form link records; only the array shape is enforced.
    pub download_links: Vec<Value>,
    pub secrets: Vec<SecretView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonGroupView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A software entry that shares a comparison group with the one being viewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedSoftwareView {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub icon: String,
    pub website: String,
    pub license: String,
    pub systems: Vec<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "groupInfo")]
    pub group_info: ComparisonGroupView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonAnalysisView {
    pub id: i64,
    pub group_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_secret_kind_falls_back_to_other() {
        let kind: SecretKind = serde_json::from_str(r#""serial-number""#).unwrap();
        assert_eq!(kind, SecretKind::Other);

        let kind: SecretKind = serde_json::from_str(r#""license""#).unwrap();
        assert_eq!(kind, SecretKind::License);
    }

    #[test]
    fn secret_view_uses_camel_case_keys() {
        let view = SecretView {
            id: "s1".to_string(),
            kind: SecretKind::Account,
            label: "admin".to_string(),
            notes: String::new(),
            expires_at: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            has_value: true,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["hasValue"], Value::Bool(true));
        assert_eq!(json["createdAt"], "2025-01-01T00:00:00Z");
        assert!(json.get("expiresAt").is_some());
    }
}
