use chrono::{DateTime, Utc};
use serde_json::Value;
use softshelf_schema::{
    ComparisonAnalysisView, ComparisonGroupView, RelatedSoftwareView, SoftwareView,
};
use sqlx::{FromRow, types::Json};

use crate::secrets::{StoredSecret, mask_for_client};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbSoftware {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub icon: String,
    pub license: String,
    pub systems: Json<Vec<String>>,
    pub website: String,
    pub pros: Json<Vec<String>>,
    pub cons: Json<Vec<String>>,
    pub download_links: Json<Vec<Value>>,
    pub secrets: Json<Vec<StoredSecret>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbSoftware {
    pub fn find_secret(&self, secret_id: &str) -> Option<&StoredSecret> {
        self.secrets.iter().find(|s| s.id == secret_id)
    }

    /// Client-facing view; secret ciphers are masked out.
    pub fn into_view(self) -> SoftwareView {
        SoftwareView {
            id: self.id,
            secrets: mask_for_client(&self.secrets),
            name: self.name,
            category: self.category,
            description: self.description,
            icon: self.icon,
            license: self.license,
            systems: self.systems.0,
            website: self.website,
            pros: self.pros.0,
            cons: self.cons.0,
            download_links: self.download_links.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbComparisonGroup {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbComparisonGroup> for ComparisonGroupView {
    fn from(row: DbComparisonGroup) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Software row joined with one of the groups it shares with the queried entry.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbRelatedSoftware {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub icon: String,
    pub website: String,
    pub license: String,
    pub systems: Json<Vec<String>>,
    pub pros: Json<Vec<String>>,
    pub cons: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub group_id: i64,
    pub group_name: String,
    pub group_description: String,
    pub group_created_at: DateTime<Utc>,
    pub group_updated_at: DateTime<Utc>,
}

impl From<DbRelatedSoftware> for RelatedSoftwareView {
    fn from(row: DbRelatedSoftware) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            description: row.description,
            icon: row.icon,
            website: row.website,
            license: row.license,
            systems: row.systems.0,
            pros: row.pros.0,
            cons: row.cons.0,
            created_at: row.created_at,
            group_info: ComparisonGroupView {
                id: row.group_id,
                name: row.group_name,
                description: row.group_description,
                created_at: row.group_created_at,
                updated_at: row.group_updated_at,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbComparisonAnalysis {
    pub id: i64,
    pub group_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbComparisonAnalysis> for ComparisonAnalysisView {
    fn from(row: DbComparisonAnalysis) -> Self {
        Self {
            id: row.id,
            group_id: row.group_id,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
