//! SoftwarePatch -> UPDATE statement.
//!
//! This sits in the `db` module because it contains SQL/table knowledge.

use chrono::Utc;
use sqlx::{SqliteConnection, types::Json};
use tracing::debug;

use crate::db::models::DbSoftware;
use crate::db::patch::SoftwarePatch;
use crate::secrets::StoredSecret;

pub(super) const SOFTWARE_COLUMNS: &str = "id, name, category, description, icon, license, systems, website, pros, cons, download_links, secrets, created_at, updated_at";

impl SoftwarePatch {
    /// Apply the patch to row `id`; `secrets` is the already merged list (if any).
    pub(super) async fn apply(
        self,
        conn: &mut SqliteConnection,
        id: i64,
        secrets: Option<Vec<StoredSecret>>,
    ) -> Result<Option<DbSoftware>, sqlx::Error> {
        let SoftwarePatch {
            name,
            category,
            description,
            icon,
            license,
            systems,
            website,
            pros,
            cons,
            download_links,
            secrets: _,
        } = self;

        let name_set = name.is_some();
        let icon_set = icon.is_some();
        let secrets_set = secrets.is_some();
        let updated_at = Utc::now();

        let row = sqlx::query_as::<_, DbSoftware>(&format!(
            r#"
            UPDATE softwares
            SET
                name = COALESCE(?, name),
                category = COALESCE(?, category),
                description = COALESCE(?, description),
                icon = COALESCE(?, icon),
                license = COALESCE(?, license),
                systems = COALESCE(?, systems),
                website = COALESCE(?, website),
                pros = COALESCE(?, pros),
                cons = COALESCE(?, cons),
                download_links = COALESCE(?, download_links),
                secrets = COALESCE(?, secrets),
                updated_at = ?
            WHERE id = ?
            RETURNING {SOFTWARE_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(category)
        .bind(description)
        .bind(icon)
        .bind(license)
        .bind(systems.map(Json))
        .bind(website)
        .bind(pros.map(Json))
        .bind(cons.map(Json))
        .bind(download_links.map(Json))
        .bind(secrets.map(Json))
        .bind(updated_at)
        .bind(id)
        .fetch_optional(conn)
        .await?;

        debug!(
            table = "softwares",
            id,
            found = row.is_some(),
            updated_at = %updated_at,
            name_set,
            icon_set,
            secrets_set,
            "db patch applied"
        );

        Ok(row)
    }
}
