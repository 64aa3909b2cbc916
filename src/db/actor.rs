use crate::db::models::{DbComparisonAnalysis, DbComparisonGroup, DbRelatedSoftware, DbSoftware};
use crate::db::patch::{SoftwareCreate, SoftwarePatch};
use crate::db::patch_impl::SOFTWARE_COLUMNS;
use crate::db::schema::SQLITE_INIT;
use crate::error::CatalogError;
use crate::secrets::{SecretCipher, StoredSecret, merge_for_update, normalize_for_insert};
use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::types::Json;
use std::{str::FromStr, time::Duration};
use tracing::info;

type Reply<T> = RpcReplyPort<Result<T, CatalogError>>;

#[derive(Debug)]
pub enum DbActorMessage {
    /// `SELECT datetime('now')`, used by the health check.
    Ping(Reply<String>),

    ListSoftware(Reply<Vec<DbSoftware>>),
    ListSoftwareByCategory(String, Reply<Vec<DbSoftware>>),
    SearchSoftware(String, Reply<Vec<DbSoftware>>),
    GetSoftware(i64, Reply<Option<DbSoftware>>),
    CreateSoftware(SoftwareCreate, Reply<DbSoftware>),

    /// Patch a software row by id; `None` when the id is unknown.
    UpdateSoftware(i64, SoftwarePatch, Reply<Option<DbSoftware>>),

    /// Delete a software row and return it; group links cascade.
    DeleteSoftware(i64, Reply<Option<DbSoftware>>),

    ListGroups(Reply<Vec<DbComparisonGroup>>),
    CreateGroup(String, String, Reply<DbComparisonGroup>),
    ListGroupSoftware(i64, Reply<Vec<DbSoftware>>),

    /// Link software to a group; linking twice is a no-op.
    AddSoftwareToGroup(i64, i64, Reply<()>),

    /// Unlink; `false` when no such link existed.
    RemoveSoftwareFromGroup(i64, i64, Reply<bool>),

    ListRelatedSoftware(i64, Reply<Vec<DbRelatedSoftware>>),

    /// Upsert the group's analysis text.
    SaveAnalysis(i64, String, Reply<DbComparisonAnalysis>),
    GetAnalysis(i64, Reply<Option<DbComparisonAnalysis>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

macro_rules! rpc {
    ($actor:expr, $variant:ident $(, $arg:expr)*) => {
        ractor::call!($actor, DbActorMessage::$variant $(, $arg)*).map_err(|e| {
            CatalogError::RactorError(format!(concat!("DbActor ", stringify!($variant), " RPC failed: {}"), e))
        })?
    };
}

impl DbActorHandle {
    pub async fn ping(&self) -> Result<String, CatalogError> {
        rpc!(self.actor, Ping)
    }

    pub async fn list_software(&self) -> Result<Vec<DbSoftware>, CatalogError> {
        rpc!(self.actor, ListSoftware)
    }

    pub async fn list_software_by_category(
        &self,
        category: String,
    ) -> Result<Vec<DbSoftware>, CatalogError> {
        rpc!(self.actor, ListSoftwareByCategory, category)
    }

    /// Substring match on name or description. `%` and `_` in `query` match literally.
    /// SQLite `LIKE` folds ASCII case only: `é` does not match `É`.
    pub async fn search_software(&self, query: String) -> Result<Vec<DbSoftware>, CatalogError> {
        rpc!(self.actor, SearchSoftware, query)
    }

    pub async fn get_software(&self, id: i64) -> Result<Option<DbSoftware>, CatalogError> {
        rpc!(self.actor, GetSoftware, id)
    }

    pub async fn create_software(&self, create: SoftwareCreate) -> Result<DbSoftware, CatalogError> {
        rpc!(self.actor, CreateSoftware, create)
    }

    pub async fn update_software(
        &self,
        id: i64,
        patch: SoftwarePatch,
    ) -> Result<Option<DbSoftware>, CatalogError> {
        rpc!(self.actor, UpdateSoftware, id, patch)
    }

    pub async fn delete_software(&self, id: i64) -> Result<Option<DbSoftware>, CatalogError> {
        rpc!(self.actor, DeleteSoftware, id)
    }

    pub async fn list_groups(&self) -> Result<Vec<DbComparisonGroup>, CatalogError> {
        rpc!(self.actor, ListGroups)
    }

    pub async fn create_group(
        &self,
        name: String,
        description: String,
    ) -> Result<DbComparisonGroup, CatalogError> {
        rpc!(self.actor, CreateGroup, name, description)
    }

    pub async fn list_group_software(&self, group_id: i64) -> Result<Vec<DbSoftware>, CatalogError> {
        rpc!(self.actor, ListGroupSoftware, group_id)
    }

    pub async fn add_software_to_group(
        &self,
        group_id: i64,
        software_id: i64,
    ) -> Result<(), CatalogError> {
        rpc!(self.actor, AddSoftwareToGroup, group_id, software_id)
    }

    pub async fn remove_software_from_group(
        &self,
        group_id: i64,
        software_id: i64,
    ) -> Result<bool, CatalogError> {
        rpc!(self.actor, RemoveSoftwareFromGroup, group_id, software_id)
    }

    pub async fn list_related_software(
        &self,
        software_id: i64,
    ) -> Result<Vec<DbRelatedSoftware>, CatalogError> {
        rpc!(self.actor, ListRelatedSoftware, software_id)
    }

    pub async fn save_analysis(
        &self,
        group_id: i64,
        content: String,
    ) -> Result<DbComparisonAnalysis, CatalogError> {
        rpc!(self.actor, SaveAnalysis, group_id, content)
    }

    pub async fn get_analysis(
        &self,
        group_id: i64,
    ) -> Result<Option<DbComparisonAnalysis>, CatalogError> {
        rpc!(self.actor, GetAnalysis, group_id)
    }
}

struct DbActorState {
    pool: SqlitePool,
    cipher: SecretCipher,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = (String, SecretCipher);

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        (database_url, cipher): Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool, cipher })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let pool = &state.pool;
        match message {
            DbActorMessage::Ping(reply) => {
                let _ = reply.send(self.ping(pool).await);
            }
            DbActorMessage::ListSoftware(reply) => {
                let _ = reply.send(self.list_software(pool).await);
            }
            DbActorMessage::ListSoftwareByCategory(category, reply) => {
                let _ = reply.send(self.list_software_by_category(pool, category).await);
            }
            DbActorMessage::SearchSoftware(query, reply) => {
                let _ = reply.send(self.search_software(pool, &query).await);
            }
            DbActorMessage::GetSoftware(id, reply) => {
                let _ = reply.send(self.get_software(pool, id).await);
            }
            DbActorMessage::CreateSoftware(create, reply) => {
                let res = self.create_software(pool, &state.cipher, create).await;
                let _ = reply.send(res);
            }
            DbActorMessage::UpdateSoftware(id, patch, reply) => {
                let res = self.update_software(pool, &state.cipher, id, patch).await;
                let _ = reply.send(res);
            }
            DbActorMessage::DeleteSoftware(id, reply) => {
                let _ = reply.send(self.delete_software(pool, id).await);
            }
            DbActorMessage::ListGroups(reply) => {
                let _ = reply.send(self.list_groups(pool).await);
            }
            DbActorMessage::CreateGroup(name, description, reply) => {
                let _ = reply.send(self.create_group(pool, name, description).await);
            }
            DbActorMessage::ListGroupSoftware(group_id, reply) => {
                let _ = reply.send(self.list_group_software(pool, group_id).await);
            }
            DbActorMessage::AddSoftwareToGroup(group_id, software_id, reply) => {
                let res = self.add_software_to_group(pool, group_id, software_id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::RemoveSoftwareFromGroup(group_id, software_id, reply) => {
                let res = self
                    .remove_software_from_group(pool, group_id, software_id)
                    .await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListRelatedSoftware(software_id, reply) => {
                let _ = reply.send(self.list_related_software(pool, software_id).await);
            }
            DbActorMessage::SaveAnalysis(group_id, content, reply) => {
                let _ = reply.send(self.save_analysis(pool, group_id, content).await);
            }
            DbActorMessage::GetAnalysis(group_id, reply) => {
                let _ = reply.send(self.get_analysis(pool, group_id).await);
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn ping(&self, pool: &SqlitePool) -> Result<String, CatalogError> {
        let now: String = sqlx::query_scalar("SELECT datetime('now')")
            .fetch_one(pool)
            .await?;
        Ok(now)
    }

    async fn list_software(&self, pool: &SqlitePool) -> Result<Vec<DbSoftware>, CatalogError> {
        let rows = sqlx::query_as::<_, DbSoftware>(&format!(
            "SELECT {SOFTWARE_COLUMNS} FROM softwares ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    async fn list_software_by_category(
        &self,
        pool: &SqlitePool,
        category: String,
    ) -> Result<Vec<DbSoftware>, CatalogError> {
        let rows = sqlx::query_as::<_, DbSoftware>(&format!(
            "SELECT {SOFTWARE_COLUMNS} FROM softwares WHERE category = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(category)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    async fn search_software(
        &self,
        pool: &SqlitePool,
        query: &str,
    ) -> Result<Vec<DbSoftware>, CatalogError> {
        let pattern = format!("%{}%", escape_like(query));
        let rows = sqlx::query_as::<_, DbSoftware>(&format!(
            r#"
        SELECT {SOFTWARE_COLUMNS}
        FROM softwares
        WHERE name LIKE ? ESCAPE '\' OR description LIKE ? ESCAPE '\'
        ORDER BY created_at DESC, id DESC
        "#
        ))
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    async fn get_software(
        &self,
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<DbSoftware>, CatalogError> {
        let row = sqlx::query_as::<_, DbSoftware>(&format!(
            "SELECT {SOFTWARE_COLUMNS} FROM softwares WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    async fn create_software(
        &self,
        pool: &SqlitePool,
        cipher: &SecretCipher,
        create: SoftwareCreate,
    ) -> Result<DbSoftware, CatalogError> {
        let secrets = normalize_for_insert(create.secrets, cipher)?;
        let now = Utc::now();

        let row = sqlx::query_as::<_, DbSoftware>(&format!(
            r#"
        INSERT INTO softwares (
            name, category, description, icon, license, systems, website,
            pros, cons, download_links, secrets, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {SOFTWARE_COLUMNS}
        "#
        ))
        .bind(create.name)
        .bind(create.category)
        .bind(create.description)
        .bind(create.icon)
        .bind(create.license)
        .bind(Json(create.systems))
        .bind(create.website)
        .bind(Json(create.pros))
        .bind(Json(create.cons))
        .bind(Json(create.download_links))
        .bind(Json(secrets))
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    async fn update_software(
        &self,
        pool: &SqlitePool,
        cipher: &SecretCipher,
        id: i64,
        mut patch: SoftwarePatch,
    ) -> Result<Option<DbSoftware>, CatalogError> {
        let mut tx = pool.begin().await?;

        let existing: Option<Json<Vec<StoredSecret>>> =
            sqlx::query_scalar("SELECT secrets FROM softwares WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let merged = match patch.secrets.take() {
            Some(inputs) => Some(merge_for_update(inputs, &existing, cipher)?),
            None => None,
        };

        let row = patch.apply(&mut *tx, id, merged).await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn delete_software(
        &self,
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<DbSoftware>, CatalogError> {
        let row = sqlx::query_as::<_, DbSoftware>(&format!(
            "DELETE FROM softwares WHERE id = ? RETURNING {SOFTWARE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    async fn list_groups(&self, pool: &SqlitePool) -> Result<Vec<DbComparisonGroup>, CatalogError> {
        let rows = sqlx::query_as::<_, DbComparisonGroup>(
            r#"
        SELECT id, name, description, created_at, updated_at
        FROM comparison_groups
        ORDER BY created_at DESC, id DESC
        "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    async fn create_group(
        &self,
        pool: &SqlitePool,
        name: String,
        description: String,
    ) -> Result<DbComparisonGroup, CatalogError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, DbComparisonGroup>(
            r#"
        INSERT INTO comparison_groups (name, description, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, name, description, created_at, updated_at
        "#,
        )
        .bind(name)
        .bind(description)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    async fn list_group_software(
        &self,
        pool: &SqlitePool,
        group_id: i64,
    ) -> Result<Vec<DbSoftware>, CatalogError> {
        let columns = prefixed_columns("s");
        let rows = sqlx::query_as::<_, DbSoftware>(&format!(
            r#"
        SELECT {columns}
        FROM softwares s
        INNER JOIN comparison_group_softwares cgs ON s.id = cgs.software_id
        WHERE cgs.group_id = ?
        ORDER BY s.name, s.id
        "#
        ))
        .bind(group_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    async fn add_software_to_group(
        &self,
        pool: &SqlitePool,
        group_id: i64,
        software_id: i64,
    ) -> Result<(), CatalogError> {
        let res = sqlx::query(
            r#"
        INSERT INTO comparison_group_softwares (group_id, software_id, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT(group_id, software_id) DO NOTHING
        "#,
        )
        .bind(group_id)
        .bind(software_id)
        .bind(Utc::now())
        .execute(pool)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(e) if is_foreign_key_violation(&e) => Err(CatalogError::NotFound("软件或比较组不存在")),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_software_from_group(
        &self,
        pool: &SqlitePool,
        group_id: i64,
        software_id: i64,
    ) -> Result<bool, CatalogError> {
        let res = sqlx::query(
            "DELETE FROM comparison_group_softwares WHERE group_id = ? AND software_id = ?",
        )
        .bind(group_id)
        .bind(software_id)
        .execute(pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_related_software(
        &self,
        pool: &SqlitePool,
        software_id: i64,
    ) -> Result<Vec<DbRelatedSoftware>, CatalogError> {
        let rows = sqlx::query_as::<_, DbRelatedSoftware>(
            r#"
        SELECT DISTINCT
            s.id, s.name, s.category, s.description, s.icon, s.website, s.license,
            s.systems, s.pros, s.cons, s.created_at,
            cg.id AS group_id, cg.name AS group_name, cg.description AS group_description,
            cg.created_at AS group_created_at, cg.updated_at AS group_updated_at
        FROM softwares s
        INNER JOIN comparison_group_softwares cgs1 ON s.id = cgs1.software_id
        INNER JOIN comparison_group_softwares cgs2 ON cgs1.group_id = cgs2.group_id
        INNER JOIN comparison_groups cg ON cgs1.group_id = cg.id
        WHERE cgs2.software_id = ? AND s.id != ?
        ORDER BY s.name, s.id, cg.id
        "#,
        )
        .bind(software_id)
        .bind(software_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    async fn save_analysis(
        &self,
        pool: &SqlitePool,
        group_id: i64,
        content: String,
    ) -> Result<DbComparisonAnalysis, CatalogError> {
        let now = Utc::now();
        let res = sqlx::query_as::<_, DbComparisonAnalysis>(
            r#"
        INSERT INTO comparison_analyses (group_id, content, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(group_id) DO UPDATE SET
            content = excluded.content,
            updated_at = excluded.updated_at
        RETURNING id, group_id, content, created_at, updated_at
        "#,
        )
        .bind(group_id)
        .bind(content)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await;

        match res {
            Ok(row) => Ok(row),
            Err(e) if is_foreign_key_violation(&e) => Err(CatalogError::NotFound("比较组不存在")),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_analysis(
        &self,
        pool: &SqlitePool,
        group_id: i64,
    ) -> Result<Option<DbComparisonAnalysis>, CatalogError> {
        let row = sqlx::query_as::<_, DbComparisonAnalysis>(
            r#"
        SELECT id, group_id, content, created_at, updated_at
        FROM comparison_analyses
        WHERE group_id = ?
        "#,
        )
        .bind(group_id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }
}

fn prefixed_columns(alias: &str) -> String {
    SOFTWARE_COLUMNS
        .split(", ")
        .map(|c| format!("{alias}.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `%`, `_` and `\` match literally under `ESCAPE '\'`.
fn escape_like(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation())
}

/// Spawn the database actor and return a cloneable handle.
///
/// The actor is left unregistered so several databases can be opened in one process.
pub async fn spawn(database_url: &str, cipher: SecretCipher) -> DbActorHandle {
    let (actor, _jh) = ractor::Actor::spawn(
        None,
        DbActor,
        (database_url.to_string(), cipher),
    )
    .await
    .expect("failed to spawn DbActor");

    DbActorHandle { actor }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), CatalogError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
