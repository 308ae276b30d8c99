//! Project state store
//!
//! One SQLite file per project directory records which agents, skills and
//! stack items are installed there.

pub mod error;

use chrono::{DateTime, Utc};
use engteam_types::{ProjectId, ProjectRecord, StackItem};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use error::{Result, StoreError};

/// Default database file name inside a project directory
pub const DB_FILE_NAME: &str = "engineering-team.db";

/// Schema version written by [`ProjectStore::initialize`]
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS projects (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        path TEXT UNIQUE NOT NULL,
        name TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS project_stack (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id INTEGER NOT NULL,
        stack_type TEXT NOT NULL,
        name TEXT NOT NULL,
        version TEXT,
        FOREIGN KEY (project_id) REFERENCES projects(id),
        UNIQUE(project_id, stack_type, name)
    );

    CREATE TABLE IF NOT EXISTS installed_agents (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id INTEGER NOT NULL,
        agent_name TEXT NOT NULL,
        installed_at TEXT NOT NULL,
        FOREIGN KEY (project_id) REFERENCES projects(id),
        UNIQUE(project_id, agent_name)
    );

    CREATE TABLE IF NOT EXISTS installed_skills (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id INTEGER NOT NULL,
        skill_name TEXT NOT NULL,
        installed_at TEXT NOT NULL,
        FOREIGN KEY (project_id) REFERENCES projects(id),
        UNIQUE(project_id, skill_name)
    );

    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER PRIMARY KEY
    );
"#;

/// Installed-resource tables share one shape
#[derive(Debug, Clone, Copy)]
enum Installed {
    Agents,
    Skills,
}

impl Installed {
    fn table(self) -> &'static str {
        match self {
            Installed::Agents => "installed_agents",
            Installed::Skills => "installed_skills",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Installed::Agents => "agent_name",
            Installed::Skills => "skill_name",
        }
    }

    fn upsert_sql(self) -> String {
        format!(
            "INSERT OR REPLACE INTO {} (project_id, {}, installed_at) VALUES (?, ?, ?)",
            self.table(),
            self.column()
        )
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn parse_timestamp(column: &'static str, value: String) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| StoreError::Timestamp {
            column,
            value,
            source,
        })
}

fn project_from_row(row: &SqliteRow) -> Result<ProjectRecord> {
    Ok(ProjectRecord {
        id: ProjectId(row.try_get("id")?),
        path: row.try_get("path")?,
        name: row.try_get("name")?,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
        updated_at: parse_timestamp("updated_at", row.try_get("updated_at")?)?,
    })
}

fn is_missing_table(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.message().contains("no such table"))
}

/// Key a project directory is stored under
pub fn project_key(project_dir: &Path) -> String {
    project_dir.to_string_lossy().into_owned()
}

/// Label recorded for a newly created project
fn default_label(project_dir: &Path) -> Option<String> {
    project_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Per-project SQLite state store
pub struct ProjectStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl ProjectStore {
    /// Database file location for a project directory
    pub fn database_path(project_dir: &Path, file_name: &str) -> PathBuf {
        project_dir.join(file_name)
    }

    /// Whether a database file exists for the project directory
    pub fn exists(project_dir: &Path, file_name: &str) -> bool {
        Self::database_path(project_dir, file_name).is_file()
    }

    /// Open the store, creating the database file if needed
    pub async fn open(project_dir: &Path, file_name: &str) -> Result<Self> {
        Self::connect(Self::database_path(project_dir, file_name), true).await
    }

    /// Open the store only if its database file already exists
    pub async fn open_existing(project_dir: &Path, file_name: &str) -> Result<Option<Self>> {
        if !Self::exists(project_dir, file_name) {
            debug!("No state store in {:?}", project_dir);
            return Ok(None);
        }
        Self::connect(Self::database_path(project_dir, file_name), false)
            .await
            .map(Some)
    }

    async fn connect(path: PathBuf, create: bool) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(create)
            .foreign_keys(true);

        // One connection per invocation
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        debug!("Opened state store {:?}", path);
        Ok(Self { pool, path })
    }

    /// Path of the underlying database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Create tables if missing and record the schema version on first use
    pub async fn initialize(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(SCHEMA).execute(&mut *tx).await?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
                .bind(CURRENT_SCHEMA_VERSION)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!("State store initialized: {:?}", self.path);
        Ok(())
    }

    /// Recorded schema version, `None` if the store was never initialized
    pub async fn schema_version(&self) -> Result<Option<i64>> {
        match sqlx::query_scalar::<_, i64>("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(&self.pool)
            .await
        {
            Ok(version) => Ok(version),
            Err(e) if is_missing_table(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the recorded schema version
    pub async fn set_schema_version(&self, version: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM schema_version")
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(version)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Projects
    // =========================================================================

    /// Insert a new project record
    pub async fn create_project(&self, project_dir: &Path, name: Option<&str>) -> Result<ProjectId> {
        let now = now();
        let result = sqlx::query(
            r#"
            INSERT INTO projects (path, name, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(project_key(project_dir))
        .bind(name)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(ProjectId(result.last_insert_rowid()))
    }

    /// Project record for a directory, if any
    pub async fn get_project(&self, project_dir: &Path) -> Result<Option<ProjectRecord>> {
        let row = match sqlx::query(
            "SELECT id, path, name, created_at, updated_at FROM projects WHERE path = ?",
        )
        .bind(project_key(project_dir))
        .fetch_optional(&self.pool)
        .await
        {
            Ok(row) => row,
            Err(e) if is_missing_table(&e) => None,
            Err(e) => return Err(e.into()),
        };

        row.as_ref().map(project_from_row).transpose()
    }

    /// Existing project id for a directory, or a freshly created one
    pub async fn get_or_create_project(&self, project_dir: &Path) -> Result<ProjectId> {
        let key = project_key(project_dir);
        let now = now();
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT OR IGNORE INTO projects (path, name, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&key)
        .bind(default_label(project_dir))
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let id: i64 = sqlx::query_scalar("SELECT id FROM projects WHERE path = ?")
            .bind(&key)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        if inserted.rows_affected() > 0 {
            info!("Created project record {} for {}", id, key);
        }
        Ok(ProjectId(id))
    }

    /// Set a project's `updated_at` to now
    pub async fn touch(&self, project: ProjectId) -> Result<()> {
        sqlx::query("UPDATE projects SET updated_at = ? WHERE id = ?")
            .bind(now())
            .bind(project.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Agents and skills
    // =========================================================================

    async fn add_installed(&self, kind: Installed, project: ProjectId, name: &str) -> Result<()> {
        sqlx::query(&kind.upsert_sql())
            .bind(project.0)
            .bind(name)
            .bind(now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_installed(&self, kind: Installed, project: ProjectId, name: &str) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE project_id = ? AND {} = ?",
            kind.table(),
            kind.column()
        );
        sqlx::query(&sql)
            .bind(project.0)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_installed(&self, kind: Installed, project: ProjectId) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE project_id = ?", kind.table());
        sqlx::query(&sql).bind(project.0).execute(&self.pool).await?;
        Ok(())
    }

    async fn list_installed(&self, kind: Installed, project: ProjectId) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT {col} FROM {table} WHERE project_id = ? ORDER BY {col}",
            col = kind.column(),
            table = kind.table()
        );
        match sqlx::query_scalar::<_, String>(&sql)
            .bind(project.0)
            .fetch_all(&self.pool)
            .await
        {
            Ok(names) => Ok(names),
            Err(e) if is_missing_table(&e) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn replace_installed(
        &self,
        kind: Installed,
        project: ProjectId,
        names: &[String],
    ) -> Result<()> {
        let now = now();
        let upsert = kind.upsert_sql();
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DELETE FROM {} WHERE project_id = ?", kind.table()))
            .bind(project.0)
            .execute(&mut *tx)
            .await?;

        for name in names {
            sqlx::query(&upsert)
                .bind(project.0)
                .bind(name)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!(
            "Replaced {} for project {} with {} entries",
            kind.table(),
            project,
            names.len()
        );
        Ok(())
    }

    /// Add an agent; adding it again is a no-op
    pub async fn add_agent(&self, project: ProjectId, agent_name: &str) -> Result<()> {
        self.add_installed(Installed::Agents, project, agent_name).await
    }

    pub async fn remove_agent(&self, project: ProjectId, agent_name: &str) -> Result<()> {
        self.remove_installed(Installed::Agents, project, agent_name).await
    }

    pub async fn clear_agents(&self, project: ProjectId) -> Result<()> {
        self.clear_installed(Installed::Agents, project).await
    }

    /// Installed agent names, sorted
    pub async fn agents(&self, project: ProjectId) -> Result<Vec<String>> {
        self.list_installed(Installed::Agents, project).await
    }

    /// Replace the agent set in a single transaction
    pub async fn set_agents(&self, project: ProjectId, agent_names: &[String]) -> Result<()> {
        self.replace_installed(Installed::Agents, project, agent_names).await
    }

    /// Add a skill; adding it again is a no-op
    pub async fn add_skill(&self, project: ProjectId, skill_name: &str) -> Result<()> {
        self.add_installed(Installed::Skills, project, skill_name).await
    }

    pub async fn remove_skill(&self, project: ProjectId, skill_name: &str) -> Result<()> {
        self.remove_installed(Installed::Skills, project, skill_name).await
    }

    pub async fn clear_skills(&self, project: ProjectId) -> Result<()> {
        self.clear_installed(Installed::Skills, project).await
    }

    /// Installed skill names, sorted
    pub async fn skills(&self, project: ProjectId) -> Result<Vec<String>> {
        self.list_installed(Installed::Skills, project).await
    }

    /// Replace the skill set in a single transaction
    pub async fn set_skills(&self, project: ProjectId, skill_names: &[String]) -> Result<()> {
        self.replace_installed(Installed::Skills, project, skill_names).await
    }

    // =========================================================================
    // Stack
    // =========================================================================

    /// Add a stack item, replacing the version of an existing (type, name) pair
    pub async fn add_stack_item(&self, project: ProjectId, item: &StackItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO project_stack (project_id, stack_type, name, version)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(project.0)
        .bind(&item.stack_type)
        .bind(&item.name)
        .bind(&item.version)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn clear_stack(&self, project: ProjectId) -> Result<()> {
        sqlx::query("DELETE FROM project_stack WHERE project_id = ?")
            .bind(project.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Stack items ordered by type then name
    pub async fn stack(&self, project: ProjectId) -> Result<Vec<StackItem>> {
        let rows = sqlx::query(
            r#"
            SELECT stack_type, name, version FROM project_stack
            WHERE project_id = ?
            ORDER BY stack_type, name
            "#,
        )
        .bind(project.0)
        .fetch_all(&self.pool)
        .await;
        let rows = match rows {
            Ok(rows) => rows,
            Err(e) if is_missing_table(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        rows.iter()
            .map(|row| -> Result<StackItem> {
                Ok(StackItem {
                    stack_type: row.try_get("stack_type")?,
                    name: row.try_get("name")?,
                    version: row.try_get("version")?,
                })
            })
            .collect()
    }

    /// Replace the stack in a single transaction
    pub async fn set_stack(&self, project: ProjectId, items: &[StackItem]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM project_stack WHERE project_id = ?")
            .bind(project.0)
            .execute(&mut *tx)
            .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO project_stack (project_id, stack_type, name, version)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(project.0)
            .bind(&item.stack_type)
            .bind(&item.name)
            .bind(&item.version)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn initialized(temp: &TempDir) -> ProjectStore {
        let store = ProjectStore::open(temp.path(), DB_FILE_NAME).await.unwrap();
        store.initialize().await.unwrap();
        store
    }

    #[test]
    fn test_database_path() {
        let dir = Path::new("/tmp/project");
        assert_eq!(
            ProjectStore::database_path(dir, DB_FILE_NAME),
            PathBuf::from("/tmp/project/engineering-team.db")
        );
    }

    #[tokio::test]
    async fn test_exists_and_open_existing() {
        let temp = TempDir::new().unwrap();
        assert!(!ProjectStore::exists(temp.path(), DB_FILE_NAME));
        assert!(ProjectStore::open_existing(temp.path(), DB_FILE_NAME)
            .await
            .unwrap()
            .is_none());
        // open_existing must not create the file
        assert!(!ProjectStore::exists(temp.path(), DB_FILE_NAME));

        initialized(&temp).await.close().await;
        assert!(ProjectStore::exists(temp.path(), DB_FILE_NAME));
        assert!(ProjectStore::open_existing(temp.path(), DB_FILE_NAME)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_schema_version() {
        let temp = TempDir::new().unwrap();
        let store = ProjectStore::open(temp.path(), DB_FILE_NAME).await.unwrap();
        assert_eq!(store.schema_version().await.unwrap(), None);

        store.initialize().await.unwrap();
        assert_eq!(
            store.schema_version().await.unwrap(),
            Some(CURRENT_SCHEMA_VERSION)
        );

        store.set_schema_version(2).await.unwrap();
        assert_eq!(store.schema_version().await.unwrap(), Some(2));

        // Re-initializing keeps the recorded version
        store.initialize().await.unwrap();
        assert_eq!(store.schema_version().await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_create_and_get_project() {
        let temp = TempDir::new().unwrap();
        let store = initialized(&temp).await;

        let id = store
            .create_project(temp.path(), Some("test-project"))
            .await
            .unwrap();
        assert!(id.0 > 0);

        let project = store.get_project(temp.path()).await.unwrap().unwrap();
        assert_eq!(project.id, id);
        assert_eq!(project.path, project_key(temp.path()));
        assert_eq!(project.name.as_deref(), Some("test-project"));
        assert_eq!(project.created_at, project.updated_at);
    }

    #[tokio::test]
    async fn test_get_project_not_found() {
        let temp = TempDir::new().unwrap();
        let store = initialized(&temp).await;
        assert!(store.get_project(temp.path()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_project_before_initialize() {
        let temp = TempDir::new().unwrap();
        let store = ProjectStore::open(temp.path(), DB_FILE_NAME).await.unwrap();
        assert!(store.get_project(temp.path()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reads_before_initialize_are_empty() {
        let temp = TempDir::new().unwrap();
        let store = ProjectStore::open(temp.path(), DB_FILE_NAME).await.unwrap();
        let project = ProjectId(1);

        assert!(store.agents(project).await.unwrap().is_empty());
        assert!(store.skills(project).await.unwrap().is_empty());
        assert!(store.stack(project).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_path_rejected() {
        let temp = TempDir::new().unwrap();
        let store = initialized(&temp).await;
        store.create_project(temp.path(), None).await.unwrap();
        assert!(store.create_project(temp.path(), None).await.is_err());
    }

    #[tokio::test]
    async fn test_get_or_create_project() {
        let temp = TempDir::new().unwrap();
        let store = initialized(&temp).await;

        let first = store.get_or_create_project(temp.path()).await.unwrap();
        let second = store.get_or_create_project(temp.path()).await.unwrap();
        assert_eq!(first, second);

        let project = store.get_project(temp.path()).await.unwrap().unwrap();
        assert_eq!(project.name, default_label(temp.path()));
    }

    #[tokio::test]
    async fn test_touch_updates_timestamp() {
        let temp = TempDir::new().unwrap();
        let store = initialized(&temp).await;
        let id = store.get_or_create_project(temp.path()).await.unwrap();
        let before = store.get_project(temp.path()).await.unwrap().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        store.touch(id).await.unwrap();

        let after = store.get_project(temp.path()).await.unwrap().unwrap();
        assert!(after.updated_at > before.updated_at);
        assert_eq!(after.created_at, before.created_at);
    }

    #[tokio::test]
    async fn test_agents() {
        let temp = TempDir::new().unwrap();
        let store = initialized(&temp).await;
        let id = store.get_or_create_project(temp.path()).await.unwrap();

        store.add_agent(id, "code-reviewer").await.unwrap();
        store.add_agent(id, "backend-architect").await.unwrap();
        assert_eq!(
            store.agents(id).await.unwrap(),
            vec!["backend-architect", "code-reviewer"]
        );

        store.remove_agent(id, "backend-architect").await.unwrap();
        assert_eq!(store.agents(id).await.unwrap(), vec!["code-reviewer"]);

        store.clear_agents(id).await.unwrap();
        assert!(store.agents(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_agent_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = initialized(&temp).await;
        let id = store.get_or_create_project(temp.path()).await.unwrap();

        store.add_agent(id, "a1").await.unwrap();
        store.add_agent(id, "a1").await.unwrap();
        assert_eq!(store.agents(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_set_skills_replaces_and_collapses_duplicates() {
        let temp = TempDir::new().unwrap();
        let store = initialized(&temp).await;
        let id = store.get_or_create_project(temp.path()).await.unwrap();

        store.add_skill(id, "typescript").await.unwrap();
        let replacement: Vec<String> = ["rust", "python", "rust"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        store.set_skills(id, &replacement).await.unwrap();
        assert_eq!(store.skills(id).await.unwrap(), vec!["python", "rust"]);

        store.set_skills(id, &[]).await.unwrap();
        assert!(store.skills(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stack() {
        let temp = TempDir::new().unwrap();
        let store = initialized(&temp).await;
        let id = store.get_or_create_project(temp.path()).await.unwrap();

        store
            .add_stack_item(id, &StackItem::new("language", "Python").with_version("3.12"))
            .await
            .unwrap();
        store
            .add_stack_item(id, &StackItem::new("cloud", "AWS"))
            .await
            .unwrap();
        store
            .add_stack_item(id, &StackItem::new("language", "Python").with_version("3.13"))
            .await
            .unwrap();

        let stack = store.stack(id).await.unwrap();
        assert_eq!(
            stack,
            vec![
                StackItem::new("cloud", "AWS"),
                StackItem::new("language", "Python").with_version("3.13"),
            ]
        );

        store
            .set_stack(
                id,
                &[
                    StackItem::new("language", "TypeScript"),
                    StackItem::new("framework", "React"),
                ],
            )
            .await
            .unwrap();
        let names: Vec<String> = store
            .stack(id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["React", "TypeScript"]);

        store.clear_stack(id).await.unwrap();
        assert!(store.stack(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reads_for_unknown_project_are_empty() {
        let temp = TempDir::new().unwrap();
        let store = initialized(&temp).await;
        let ghost = ProjectId(999);
        assert!(store.agents(ghost).await.unwrap().is_empty());
        assert!(store.skills(ghost).await.unwrap().is_empty());
        assert!(store.stack(ghost).await.unwrap().is_empty());
    }
}
