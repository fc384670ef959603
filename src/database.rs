//! SQLite backends for the central repository and the active case database
//!
//! Handles:
//! - Correlation cases and data sources
//! - Correlation attribute instances (values seen per case / data source)
//! - Case data sources and file records

use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::case::{AbstractFile, CaseFileStore};
use crate::correlation::{
    CentralRepository, CorrelationAttributeInstance, CorrelationAttributeType, CorrelationCase,
    CorrelationDataSource, InterCaseValues, KnownStatus,
};
use crate::error::CorrelationResult;

fn open_connection(db_path: &Path) -> SqlResult<Connection> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    Connection::open(db_path)
}

fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Central Repository
// ============================================================================

/// Central repository stored in a SQLite file
pub struct SqliteCentralRepository {
    conn: Mutex<Connection>,
}

const INSTANCE_SELECT: &str = "
    SELECT i.id, i.type_id, i.value, i.file_path, i.known_status, i.comment,
           c.id, c.case_uid, c.display_name,
           d.id, d.case_id, d.device_id, d.name
    FROM attribute_instances i
    JOIN cases c ON i.case_id = c.id
    JOIN data_sources d ON i.data_source_id = d.id";

fn row_to_case(row: &Row<'_>) -> SqlResult<CorrelationCase> {
    Ok(CorrelationCase {
        id: row.get(0)?,
        case_uid: row.get(1)?,
        display_name: row.get(2)?,
    })
}

fn row_to_instance(row: &Row<'_>) -> SqlResult<CorrelationAttributeInstance> {
    let type_id: i64 = row.get(1)?;
    let attribute_type = CorrelationAttributeType::from_id(type_id).ok_or_else(|| {
        rusqlite::Error::IntegralValueOutOfRange(1, type_id)
    })?;
    let known: i64 = row.get(4)?;

    Ok(CorrelationAttributeInstance {
        id: row.get(0)?,
        attribute_type,
        value: row.get(2)?,
        file_path: row.get(3)?,
        known_status: KnownStatus::from_id(known),
        comment: row.get(5)?,
        case: CorrelationCase {
            id: row.get(6)?,
            case_uid: row.get(7)?,
            display_name: row.get(8)?,
        },
        data_source: CorrelationDataSource {
            id: row.get(9)?,
            case_id: row.get(10)?,
            device_id: row.get(11)?,
            name: row.get(12)?,
        },
    })
}

impl SqliteCentralRepository {
    /// Open (or create) the repository at the given path
    pub fn open(db_path: &Path) -> SqlResult<Self> {
        let repo = Self {
            conn: Mutex::new(open_connection(db_path)?),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    pub fn open_in_memory() -> SqlResult<Self> {
        let repo = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    fn init_schema(&self) -> SqlResult<()> {
        let conn = lock(&self.conn);

        conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS cases (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                case_uid TEXT NOT NULL UNIQUE,
                display_name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS data_sources (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                case_id INTEGER NOT NULL,
                device_id TEXT NOT NULL,
                name TEXT NOT NULL,
                FOREIGN KEY (case_id) REFERENCES cases(id) ON DELETE CASCADE,
                UNIQUE(case_id, device_id)
            );

            -- One row per attribute occurrence
            CREATE TABLE IF NOT EXISTS attribute_instances (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type_id INTEGER NOT NULL,
                case_id INTEGER NOT NULL,
                data_source_id INTEGER NOT NULL,
                value TEXT NOT NULL,
                file_path TEXT NOT NULL,
                known_status INTEGER NOT NULL DEFAULT 0,
                comment TEXT,
                FOREIGN KEY (case_id) REFERENCES cases(id) ON DELETE CASCADE,
                FOREIGN KEY (data_source_id) REFERENCES data_sources(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_instances_value ON attribute_instances(value);
            CREATE INDEX IF NOT EXISTS idx_instances_case ON attribute_instances(case_id);
            CREATE INDEX IF NOT EXISTS idx_data_sources_case ON data_sources(case_id);
        "#)?;

        Ok(())
    }

    pub fn create_case(&self, case_uid: &str, display_name: &str) -> SqlResult<CorrelationCase> {
        let conn = lock(&self.conn);
        conn.execute(
            "INSERT INTO cases (case_uid, display_name) VALUES (?1, ?2)",
            params![case_uid, display_name],
        )?;

        Ok(CorrelationCase {
            id: conn.last_insert_rowid(),
            case_uid: case_uid.to_string(),
            display_name: display_name.to_string(),
        })
    }

    pub fn create_data_source(
        &self,
        case_id: i64,
        device_id: &str,
        name: &str,
    ) -> SqlResult<CorrelationDataSource> {
        let conn = lock(&self.conn);
        conn.execute(
            "INSERT INTO data_sources (case_id, device_id, name) VALUES (?1, ?2, ?3)",
            params![case_id, device_id, name],
        )?;

        Ok(CorrelationDataSource {
            id: conn.last_insert_rowid(),
            case_id,
            device_id: device_id.to_string(),
            name: name.to_string(),
        })
    }

    /// Record an attribute occurrence and return its instance id
    pub fn add_attribute_instance(
        &self,
        attribute_type: CorrelationAttributeType,
        data_source: &CorrelationDataSource,
        value: &str,
        file_path: &str,
        known_status: KnownStatus,
    ) -> SqlResult<i64> {
        let conn = lock(&self.conn);
        conn.execute(
            "INSERT INTO attribute_instances (type_id, case_id, data_source_id, value, file_path, known_status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                attribute_type.id(), data_source.case_id, data_source.id,
                value.to_lowercase(), file_path, known_status.id()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

impl CentralRepository for SqliteCentralRepository {
    fn get_case_by_id(&self, case_id: i64) -> CorrelationResult<Option<CorrelationCase>> {
        let conn = lock(&self.conn);
        let case = conn
            .query_row(
                "SELECT id, case_uid, display_name FROM cases WHERE id = ?1",
                params![case_id],
                row_to_case,
            )
            .optional()?;
        Ok(case)
    }

    fn get_cases(&self) -> CorrelationResult<Vec<CorrelationCase>> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare("SELECT id, case_uid, display_name FROM cases ORDER BY id")?;
        let rows = stmt.query_map([], row_to_case)?;
        Ok(rows.collect::<SqlResult<Vec<_>>>()?)
    }

    fn get_attribute_instance(
        &self,
        attribute_id: i64,
    ) -> CorrelationResult<Option<CorrelationAttributeInstance>> {
        let conn = lock(&self.conn);
        let sql = format!("{} WHERE i.id = ?1", INSTANCE_SELECT);
        let instance = conn
            .query_row(&sql, params![attribute_id], row_to_instance)
            .optional()?;
        Ok(instance)
    }

    fn find_intercase_values(
        &self,
        current_case_id: i64,
        target_case_id: Option<i64>,
    ) -> CorrelationResult<InterCaseValues> {
        let conn = lock(&self.conn);
        let files = CorrelationAttributeType::Files.id();
        let known = KnownStatus::Known.id();

        let sql = if target_case_id.is_some() {
            "SELECT id, value, case_id FROM attribute_instances
             WHERE type_id = ?1 AND known_status != ?2
               AND (case_id = ?3 OR case_id = ?4)
               AND value IN (SELECT value FROM attribute_instances
                             WHERE case_id = ?3 AND type_id = ?1 AND known_status != ?2)
               AND value IN (SELECT value FROM attribute_instances
                             WHERE case_id = ?4 AND type_id = ?1 AND known_status != ?2)
               AND value IN (SELECT value FROM attribute_instances
                             WHERE type_id = ?1 AND known_status != ?2
                               AND (case_id = ?3 OR case_id = ?4)
                             GROUP BY value
                             HAVING COUNT(DISTINCT case_id || ':' || data_source_id) > 1)
             ORDER BY id"
        } else {
            "SELECT id, value, case_id FROM attribute_instances
             WHERE type_id = ?1 AND known_status != ?2
               AND value IN (SELECT value FROM attribute_instances
                             WHERE case_id = ?3 AND type_id = ?1 AND known_status != ?2)
               AND value IN (SELECT value FROM attribute_instances
                             WHERE type_id = ?1 AND known_status != ?2
                             GROUP BY value
                             HAVING COUNT(DISTINCT case_id || ':' || data_source_id) > 1)
             ORDER BY id"
        };

        let mut stmt = conn.prepare(sql)?;
        let mut rows = if let Some(target) = target_case_id {
            stmt.query(params![files, known, current_case_id, target])?
        } else {
            stmt.query(params![files, known, current_case_id])?
        };

        let mut result = InterCaseValues::default();
        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            let value: String = row.get(1)?;
            let case_id: i64 = row.get(2)?;
            result.insert(id, value, case_id);
        }

        tracing::debug!(
            current_case_id,
            target_case_id = ?target_case_id,
            rows = result.len(),
            "Loaded inter-case common values"
        );
        Ok(result)
    }

    fn count_unique_data_sources(&self) -> CorrelationResult<u64> {
        let conn = lock(&self.conn);
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM data_sources", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn count_data_sources_with_value(&self, value: &str) -> CorrelationResult<u64> {
        let conn = lock(&self.conn);
        let count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT data_source_id) FROM attribute_instances
             WHERE value = ?1 AND type_id = ?2",
            params![value.to_lowercase(), CorrelationAttributeType::Files.id()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

// ============================================================================
// Case Database
// ============================================================================

/// Active case database stored in a SQLite file
pub struct SqliteCaseDatabase {
    conn: Mutex<Connection>,
}

const FILE_SELECT: &str = "
    SELECT f.obj_id, f.name, f.parent_path, f.data_source_obj_id, d.name,
           f.md5, f.mime_type, f.size
    FROM files f
    JOIN data_sources d ON f.data_source_obj_id = d.obj_id";

fn row_to_file(row: &Row<'_>) -> SqlResult<AbstractFile> {
    Ok(AbstractFile {
        object_id: row.get(0)?,
        name: row.get(1)?,
        parent_path: row.get(2)?,
        data_source_id: row.get(3)?,
        data_source_name: row.get(4)?,
        md5: row.get(5)?,
        mime_type: row.get(6)?,
        size: row.get(7)?,
    })
}

impl SqliteCaseDatabase {
    pub fn open(db_path: &Path) -> SqlResult<Self> {
        let db = Self {
            conn: Mutex::new(open_connection(db_path)?),
        };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> SqlResult<Self> {
        let db = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> SqlResult<()> {
        let conn = lock(&self.conn);

        conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS data_sources (
                obj_id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS files (
                obj_id INTEGER PRIMARY KEY,
                data_source_obj_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                parent_path TEXT NOT NULL,
                md5 TEXT,
                mime_type TEXT,
                size INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (data_source_obj_id) REFERENCES data_sources(obj_id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_files_md5 ON files(md5);
            CREATE INDEX IF NOT EXISTS idx_files_name ON files(name);
        "#)?;

        Ok(())
    }

    pub fn add_data_source(&self, obj_id: i64, name: &str) -> SqlResult<()> {
        let conn = lock(&self.conn);
        conn.execute(
            "INSERT INTO data_sources (obj_id, name) VALUES (?1, ?2)",
            params![obj_id, name],
        )?;
        Ok(())
    }

    /// Insert a file record; `data_source_name` is taken from the data source table
    pub fn insert_file(&self, file: &AbstractFile) -> SqlResult<()> {
        let conn = lock(&self.conn);
        conn.execute(
            "INSERT INTO files (obj_id, data_source_obj_id, name, parent_path, md5, mime_type, size)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                file.object_id, file.data_source_id, file.name, file.parent_path,
                file.md5.as_deref().map(str::to_lowercase), file.mime_type, file.size
            ],
        )?;
        Ok(())
    }
}

impl CaseFileStore for SqliteCaseDatabase {
    fn get_file_by_id(&self, object_id: i64) -> CorrelationResult<Option<AbstractFile>> {
        let conn = lock(&self.conn);
        let sql = format!("{} WHERE f.obj_id = ?1", FILE_SELECT);
        let file = conn.query_row(&sql, params![object_id], row_to_file).optional()?;
        Ok(file)
    }

    fn find_files(
        &self,
        data_source_name: &str,
        parent_path: &str,
        name: &str,
    ) -> CorrelationResult<Vec<AbstractFile>> {
        let conn = lock(&self.conn);
        let sql = format!(
            "{} WHERE lower(d.name) = lower(?1) AND lower(f.parent_path) = lower(?2)
               AND lower(f.name) = lower(?3)
             ORDER BY f.obj_id",
            FILE_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![data_source_name, parent_path, name], row_to_file)?;
        Ok(rows.collect::<SqlResult<Vec<_>>>()?)
    }

    fn files_with_md5(&self) -> CorrelationResult<Vec<AbstractFile>> {
        let conn = lock(&self.conn);
        let sql = format!("{} WHERE f.md5 IS NOT NULL AND f.md5 != '' ORDER BY f.obj_id", FILE_SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_file)?;
        Ok(rows.collect::<SqlResult<Vec<_>>>()?)
    }
}

// ============================================================================
// Global Central Repository Instance
// ============================================================================

static CENTRAL_REPO: OnceLock<SqliteCentralRepository> = OnceLock::new();

/// Default location of the central repository database
pub fn default_central_repo_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("com.ffxcheck.app")
        .join("central_repository.db")
}

/// Open the process-wide central repository; later calls keep the first instance
pub fn init_central_repository(db_path: &Path) -> SqlResult<&'static SqliteCentralRepository> {
    if let Some(repo) = CENTRAL_REPO.get() {
        return Ok(repo);
    }
    tracing::info!("Initializing central repository at: {:?}", db_path);
    let repo = SqliteCentralRepository::open(db_path)?;
    Ok(CENTRAL_REPO.get_or_init(|| repo))
}
