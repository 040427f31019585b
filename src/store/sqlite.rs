use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Maps unique and primary-key violations to AlreadyExists; everything else
/// stays a database error.
fn map_constraint_err(err: rusqlite::Error) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            Error::AlreadyExists
        }
        _ => Error::from(err),
    }
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO users (id, username, email, password_hash, organization, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    user.id,
                    user.username,
                    user.email,
                    user.password_hash,
                    user.organization,
                    format_datetime(&user.created_at),
                    format_datetime(&user.updated_at),
                ],
            )
            .map_err(map_constraint_err)?;
        Ok(())
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, email, password_hash, organization, created_at, updated_at
             FROM users WHERE id = ?1",
            params![id],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    password_hash: row.get(3)?,
                    organization: row.get(4)?,
                    created_at: parse_datetime(&row.get::<_, String>(5)?),
                    updated_at: parse_datetime(&row.get::<_, String>(6)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, email, password_hash, organization, created_at, updated_at
             FROM users WHERE email = ?1",
            params![email],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    password_hash: row.get(3)?,
                    organization: row.get(4)?,
                    created_at: parse_datetime(&row.get::<_, String>(5)?),
                    updated_at: parse_datetime(&row.get::<_, String>(6)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE users SET username = ?1, email = ?2, password_hash = ?3, organization = ?4, updated_at = ?5
                 WHERE id = ?6",
                params![
                    user.username,
                    user.email,
                    user.password_hash,
                    user.organization,
                    format_datetime(&user.updated_at),
                    user.id,
                ],
            )
            .map_err(map_constraint_err)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_user(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Repo operations

    fn create_repo(&self, repo: &Repo) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO repos (id, name, owner_id, srs_file, source_file, extraction_status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                repo.id,
                repo.name,
                repo.owner_id,
                repo.srs_file,
                repo.source_file,
                repo.extraction.map(ExtractionStatus::as_str),
                format_datetime(&repo.created_at),
                format_datetime(&repo.updated_at),
            ],
        )
        .map_err(map_constraint_err)?;

        // The owner is always a member
        tx.execute(
            "INSERT INTO repo_members (repo_id, user_id, added_at) VALUES (?1, ?2, ?3)",
            params![repo.id, repo.owner_id, format_datetime(&repo.created_at)],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn get_repo(&self, id: &str) -> Result<Option<Repo>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, owner_id, srs_file, source_file, extraction_status, created_at, updated_at
             FROM repos WHERE id = ?1",
            params![id],
            |row| {
                Ok(Repo {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    owner_id: row.get(2)?,
                    srs_file: row.get(3)?,
                    source_file: row.get(4)?,
                    extraction: row
                        .get::<_, Option<String>>(5)?
                        .and_then(|s| ExtractionStatus::parse(&s)),
                    created_at: parse_datetime(&row.get::<_, String>(6)?),
                    updated_at: parse_datetime(&row.get::<_, String>(7)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_repo_by_name(&self, name: &str) -> Result<Option<Repo>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, owner_id, srs_file, source_file, extraction_status, created_at, updated_at
             FROM repos WHERE name = ?1",
            params![name],
            |row| {
                Ok(Repo {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    owner_id: row.get(2)?,
                    srs_file: row.get(3)?,
                    source_file: row.get(4)?,
                    extraction: row
                        .get::<_, Option<String>>(5)?
                        .and_then(|s| ExtractionStatus::parse(&s)),
                    created_at: parse_datetime(&row.get::<_, String>(6)?),
                    updated_at: parse_datetime(&row.get::<_, String>(7)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_repos(&self) -> Result<Vec<RepoWithOwner>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT r.id, r.name, r.owner_id, r.srs_file, r.source_file, r.extraction_status,
                    r.created_at, r.updated_at, u.username, u.email
             FROM repos r
             JOIN users u ON u.id = r.owner_id
             ORDER BY r.name",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(RepoWithOwner {
                repo: Repo {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    owner_id: row.get(2)?,
                    srs_file: row.get(3)?,
                    source_file: row.get(4)?,
                    extraction: row
                        .get::<_, Option<String>>(5)?
                        .and_then(|s| ExtractionStatus::parse(&s)),
                    created_at: parse_datetime(&row.get::<_, String>(6)?),
                    updated_at: parse_datetime(&row.get::<_, String>(7)?),
                },
                owner: UserSummary {
                    id: row.get(2)?,
                    username: row.get(8)?,
                    email: row.get(9)?,
                },
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_repos_for_user(&self, user_id: &str) -> Result<Vec<Repo>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT r.id, r.name, r.owner_id, r.srs_file, r.source_file, r.extraction_status,
                    r.created_at, r.updated_at
             FROM repos r
             JOIN repo_members m ON m.repo_id = r.id
             WHERE m.user_id = ?1
             ORDER BY r.name",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            Ok(Repo {
                id: row.get(0)?,
                name: row.get(1)?,
                owner_id: row.get(2)?,
                srs_file: row.get(3)?,
                source_file: row.get(4)?,
                extraction: row
                    .get::<_, Option<String>>(5)?
                    .and_then(|s| ExtractionStatus::parse(&s)),
                created_at: parse_datetime(&row.get::<_, String>(6)?),
                updated_at: parse_datetime(&row.get::<_, String>(7)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_repo_file(&self, id: &str, kind: FileKind, file: &str) -> Result<()> {
        let sql = match kind {
            FileKind::Srs => "UPDATE repos SET srs_file = ?1, updated_at = ?2 WHERE id = ?3",
            FileKind::SourceCode => {
                "UPDATE repos SET source_file = ?1, updated_at = ?2 WHERE id = ?3"
            }
        };

        let rows = self
            .conn()
            .execute(sql, params![file, format_datetime(&Utc::now()), id])?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn update_extraction_status(&self, id: &str, status: ExtractionStatus) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE repos SET extraction_status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), format_datetime(&Utc::now()), id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    // Membership and access requests

    fn is_member(&self, repo_id: &str, user_id: &str) -> Result<bool> {
        let conn = self.conn();
        let present: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM repo_members WHERE repo_id = ?1 AND user_id = ?2",
                params![repo_id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(present.is_some())
    }

    fn add_access_request(&self, repo_id: &str, user_id: &str) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        // Members never re-enter the request set
        let member: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM repo_members WHERE repo_id = ?1 AND user_id = ?2",
                params![repo_id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        if member.is_some() {
            return Err(Error::AlreadyExists);
        }

        tx.execute(
            "INSERT INTO repo_requests (repo_id, user_id, requested_at) VALUES (?1, ?2, ?3)",
            params![repo_id, user_id, format_datetime(&Utc::now())],
        )
        .map_err(map_constraint_err)?;

        tx.commit()?;
        Ok(())
    }

    fn resolve_access_request(&self, repo_id: &str, user_id: &str, approve: bool) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        // The pending entry goes away on both approve and reject
        let removed = tx.execute(
            "DELETE FROM repo_requests WHERE repo_id = ?1 AND user_id = ?2",
            params![repo_id, user_id],
        )?;
        if removed == 0 {
            return Ok(false);
        }

        if approve {
            tx.execute(
                "INSERT OR IGNORE INTO repo_members (repo_id, user_id, added_at) VALUES (?1, ?2, ?3)",
                params![repo_id, user_id, format_datetime(&Utc::now())],
            )?;
        }

        tx.commit()?;
        Ok(true)
    }

    fn list_access_requests(&self, repo_id: &str) -> Result<Vec<UserSummary>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT u.id, u.username, u.email
             FROM repo_requests q
             JOIN users u ON u.id = q.user_id
             WHERE q.repo_id = ?1
             ORDER BY q.requested_at, u.id",
        )?;

        let rows = stmt.query_map(params![repo_id], |row| {
            Ok(UserSummary {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Upload history

    fn append_history(
        &self,
        repo_id: &str,
        user_id: &str,
        kind: FileKind,
        action: &str,
        file: &str,
    ) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO upload_history (repo_id, user_id, kind, action, file, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                repo_id,
                user_id,
                kind.as_str(),
                action,
                file,
                format_datetime(&Utc::now()),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn list_history(&self, repo_id: &str, kind: FileKind) -> Result<Vec<UploadRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT h.id, h.kind, h.action, h.file, h.created_at, u.id, u.username, u.email
             FROM upload_history h
             JOIN users u ON u.id = h.user_id
             WHERE h.repo_id = ?1 AND h.kind = ?2
             ORDER BY h.id",
        )?;

        let rows = stmt.query_map(params![repo_id, kind.as_str()], |row| {
            Ok(UploadRecord {
                id: row.get(0)?,
                kind: FileKind::parse(&row.get::<_, String>(1)?).unwrap_or(kind),
                action: row.get(2)?,
                file: row.get(3)?,
                created_at: parse_datetime(&row.get::<_, String>(4)?),
                user: UserSummary {
                    id: row.get(5)?,
                    username: row.get(6)?,
                    email: row.get(7)?,
                },
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn count_history(&self, repo_id: &str) -> Result<i64> {
        let conn = self.conn();
        conn.query_row(
            "SELECT COUNT(*) FROM upload_history WHERE repo_id = ?1",
            params![repo_id],
            |row| row.get(0),
        )
        .map_err(Error::from)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
