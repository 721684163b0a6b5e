use super::traits::{IdentityRepository, StatusUpdate, StatusWrite};
use crate::types::{
    AppError, Buyer, Developer, NewBuyer, NewDeveloper, Result, Role, VerificationStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{params::IntoParams, Builder, Connection, Database, Row, Rows};

/// Message raised by the cross-table triggers. Shares the prefix of SQLite's
/// own unique violation so both are detected the same way.
const CROSS_TABLE_VIOLATION: &str = "UNIQUE constraint failed: identity email";

const BUYER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, role, is_active, created_at, updated_at";

const DEVELOPER_COLUMNS: &str = "id, email, password_hash, company_name, contact_person, phone, \
     address, website, verification_status, rejection_reason, created_at, updated_at";

/// libsql-backed identity store.
///
/// In-memory databases exist per connection, so memory mode keeps one shared
/// connection for the lifetime of the client. File and remote modes open a
/// connection per operation.
pub struct TursoClient {
    db: Database,
    shared: Option<Connection>,
    file_backed: bool,
}

impl TursoClient {
    /// Ephemeral in-memory database with the schema applied.
    pub async fn new_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open in-memory database: {}", e)))?;
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        let client = Self {
            db,
            shared: Some(conn),
            file_backed: false,
        };
        client.initialize_schema().await?;

        Ok(client)
    }

    /// File-backed SQLite database. `:memory:` is accepted as an alias for
    /// [`TursoClient::new_memory`].
    pub async fn new_local(path: &str) -> Result<Self> {
        if path == ":memory:" {
            return Self::new_memory().await;
        }

        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::Database(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database {}: {}", path, e)))?;

        let client = Self {
            db,
            shared: None,
            file_backed: true,
        };
        client.initialize_schema().await?;

        Ok(client)
    }

    /// Remote Turso database.
    #[cfg(feature = "turso")]
    pub async fn new_remote(url: String, auth_token: String) -> Result<Self> {
        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Turso: {}", e)))?;

        let client = Self {
            db,
            shared: None,
            file_backed: false,
        };
        client.initialize_schema().await?;

        Ok(client)
    }

    pub fn connection(&self) -> Result<Connection> {
        if let Some(conn) = &self.shared {
            return Ok(conn.clone());
        }
        self.db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))
    }

    /// Connection ready for a single operation. File databases wait on a
    /// locked writer instead of failing immediately.
    async fn operation_conn(&self) -> Result<Connection> {
        let conn = self.connection()?;
        if self.file_backed {
            conn.query("PRAGMA busy_timeout = 5000", ())
                .await
                .map_err(|e| AppError::Database(format!("Failed to set busy timeout: {}", e)))?;
        }
        Ok(conn)
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.operation_conn().await?;

        // Buyers and admins
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password_hash TEXT NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'buyer' CHECK (role IN ('buyer', 'admin')),
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

        // Developers
        conn.execute(
            "CREATE TABLE IF NOT EXISTS developers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password_hash TEXT NOT NULL,
                company_name TEXT NOT NULL,
                contact_person TEXT NOT NULL,
                phone TEXT NOT NULL,
                address TEXT NOT NULL,
                website TEXT,
                verification_status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (verification_status IN ('pending', 'verified', 'rejected')),
                rejection_reason TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create developers table: {}", e)))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_developers_status
             ON developers (verification_status)",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create status index: {}", e)))?;

        // One email namespace across both tables. Each insert checks the
        // other table inside the same statement.
        for (name, table, other) in [
            ("users_email_not_in_developers", "users", "developers"),
            ("developers_email_not_in_users", "developers", "users"),
        ] {
            conn.execute(
                &format!(
                    "CREATE TRIGGER IF NOT EXISTS {name}
                     BEFORE INSERT ON {table}
                     WHEN EXISTS (SELECT 1 FROM {other} WHERE email = NEW.email)
                     BEGIN
                         SELECT RAISE(ABORT, '{CROSS_TABLE_VIOLATION}');
                     END",
                ),
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create trigger {}: {}", name, e)))?;
        }

        Ok(())
    }

    async fn fetch_optional<T>(
        &self,
        sql: &str,
        params: impl IntoParams + Send,
        decode: fn(&Row) -> Result<T>,
    ) -> Result<Option<T>> {
        let conn = self.operation_conn().await?;
        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| AppError::Database(format!("Failed to query: {}", e)))?;

        match next_row(&mut rows).await? {
            Some(row) => Ok(Some(decode(&row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_all<T>(
        &self,
        sql: &str,
        params: impl IntoParams + Send,
        decode: fn(&Row) -> Result<T>,
    ) -> Result<Vec<T>> {
        let conn = self.operation_conn().await?;
        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| AppError::Database(format!("Failed to query: {}", e)))?;

        let mut out = Vec::new();
        while let Some(row) = next_row(&mut rows).await? {
            out.push(decode(&row)?);
        }
        Ok(out)
    }

    /// Runs an `INSERT ... RETURNING` and maps unique violations onto
    /// `EmailAlreadyExists`, wherever libsql surfaces them.
    async fn insert_returning<T>(
        &self,
        sql: &str,
        params: impl IntoParams + Send,
        email: &str,
        decode: fn(&Row) -> Result<T>,
    ) -> Result<T> {
        let conn = self.operation_conn().await?;
        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| map_insert_error(e, email))?;

        let row = rows
            .next()
            .await
            .map_err(|e| map_insert_error(e, email))?
            .ok_or_else(|| AppError::Database("Insert returned no row".to_string()))?;

        decode(&row)
    }
}

#[async_trait]
impl IdentityRepository for TursoClient {
    async fn find_buyer_by_email(&self, email: &str) -> Result<Option<Buyer>> {
        self.fetch_optional(
            &format!("SELECT {BUYER_COLUMNS} FROM users WHERE email = ?1"),
            [email],
            buyer_from_row,
        )
        .await
    }

    async fn find_developer_by_email(&self, email: &str) -> Result<Option<Developer>> {
        self.fetch_optional(
            &format!("SELECT {DEVELOPER_COLUMNS} FROM developers WHERE email = ?1"),
            [email],
            developer_from_row,
        )
        .await
    }

    async fn find_buyer_by_id(&self, id: i64) -> Result<Option<Buyer>> {
        self.fetch_optional(
            &format!("SELECT {BUYER_COLUMNS} FROM users WHERE id = ?1"),
            [id],
            buyer_from_row,
        )
        .await
    }

    async fn find_developer_by_id(&self, id: i64) -> Result<Option<Developer>> {
        self.fetch_optional(
            &format!("SELECT {DEVELOPER_COLUMNS} FROM developers WHERE id = ?1"),
            [id],
            developer_from_row,
        )
        .await
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let found = self
            .fetch_optional(
                "SELECT EXISTS (SELECT 1 FROM users WHERE email = ?1)
                     OR EXISTS (SELECT 1 FROM developers WHERE email = ?1)",
                [email],
                |row| row.get::<i64>(0).map_err(db_err),
            )
            .await?;

        Ok(found.unwrap_or(0) != 0)
    }

    async fn create_buyer(&self, buyer: NewBuyer) -> Result<Buyer> {
        if buyer.role == Role::Developer {
            return Err(AppError::Internal(
                "developer role cannot be stored in the users table".to_string(),
            ));
        }
        let now = Utc::now().timestamp();

        self.insert_returning(
            &format!(
                "INSERT INTO users (email, password_hash, first_name, last_name, role, is_active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
                 RETURNING {BUYER_COLUMNS}"
            ),
            (
                buyer.email.as_str(),
                buyer.password_hash.as_str(),
                buyer.first_name.as_str(),
                buyer.last_name.as_str(),
                buyer.role.as_str(),
                now,
            ),
            &buyer.email,
            buyer_from_row,
        )
        .await
    }

    async fn create_developer(&self, developer: NewDeveloper) -> Result<Developer> {
        let now = Utc::now().timestamp();

        self.insert_returning(
            &format!(
                "INSERT INTO developers (email, password_hash, company_name, contact_person, phone, address, website, verification_status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'pending', ?8, ?8)
                 RETURNING {DEVELOPER_COLUMNS}"
            ),
            (
                developer.email.as_str(),
                developer.password_hash.as_str(),
                developer.company_name.as_str(),
                developer.contact_person.as_str(),
                developer.phone.as_str(),
                developer.address.as_str(),
                developer.website.clone(),
                now,
            ),
            &developer.email,
            developer_from_row,
        )
        .await
    }

    async fn list_developers(&self, status: Option<VerificationStatus>) -> Result<Vec<Developer>> {
        match status {
            Some(status) => {
                self.fetch_all(
                    &format!(
                        "SELECT {DEVELOPER_COLUMNS} FROM developers
                         WHERE verification_status = ?1 ORDER BY id ASC"
                    ),
                    [status.as_str()],
                    developer_from_row,
                )
                .await
            }
            None => {
                self.fetch_all(
                    &format!("SELECT {DEVELOPER_COLUMNS} FROM developers ORDER BY id ASC"),
                    (),
                    developer_from_row,
                )
                .await
            }
        }
    }

    async fn update_verification_status(
        &self,
        id: i64,
        status: VerificationStatus,
        reason: Option<&str>,
        mode: StatusWrite,
    ) -> Result<StatusUpdate> {
        let precondition = match mode {
            StatusWrite::FromPending => " AND verification_status = 'pending'",
            StatusWrite::Unconditional => "",
        };
        let now = Utc::now().timestamp();

        // Check and write happen in one statement, so concurrent admins
        // cannot both pass the precondition.
        let updated = self
            .fetch_optional(
                &format!(
                    "UPDATE developers
                     SET verification_status = ?1, rejection_reason = ?2, updated_at = ?3
                     WHERE id = ?4{precondition}
                     RETURNING {DEVELOPER_COLUMNS}"
                ),
                (status.as_str(), reason.map(str::to_string), now, id),
                developer_from_row,
            )
            .await?;

        if let Some(developer) = updated {
            return Ok(StatusUpdate::Applied(developer));
        }

        match self.find_developer_by_id(id).await? {
            Some(current) => Ok(StatusUpdate::Unchanged(current)),
            None => Ok(StatusUpdate::Missing),
        }
    }

    async fn list_admins(&self) -> Result<Vec<Buyer>> {
        self.fetch_all(
            &format!("SELECT {BUYER_COLUMNS} FROM users WHERE role = 'admin' ORDER BY id ASC"),
            (),
            buyer_from_row,
        )
        .await
    }

    async fn set_buyer_active(&self, id: i64, active: bool) -> Result<Option<Buyer>> {
        self.fetch_optional(
            &format!(
                "UPDATE users SET is_active = ?1, updated_at = ?2 WHERE id = ?3
                 RETURNING {BUYER_COLUMNS}"
            ),
            (i64::from(active), Utc::now().timestamp(), id),
            buyer_from_row,
        )
        .await
    }
}

// ============== Row Decoding ==============

fn db_err(e: libsql::Error) -> AppError {
    AppError::Database(e.to_string())
}

fn map_insert_error(e: libsql::Error, email: &str) -> AppError {
    let message = e.to_string();
    if message.contains("UNIQUE constraint failed") {
        AppError::EmailAlreadyExists(email.to_string())
    } else {
        AppError::Database(format!("Failed to insert identity: {}", message))
    }
}

async fn next_row(rows: &mut Rows) -> Result<Option<Row>> {
    rows.next().await.map_err(db_err)
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AppError::Database(format!("Stored timestamp out of range: {}", secs)))
}

fn buyer_from_row(row: &Row) -> Result<Buyer> {
    let role_str: String = row.get(5).map_err(db_err)?;
    let role = match Role::parse(&role_str) {
        Some(role @ (Role::Buyer | Role::Admin)) => role,
        _ => {
            return Err(AppError::Database(format!(
                "Unexpected role in users table: {}",
                role_str
            )))
        }
    };

    Ok(Buyer {
        id: row.get(0).map_err(db_err)?,
        email: row.get(1).map_err(db_err)?,
        password_hash: row.get(2).map_err(db_err)?,
        first_name: row.get(3).map_err(db_err)?,
        last_name: row.get(4).map_err(db_err)?,
        role,
        is_active: row.get::<i64>(6).map_err(db_err)? != 0,
        created_at: timestamp(row.get(7).map_err(db_err)?)?,
        updated_at: timestamp(row.get(8).map_err(db_err)?)?,
    })
}

fn developer_from_row(row: &Row) -> Result<Developer> {
    let status_str: String = row.get(8).map_err(db_err)?;
    let verification_status = VerificationStatus::parse(&status_str).ok_or_else(|| {
        AppError::Database(format!("Unexpected verification status: {}", status_str))
    })?;

    Ok(Developer {
        id: row.get(0).map_err(db_err)?,
        email: row.get(1).map_err(db_err)?,
        password_hash: row.get(2).map_err(db_err)?,
        company_name: row.get(3).map_err(db_err)?,
        contact_person: row.get(4).map_err(db_err)?,
        phone: row.get(5).map_err(db_err)?,
        address: row.get(6).map_err(db_err)?,
        website: row.get::<Option<String>>(7).map_err(db_err)?,
        verification_status,
        rejection_reason: row.get::<Option<String>>(9).map_err(db_err)?,
        created_at: timestamp(row.get(10).map_err(db_err)?)?,
        updated_at: timestamp(row.get(11).map_err(db_err)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_buyer(email: &str) -> NewBuyer {
        NewBuyer {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            role: Role::Buyer,
        }
    }

    fn new_developer(email: &str) -> NewDeveloper {
        NewDeveloper {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            company_name: "ABC Construction".to_string(),
            contact_person: "Jane Smith".to_string(),
            phone: "+359881234567".to_string(),
            address: "Sofia".to_string(),
            website: Some("https://abc.example".to_string()),
        }
    }

    #[tokio::test]
    async fn test_trigger_rejects_developer_with_buyer_email() {
        let client = TursoClient::new_memory().await.unwrap();
        client.create_buyer(new_buyer("shared@x.com")).await.unwrap();

        let result = client.create_developer(new_developer("shared@x.com")).await;
        assert!(matches!(result, Err(AppError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_trigger_rejects_buyer_with_developer_email() {
        let client = TursoClient::new_memory().await.unwrap();
        client
            .create_developer(new_developer("shared@x.com"))
            .await
            .unwrap();

        let result = client.create_buyer(new_buyer("SHARED@x.com")).await;
        assert!(matches!(result, Err(AppError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_developer_role_not_storable_as_buyer() {
        let client = TursoClient::new_memory().await.unwrap();
        let mut buyer = new_buyer("odd@x.com");
        buyer.role = Role::Developer;

        assert!(matches!(
            client.create_buyer(buyer).await,
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn test_map_insert_error_detects_unique() {
        let err = map_insert_error(
            libsql::Error::SqliteFailure(19, CROSS_TABLE_VIOLATION.to_string()),
            "a@b.c",
        );
        assert!(matches!(err, AppError::EmailAlreadyExists(email) if email == "a@b.c"));

        let err = map_insert_error(
            libsql::Error::SqliteFailure(1, "disk I/O error".to_string()),
            "a@b.c",
        );
        assert!(matches!(err, AppError::Database(_)));
    }
}
