//! Parcel repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide single-row CRUD primitives over the `parcel` table.
//! - Enforce the registered-only rule for address changes and deletion at
//!   the data-access boundary.
//!
//! # Invariants
//! - Every guarded statement binds `ParcelStatus::MUTABLE` through
//!   `MUTABLE_GUARD_SQL`; no other place compares status text.
//! - `set_address` re-checks the guard inside its `UPDATE` predicate.
//! - `set_status` and `delete_parcel` treat "no matching row" as success.
//! - This layer never logs and never retries.

use crate::db::DbError;
use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use rusqlite::{named_params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PARCEL_TABLE: &str = "parcel";
const PARCEL_COLUMNS: [&str; 5] = ["number", "client", "status", "address", "created_at"];

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

/// Predicate fragment shared by every registered-only statement.
///
/// Callers bind `:number` and `:mutable_status`.
const MUTABLE_GUARD_SQL: &str = "number = :number AND status = :mutable_status";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from parcel persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite failure, passed through unchanged.
    Db(DbError),
    /// `get_parcel` matched no row.
    NotFound(ParcelNumber),
    /// Address change refused: the parcel is missing or not registered.
    PreconditionFailed(ParcelNumber),
    /// Persisted row cannot be decoded into a `Parcel`.
    InvalidData(String),
    /// Connection lacks the `parcel` table.
    MissingRequiredTable(&'static str),
    /// Connection has the table but not every expected column.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Returns whether this error reports a missing parcel on lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(number) => write!(f, "parcel not found: {number}"),
            Self::PreconditionFailed(number) => write!(
                f,
                "parcel {number} does not exist or is no longer `{}`",
                ParcelStatus::MUTABLE
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted parcel data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "parcel repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "parcel repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for parcel CRUD operations.
pub trait ParcelRepository {
    /// Inserts a parcel and returns the storage-assigned number.
    ///
    /// `parcel.number` is ignored. Field values are not validated.
    fn add_parcel(&self, parcel: &Parcel) -> RepoResult<ParcelNumber>;
    /// Loads one parcel by number, `RepoError::NotFound` when absent.
    fn get_parcel(&self, number: ParcelNumber) -> RepoResult<Parcel>;
    /// Loads every parcel of one client in unspecified order.
    fn get_parcels_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>>;
    /// Overwrites the status unconditionally. Unknown numbers are a no-op.
    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()>;
    /// Changes the address of a registered parcel.
    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()>;
    /// Removes a registered parcel. Anything else is a silent no-op.
    fn delete_parcel(&self, number: ParcelNumber) -> RepoResult<()>;
}

/// SQLite-backed parcel repository.
///
/// Holds only the borrowed connection; concurrent callers use their own
/// connections and rely on SQLite locking.
pub struct SqliteParcelRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelRepository<'conn> {
    /// Wraps a connection whose `parcel` table is already in place.
    ///
    /// # Errors
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema is
    ///   not ready.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_parcel_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn is_mutable(&self, number: ParcelNumber) -> RepoResult<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM parcel WHERE {MUTABLE_GUARD_SQL});");
        let exists: i64 = self.conn.query_row(
            &sql,
            named_params! {
                ":number": number,
                ":mutable_status": ParcelStatus::MUTABLE.as_str(),
            },
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl ParcelRepository for SqliteParcelRepository<'_> {
    fn add_parcel(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        self.conn.execute(
            "INSERT INTO parcel (client, status, address, created_at)
             VALUES (:client, :status, :address, :created_at);",
            named_params! {
                ":client": parcel.client,
                ":status": parcel.status.as_str(),
                ":address": parcel.address.as_str(),
                ":created_at": parcel.created_at.as_str(),
            },
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_parcel(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{PARCEL_SELECT_SQL} WHERE number = :number;"))?;

        let row = stmt
            .query_row(named_params! { ":number": number }, read_parcel_row)
            .optional()?;
        match row {
            Some(parcel) => parse_parcel(parcel),
            None => Err(RepoError::NotFound(number)),
        }
    }

    fn get_parcels_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{PARCEL_SELECT_SQL} WHERE client = :client;"))?;

        let mut rows = stmt.query(named_params! { ":client": client })?;
        let mut parcels = Vec::new();
        while let Some(row) = rows.next()? {
            parcels.push(parse_parcel(read_parcel_row(row)?)?);
        }

        Ok(parcels)
    }

    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE parcel SET status = :status WHERE number = :number;",
            named_params! {
                ":status": status.as_str(),
                ":number": number,
            },
        )?;

        Ok(())
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        if !self.is_mutable(number)? {
            return Err(RepoError::PreconditionFailed(number));
        }

        let changed = self.conn.execute(
            &format!("UPDATE parcel SET address = :address WHERE {MUTABLE_GUARD_SQL};"),
            named_params! {
                ":address": address,
                ":number": number,
                ":mutable_status": ParcelStatus::MUTABLE.as_str(),
            },
        )?;

        // Status moved on between the check and the write.
        if changed == 0 {
            return Err(RepoError::PreconditionFailed(number));
        }

        Ok(())
    }

    fn delete_parcel(&self, number: ParcelNumber) -> RepoResult<()> {
        self.conn.execute(
            &format!("DELETE FROM parcel WHERE {MUTABLE_GUARD_SQL};"),
            named_params! {
                ":number": number,
                ":mutable_status": ParcelStatus::MUTABLE.as_str(),
            },
        )?;

        Ok(())
    }
}

/// Raw column values as stored, before status decoding.
struct ParcelRow {
    number: ParcelNumber,
    client: ClientId,
    status: String,
    address: String,
    created_at: String,
}

fn read_parcel_row(row: &Row<'_>) -> rusqlite::Result<ParcelRow> {
    Ok(ParcelRow {
        number: row.get("number")?,
        client: row.get("client")?,
        status: row.get("status")?,
        address: row.get("address")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_parcel(row: ParcelRow) -> RepoResult<Parcel> {
    let status = ParcelStatus::parse(&row.status).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{}` in parcel.status for number {}",
            row.status, row.number
        ))
    })?;

    Ok(Parcel {
        number: row.number,
        client: row.client,
        status,
        address: row.address,
        created_at: row.created_at,
    })
}

fn ensure_parcel_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, PARCEL_TABLE)? {
        return Err(RepoError::MissingRequiredTable(PARCEL_TABLE));
    }

    let present = table_columns(conn, PARCEL_TABLE)?;
    for column in PARCEL_COLUMNS {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: PARCEL_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::{parse_parcel, ParcelRow, RepoError};
    use crate::model::parcel::ParcelStatus;

    fn raw_row(status: &str) -> ParcelRow {
        ParcelRow {
            number: 3,
            client: 42,
            status: status.to_string(),
            address: "somewhere".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn parse_parcel_decodes_known_status() {
        let parcel = parse_parcel(raw_row("sent")).unwrap();
        assert_eq!(parcel.number, 3);
        assert_eq!(parcel.status, ParcelStatus::Sent);
    }

    #[test]
    fn parse_parcel_rejects_unknown_status() {
        let err = parse_parcel(raw_row("lost")).unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(ref message) if message.contains("lost")));
    }

    #[test]
    fn precondition_message_names_mutable_status() {
        let message = RepoError::PreconditionFailed(9).to_string();
        assert!(message.contains('9'));
        assert!(message.contains("registered"));
    }
}
