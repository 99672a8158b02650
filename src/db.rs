use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{
    OptionalExtension, Row, params,
    types::{FromSql, FromSqlError, FromSqlResult, ValueRef},
};

use crate::data::{APPROVED_STATUS, TransactionRecord};

/// Read side of the transactions table.
pub trait TransactionStore {
    /// The approved transaction whose Woovi, EFI Bank or LunoxPay id equals
    /// `reference`, if any.
    fn find_approved(&self, reference: &str) -> Result<Option<TransactionRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to get a database connection: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

const FIND_APPROVED: &str = "
    SELECT id, nome, sobrenome, cpf, email, telefone, descricao, valor, status
    FROM transacoes
    WHERE (woovi_tx_id = ?1 OR efibank_tx_id = ?1 OR lunoxpay_tx_id = ?1)
    AND status = ?2
    LIMIT 1";

#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Self {
        Self { pool }
    }

    pub fn open(path: impl AsRef<Path>, pool_size: u32) -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(pool_size).build(manager)?;

        Ok(Self::new(pool))
    }
}

impl TransactionStore for SqliteStore {
    #[tracing::instrument(skip(self))]
    fn find_approved(&self, reference: &str) -> Result<Option<TransactionRecord>, StoreError> {
        let conn = self.pool.get()?;

        let record = conn
            .query_row(FIND_APPROVED, params![reference, APPROVED_STATUS], from_row)
            .optional()?;

        tracing::debug!(found = record.is_some(), "db_select");

        Ok(record)
    }
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<TransactionRecord> {
    Ok(TransactionRecord {
        id: row.get("id")?,
        first_name: row.get::<_, Option<String>>("nome")?.unwrap_or_default(),
        last_name: row.get::<_, Option<String>>("sobrenome")?.unwrap_or_default(),
        tax_id: row.get("cpf")?,
        email: row.get("email")?,
        phone: row.get("telefone")?,
        description: row.get("descricao")?,
        amount: row.get::<_, Amount>("valor")?.0,
        status: row.get("status")?,
    })
}

/// `valor` as stored: integer, real or numeric text.
struct Amount(f64);

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(i) => Ok(Amount(i as f64)),
            ValueRef::Real(f) => Ok(Amount(f)),
            ValueRef::Text(_) => value
                .as_str()?
                .trim()
                .parse()
                .map(Amount)
                .map_err(|err| FromSqlError::Other(Box::new(err))),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}
