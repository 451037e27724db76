//! Pool-backed database handle.

use crate::client::GenericClient;
use crate::config::DbConfig;
use crate::error::{OrmError, OrmResult};
use crate::pool::{create_pool, create_pool_with_tls};
use crate::table::Table;
use deadpool_postgres::Pool;
use tokio_postgres::Socket;
use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};

/// A connected database, cheap to clone.
///
/// Models initialized through [`Db::init`] carry this handle, and their
/// statement builders check out one pooled connection per terminal call unless
/// a transaction is supplied with `with_tx`.
#[derive(Clone)]
pub struct Db {
    pool: Pool,
}

impl Db {
    /// Build a pool from `config` and verify the server answers.
    pub async fn connect(config: &DbConfig) -> OrmResult<Self> {
        let db = Self::from_pool(create_pool(config)?);
        db.ping().await?;
        Ok(db)
    }

    /// Like [`Db::connect`], with a custom TLS connector.
    pub async fn connect_with_tls<T>(config: &DbConfig, tls: T) -> OrmResult<Self>
    where
        T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
        T::Stream: Sync + Send,
        T::TlsConnect: Sync + Send,
        <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
    {
        let db = Self::from_pool(create_pool_with_tls(config, tls)?);
        db.ping().await?;
        Ok(db)
    }

    /// Wrap an existing pool. No connection is attempted.
    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Check out one connection.
    pub async fn client(&self) -> OrmResult<deadpool_postgres::Client> {
        Ok(self.pool.get().await?)
    }

    /// Round-trip `SELECT 1`.
    pub async fn ping(&self) -> OrmResult<()> {
        let client = self
            .client()
            .await
            .map_err(|e| OrmError::Connection(e.to_string()))?;
        GenericClient::execute(&client, "SELECT 1", &[]).await?;
        Ok(())
    }

    /// Introspect `T` and bind it to this database.
    pub fn init<T: Table>(&self) -> OrmResult<T> {
        crate::model::init_with::<T>(Some(self.clone()))
    }
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("status", &self.pool.status())
            .finish()
    }
}
