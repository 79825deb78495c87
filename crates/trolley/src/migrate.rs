use crate::{MigrationFn, Result};
use tokio_postgres::{Client, Transaction};

/// A registered migration.
pub struct Migration {
    /// Version string, e.g. "2026_08_10_090000-create_catalog"
    pub version: &'static str,
    /// Function name for debugging
    pub name: &'static str,
    /// The migration function
    pub run: MigrationFn,
}

/// Register a migration function with the global registry.
///
/// The version string orders migrations, so keep it sortable:
/// `YYYY_MM_DD_HHMMSS-description`.
///
/// ```ignore
/// async fn migrate(ctx: &mut MigrationContext<'_>) -> Result<()> {
///     ctx.execute("CREATE TABLE product (...)").await?;
///     Ok(())
/// }
///
/// trolley::migration!("2026_08_10_090000-create_catalog", migrate);
/// ```
#[macro_export]
macro_rules! migration {
    ($version:literal, $f:path) => {
        $crate::inventory::submit! {
            $crate::Migration {
                version: $version,
                name: stringify!($f),
                run: {
                    fn run<'a>(
                        ctx: &'a mut $crate::MigrationContext<'a>,
                    ) -> ::std::pin::Pin<
                        ::std::boxed::Box<
                            dyn ::std::future::Future<Output = $crate::Result<()>> + Send + 'a,
                        >,
                    > {
                        ::std::boxed::Box::pin($f(ctx))
                    }
                    run
                },
            }
        }
    };
}

/// Context passed to migration functions.
///
/// Wraps a database transaction, ensuring all migration operations are atomic.
pub struct MigrationContext<'a> {
    tx: &'a Transaction<'a>,
}

impl<'a> MigrationContext<'a> {
    pub fn new(tx: &'a Transaction<'a>) -> Self {
        Self { tx }
    }

    /// Execute a SQL statement.
    pub async fn execute(&self, sql: &str) -> Result<u64> {
        Ok(self.tx.execute(sql, &[]).await?)
    }

    /// Execute a SQL statement with parameters.
    pub async fn execute_params(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<u64> {
        Ok(self.tx.execute(sql, params).await?)
    }

    /// Get the underlying transaction for complex operations.
    pub fn transaction(&self) -> &Transaction<'a> {
        self.tx
    }
}

/// Runs migrations against a database.
pub struct MigrationRunner<'a> {
    client: &'a mut Client,
}

impl<'a> MigrationRunner<'a> {
    pub fn new(client: &'a mut Client) -> Self {
        Self { client }
    }

    /// Ensure the migrations tracking table exists.
    pub async fn init(&self) -> Result<()> {
        self.client
            .execute(
                "CREATE TABLE IF NOT EXISTS _trolley_migrations (
                    version TEXT PRIMARY KEY,
                    applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )",
                &[],
            )
            .await?;
        Ok(())
    }

    /// Get all applied migration versions.
    pub async fn applied(&self) -> Result<Vec<String>> {
        let rows = self
            .client
            .query(
                "SELECT version FROM _trolley_migrations ORDER BY version",
                &[],
            )
            .await?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    /// Get all pending migrations (registered but not applied).
    pub fn pending(&self, applied: &[String]) -> Vec<&'static Migration> {
        let mut migrations: Vec<_> = inventory::iter::<Migration>
            .into_iter()
            .filter(|m| !applied.contains(&m.version.to_string()))
            .collect();
        migrations.sort_by_key(|m| m.version);
        migrations
    }

    /// Run all pending migrations.
    ///
    /// Each migration runs in its own transaction. If a migration fails,
    /// all its changes are rolled back and subsequent migrations are skipped.
    pub async fn migrate(&mut self) -> Result<Vec<&'static str>> {
        self.init().await?;
        let applied = self.applied().await?;
        let pending = self.pending(&applied);

        let mut ran = Vec::new();
        for migration in pending {
            // Each migration runs in its own transaction
            let tx = self.client.transaction().await?;

            let mut ctx = MigrationContext::new(&tx);
            (migration.run)(&mut ctx).await?;

            // Record the migration as applied (inside the same transaction)
            tx.execute(
                "INSERT INTO _trolley_migrations (version) VALUES ($1)",
                &[&migration.version],
            )
            .await?;

            tx.commit().await?;

            tracing::info!(version = migration.version, "applied migration");
            ran.push(migration.version);
        }

        Ok(ran)
    }

    /// Get status of all migrations.
    pub async fn status(&self) -> Result<Vec<MigrationStatus>> {
        self.init().await?;
        let applied = self.applied().await?;

        let mut all: Vec<_> = inventory::iter::<Migration>
            .into_iter()
            .map(|m| MigrationStatus {
                version: m.version,
                name: m.name,
                applied: applied.contains(&m.version.to_string()),
            })
            .collect();
        all.sort_by_key(|m| m.version);
        Ok(all)
    }
}

/// Status of a single migration.
pub struct MigrationStatus {
    pub version: &'static str,
    pub name: &'static str,
    pub applied: bool,
}
