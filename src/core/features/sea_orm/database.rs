use crate::core::contracts::{Database, Dialect, EntityDescriptor};
use crate::core::error_capability::DatabaseError;
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, DbBackend};

/// [`Database`] capability over a sea-orm connection. Each entity's DDL for
/// the connection backend is executed as-is, in descriptor order.
#[derive(Debug, Clone)]
pub struct SeaOrmDatabase {
    conn: sea_orm::DatabaseConnection,
}

impl SeaOrmDatabase {
    pub async fn connect(options: ConnectOptions) -> Result<Self, DatabaseError> {
        let conn = sea_orm::Database::connect(options)
            .await
            .map_err(DatabaseError::DbErr)?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: sea_orm::DatabaseConnection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &sea_orm::DatabaseConnection {
        &self.conn
    }

    pub fn into_connection(self) -> sea_orm::DatabaseConnection {
        self.conn
    }
}

fn dialect_of(backend: DbBackend) -> Dialect {
    match backend {
        DbBackend::Postgres => Dialect::Postgres,
        DbBackend::MySql => Dialect::MySql,
        DbBackend::Sqlite => Dialect::Sqlite,
    }
}

#[async_trait]
impl Database for SeaOrmDatabase {
    fn dialect(&self) -> Dialect {
        dialect_of(self.conn.get_database_backend())
    }

    async fn migrate(
        &self,
        _module: &str,
        entities: &[EntityDescriptor],
    ) -> Result<(), DatabaseError> {
        let dialect = self.dialect();
        let statements = entities
            .iter()
            .map(|entity| {
                entity.ddl_for(dialect).ok_or_else(|| {
                    DatabaseError::UnsupportedDialect(entity.name().to_string(), dialect)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for sql in statements {
            self.conn.execute_unprepared(sql).await?;
        }
        Ok(())
    }
}
