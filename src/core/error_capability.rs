use crate::core::contracts::{BoxError, Dialect, Method};
use thiserror::Error;

#[cfg(any(feature = "sea-orm-postgres", feature = "sea-orm-mysql"))]
use sea_orm::DbErr;

#[derive(Debug, Error, PartialEq)]
pub enum DatabaseError {
    #[error("DatabaseError: Migration of entity '{0}' failed: '{1}'")]
    Migration(String, String),

    #[error("DatabaseError: Entity '{0}' has no DDL for dialect '{1}'")]
    UnsupportedDialect(String, Dialect),

    #[cfg(any(feature = "sea-orm-postgres", feature = "sea-orm-mysql"))]
    #[error("DatabaseError: DbErr: {0}")]
    DbErr(#[from] DbErr),
}

#[derive(Debug, Error, PartialEq)]
pub enum RouteError {
    #[error("RouteError: Route already registered: {0} '{1}'")]
    Duplicate(Method, String),

    #[error("RouteError: Invalid route path '{0}'")]
    InvalidPath(String),

    #[error("RouteError: Unknown HTTP method '{0}'")]
    UnknownMethod(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum StorageError {
    #[error("StorageError: Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("StorageError: Backend failure: '{0}'")]
    Backend(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum MailError {
    #[error("MailError: Message rejected: '{0}'")]
    Rejected(String),

    #[error("MailError: Transport failure: '{0}'")]
    Transport(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("ConfigError: Cant parse configuration: '{0}'")]
    Parse(String),

    #[error("ConfigError: Missing required key '{0}'")]
    Missing(String),

    #[error("ConfigError: Key '{0}' is not of type '{1}'")]
    InvalidType(String, &'static str),

    #[error("ConfigError: Cant deserialize key '{0}' error '{1}'")]
    Deserialize(String, String),
}

#[derive(Debug, Error)]
pub enum RelationError {
    #[error("RelationError: No accessor registered for field '{0}'")]
    UnknownField(String),

    #[error("RelationError: Accessor for field '{field}' failed: {cause}")]
    Accessor {
        field: String,
        #[source]
        cause: BoxError,
    },
}
