use crate::core::error_capability::{DatabaseError, MailError, RouteError, StorageError};
use crate::core::event_bus::EventBus;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// A feature unit mounted by the host.
///
/// Construction happens through a registry constructor; the initializer then
/// calls [`Module::migrate`], [`Module::routes`] and [`Module::subscribe`]
/// exactly once, in that order.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    /// Applies schema changes for the entities this module owns.
    /// Must be safe to call again against an already migrated schema.
    async fn migrate(&self) -> Result<(), BoxError>;

    /// Registers the module endpoints. No I/O beyond route registration.
    ///
    /// Routes are staged and only reach the live surface once this returns
    /// `Ok`; on error none of them are mounted.
    fn routes(&self, router: &dyn Router) -> Result<(), BoxError>;

    /// Attaches event handlers. Runs only after the module is live, so a
    /// module skipped at an earlier stage never receives events.
    fn subscribe(&self, _events: &EventBus) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Patch => write!(f, "PATCH"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

impl TryFrom<&str> for Method {
    type Error = RouteError;

    fn try_from(value: &str) -> Result<Self, RouteError> {
        match value.trim().to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(RouteError::UnknownMethod(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub params: BTreeMap<String, String>,
    pub body: serde_json::Value,
}

impl Request {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: serde_json::Value,
}

impl Response {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: serde_json::Value) -> Self {
        Self::json(200, body)
    }

    pub fn not_found() -> Self {
        Self::json(404, serde_json::json!({ "error": "not found" }))
    }
}

pub type Handler = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

/// One endpoint, `path` relative to the surface it is mounted on.
#[derive(Clone)]
pub struct Route {
    pub method: Method,
    pub path: String,
    pub handler: Handler,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Surface that modules register their endpoints on.
pub trait Router: Send + Sync {
    /// Mount path of this surface, `/` for the root.
    fn prefix(&self) -> &str;

    /// Registers every route of the batch or none of them.
    fn mount(&self, routes: Vec<Route>) -> Result<(), RouteError>;

    /// Derives a nested surface under `prefix`.
    fn group(&self, prefix: &str) -> Result<Arc<dyn Router>, RouteError>;

    fn handle(&self, method: Method, path: &str, handler: Handler) -> Result<(), RouteError> {
        self.mount(vec![Route {
            method,
            path: path.to_string(),
            handler,
        }])
    }
}

impl dyn Router + '_ {
    pub fn get<F>(&self, path: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.handle(Method::Get, path, Arc::new(handler))
    }

    pub fn post<F>(&self, path: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.handle(Method::Post, path, Arc::new(handler))
    }

    pub fn put<F>(&self, path: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.handle(Method::Put, path, Arc::new(handler))
    }

    pub fn patch<F>(&self, path: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.handle(Method::Patch, path, Arc::new(handler))
    }

    pub fn delete<F>(&self, path: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.handle(Method::Delete, path, Arc::new(handler))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
    Memory,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::MySql => write!(f, "mysql"),
            Dialect::Sqlite => write!(f, "sqlite"),
            Dialect::Memory => write!(f, "memory"),
        }
    }
}

/// Schema description of one persisted entity.
///
/// DDL is kept per dialect and must be idempotent (`IF NOT EXISTS`).
#[derive(Clone, Debug, PartialEq)]
pub struct EntityDescriptor {
    name: String,
    ddl: Vec<(Dialect, String)>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ddl: Vec::new(),
        }
    }

    pub fn with_ddl(mut self, dialect: Dialect, sql: impl Into<String>) -> Self {
        self.ddl.retain(|(d, _)| *d != dialect);
        self.ddl.push((dialect, sql.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ddl_for(&self, dialect: Dialect) -> Option<&str> {
        self.ddl
            .iter()
            .find(|(d, _)| *d == dialect)
            .map(|(_, sql)| sql.as_str())
    }
}

#[async_trait]
pub trait Database: Send + Sync {
    fn dialect(&self) -> Dialect;

    async fn migrate(&self, module: &str, entities: &[EntityDescriptor])
    -> Result<(), DatabaseError>;
}

pub trait Storage: Send + Sync {
    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError>;
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn delete(&self, key: &str) -> Result<bool, StorageError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

pub trait Mailer: Send + Sync {
    fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}
