mod database;
mod router;
mod storage;

pub use database::MemoryDatabase;
pub use router::RouteTable;
pub use storage::MemoryStorage;
