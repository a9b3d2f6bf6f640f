mod database;

pub use database::SeaOrmDatabase;
