pub mod memory;

#[cfg(any(feature = "sea-orm-postgres", feature = "sea-orm-mysql"))]
pub mod sea_orm;
