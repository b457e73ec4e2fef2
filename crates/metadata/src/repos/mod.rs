//! Repository traits for metadata operations.

pub mod categories;
pub mod pages;
pub mod purge;
pub mod schema;

pub use categories::CategoryRepo;
pub use pages::PageRepo;
pub use purge::{PageIdRelation, PurgeRepo, PurgeTransaction, TitleRelation};
pub use schema::{ContentLayout, SchemaCapabilities, SchemaRepo};
