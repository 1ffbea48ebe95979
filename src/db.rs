pub mod store;
pub use store::{Collection, CollectionPath, DocumentStore, Query};
pub mod live;
pub mod memory_store;
pub use memory_store::MemoryStore;
pub mod pg_store;
pub use pg_store::PgDocumentStore;

pub mod user_repo;
pub use user_repo::UserRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod operation_repo;
pub use operation_repo::OperationRepository;
