pub mod memory;
pub mod opensearch;
pub mod qdrant;

pub use memory::{MemoryCatalog, MemoryVectorIndex};
pub use opensearch::OpenSearchCatalog;
pub use qdrant::QdrantIndex;
