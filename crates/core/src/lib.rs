pub mod answer;
pub mod config;
pub mod content;
pub mod embeddings;
pub mod error;
pub mod intent;
pub mod keyword;
pub mod models;
pub mod orchestrator;
pub mod prompt;
pub mod providers;
pub mod quality;
pub mod ranker;
pub mod stores;
pub mod traits;

pub use config::{
    AssistantConfig, ChatMode, GeminiSettings, OllamaSettings, OpenAiSettings, ProviderSettings,
};
pub use content::{ContentRequest, ProductContent};
pub use embeddings::{Embedder, TrigramEmbedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{ChatError, ProviderError, SearchError, StoreError};
pub use intent::{classify, Intent};
pub use keyword::KeywordQuery;
pub use models::{
    format_money, Candidate, CandidateSource, ChatDiagnostics, ChatResponse, PriceDirection,
    Product, ProductSummary, ProviderAttempt, RankedProduct, RankedResult, SearchHit,
};
pub use orchestrator::{AssistantStatus, ChatOrchestrator};
pub use providers::{Generation, LanguageModel, ProviderChain, ProviderKind, TextGenerator};
pub use stores::{MemoryCatalog, MemoryVectorIndex, OpenSearchCatalog, QdrantIndex};
pub use traits::{ProductStore, VectorIndex};
