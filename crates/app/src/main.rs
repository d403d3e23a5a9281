use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use shopping_assistant_core::{
    AssistantConfig, ChatMode, ChatOrchestrator, ContentRequest, Embedder, GeminiSettings, MemoryCatalog,
    MemoryVectorIndex, OllamaSettings, OpenAiSettings, OpenSearchCatalog, ProductStore,
    ProviderChain, ProviderKind, ProviderSettings, QdrantIndex, TrigramEmbedder, VectorIndex,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "shopping-assistant", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON product catalog served from memory instead of OpenSearch/Qdrant.
    #[arg(long, env = "AI_CATALOG_PATH")]
    catalog: Option<PathBuf>,

    /// OpenSearch base URL
    #[arg(long, env = "AI_OPENSEARCH_URL", default_value = "http://localhost:9200")]
    opensearch_url: String,

    /// OpenSearch products index
    #[arg(long, env = "AI_OPENSEARCH_INDEX", default_value = "products")]
    opensearch_index: String,

    /// Qdrant base URL
    #[arg(long, env = "AI_QDRANT_URL", default_value = "http://localhost:6333")]
    qdrant_url: String,

    /// Qdrant collection
    #[arg(long, env = "AI_QDRANT_COLLECTION", default_value = "products")]
    qdrant_collection: String,

    /// Language model provider: ollama, openai or gemini.
    #[arg(long, env = "AI_LLM_PROVIDER", default_value = "ollama")]
    provider: ProviderKind,

    /// Chat mode: llm, catalog or general.
    #[arg(long, env = "AI_CHAT_MODE", default_value = "llm")]
    chat_mode: ChatMode,

    /// Attach provider diagnostics to chat responses.
    #[arg(long, env = "AI_DEBUG", default_value_t = false)]
    debug: bool,

    #[arg(long, env = "AI_OLLAMA_URL", default_value = "http://127.0.0.1:11434")]
    ollama_url: String,

    #[arg(long, env = "AI_OLLAMA_MODEL", default_value = "phi3:mini")]
    ollama_model: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    #[arg(long, env = "AI_OPENAI_MODEL", default_value = "gpt-4o-mini")]
    openai_model: String,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    #[arg(long, env = "AI_GEMINI_MODEL", default_value = "gemini-1.5-flash")]
    gemini_model: String,
}

#[derive(Subcommand, Clone)]
enum Command {
    /// Ask a shopping question and print the answer with matched products.
    Chat {
        /// The customer question.
        question: String,
        /// Number of semantic neighbours to retrieve.
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Print raw semantic search hits for a query.
    Search {
        query: String,
        /// Defaults to the configured search depth (12).
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Draft listing content (description, tags, FAQs...) for a product as JSON.
    Generate(GenerateArgs),
    /// Print index, store and provider readiness.
    Status,
}

#[derive(Args, Clone)]
struct GenerateArgs {
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    category: String,
    #[arg(long, default_value = "")]
    price: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Free-text highlights typed so far.
    #[arg(long, default_value = "")]
    highlights: String,
}

impl From<GenerateArgs> for ContentRequest {
    fn from(args: GenerateArgs) -> Self {
        ContentRequest {
            name: args.name,
            category: args.category,
            price: args.price,
            description: args.description,
            highlights: args.highlights,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = assistant_config(&cli);
    let generator = ProviderChain::from_settings(&config.providers);
    let embedder = TrigramEmbedder::default();

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        provider = %config.providers.active,
        chat_mode = config.chat_mode.as_str(),
        "shopping-assistant boot"
    );

    match &cli.catalog {
        Some(path) => {
            let catalog = MemoryCatalog::from_json_file(path).await?;
            let index = MemoryVectorIndex::build(catalog.products(), &embedder);
            info!(path = %path.display(), products = catalog.len(), "serving catalog from memory");
            let assistant = ChatOrchestrator::new(catalog, index, generator, embedder, config);
            run(&assistant, cli.command).await
        }
        None => {
            let store = OpenSearchCatalog::new(&cli.opensearch_url, &cli.opensearch_index);
            let index = QdrantIndex::new(&cli.qdrant_url, &cli.qdrant_collection, embedder.dimensions());
            let assistant = ChatOrchestrator::new(store, index, generator, embedder, config);
            run(&assistant, cli.command).await
        }
    }
}

async fn run<S, V>(
    assistant: &ChatOrchestrator<S, V, ProviderChain, TrigramEmbedder>,
    command: Command,
) -> anyhow::Result<()>
where
    S: ProductStore + Send + Sync,
    V: VectorIndex + Send + Sync,
{
    let config = assistant.config();

    match command {
        Command::Chat { question, top_k } => {
            let response = assistant
                .chat(&question, top_k.unwrap_or(config.default_top_k))
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Search { query, top_k } => {
            let hits = assistant
                .search(&query, top_k.unwrap_or(config.search_top_k))
                .await?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Command::Generate(args) => {
            let content = assistant.draft_content(&args.into()).await;
            println!("{}", serde_json::to_string_pretty(&content)?);
        }
        Command::Status => {
            let status = assistant.status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}

fn assistant_config(cli: &Cli) -> AssistantConfig {
    AssistantConfig {
        chat_mode: cli.chat_mode,
        debug: cli.debug,
        providers: ProviderSettings {
            active: cli.provider,
            ollama: OllamaSettings {
                base_url: cli.ollama_url.clone(),
                model: cli.ollama_model.clone(),
                ..OllamaSettings::default()
            },
            openai: OpenAiSettings {
                api_key: cli.openai_api_key.clone(),
                model: cli.openai_model.clone(),
                ..OpenAiSettings::default()
            },
            gemini: GeminiSettings {
                api_key: cli.gemini_api_key.clone(),
                model: cli.gemini_model.clone(),
                ..GeminiSettings::default()
            },
        },
        ..AssistantConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_provider_settings() {
        let cli = Cli::try_parse_from([
            "shopping-assistant",
            "--provider",
            "gemini",
            "--chat-mode",
            "catalog",
            "--gemini-api-key",
            "test-key",
            "chat",
            "cheapest product",
        ])
        .expect("arguments should parse");

        let config = assistant_config(&cli);
        assert_eq!(config.providers.active, ProviderKind::Gemini);
        assert_eq!(config.chat_mode, ChatMode::Catalog);
        assert!(config.providers.credential_loaded());
        assert_eq!(config.providers.gemini.fallback_models.len(), 2);
        assert!(matches!(cli.command, Command::Chat { top_k: None, .. }));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let parsed = Cli::try_parse_from(["shopping-assistant", "--provider", "claude", "status"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn search_depth_defaults_wider_than_chat() {
        let cli = Cli::try_parse_from(["shopping-assistant", "search", "desk lamp"])
            .expect("arguments should parse");

        let config = assistant_config(&cli);
        assert_eq!(config.search_top_k, 12);
        assert_eq!(config.default_top_k, 6);
        assert!(matches!(cli.command, Command::Search { top_k: None, .. }));
    }

    #[test]
    fn generate_flags_build_content_request() {
        let cli = Cli::try_parse_from([
            "shopping-assistant",
            "generate",
            "--name",
            "Trail Sneaker",
            "--price",
            "89.00",
        ])
        .expect("arguments should parse");

        let Command::Generate(args) = cli.command else {
            panic!("expected the generate command");
        };
        let request = ContentRequest::from(args);
        assert_eq!(request.name, "Trail Sneaker");
        assert_eq!(request.price, "89.00");
        assert!(request.category.is_empty());
        assert!(request.highlights.is_empty());
    }
}
