use crate::answer::{
    self, CAPABILITIES_ANSWER, EMPTY_QUESTION_ANSWER, GENERAL_UNAVAILABLE_ANSWER, GREETING_ANSWER,
    THANKS_ANSWER,
};
use crate::config::{AssistantConfig, ChatMode};
use crate::content::{self, ContentRequest, ProductContent};
use crate::embeddings::Embedder;
use crate::intent::{classify, mentions_detail_word, Intent};
use crate::prompt::{chat_prompt, general_prompt, GENERAL_SYSTEM_PROMPT};
use crate::providers::{Generation, ProviderKind, TextGenerator};
use crate::traits::{ProductStore, VectorIndex};
use crate::{quality, ranker};
use crate::{ChatDiagnostics, ChatError, ChatResponse, ProviderAttempt, SearchHit};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Upper bound on products scanned for a named-product match.
pub const CATALOG_SCAN_LIMIT: usize = 500;
pub const FULL_CATALOG_LIMIT: usize = 200;
pub const PRICE_EXTREME_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantStatus {
    pub index_ready: bool,
    pub store_ready: bool,
    pub provider: ProviderKind,
    pub model: String,
    pub chat_mode: ChatMode,
    pub credential_loaded: bool,
    pub debug: bool,
}

/// Runs one chat turn per call: classify, then either answer straight from
/// the store or retrieve, generate, gate and fall back to the template
/// builder. Holds no per-request state, so one instance can serve
/// concurrent requests.
pub struct ChatOrchestrator<S, V, G, E>
where
    S: ProductStore,
    V: VectorIndex,
    G: TextGenerator,
    E: Embedder,
{
    store: S,
    index: V,
    generator: G,
    embedder: E,
    config: AssistantConfig,
}

struct Turn {
    response: ChatResponse,
    attempt: Option<ProviderAttempt>,
}

impl Turn {
    fn direct(response: ChatResponse) -> Self {
        Self {
            response,
            attempt: None,
        }
    }
}

impl<S, V, G, E> ChatOrchestrator<S, V, G, E>
where
    S: ProductStore + Send + Sync,
    V: VectorIndex + Send + Sync,
    G: TextGenerator + Send + Sync,
    E: Embedder + Send + Sync,
{
    pub fn new(store: S, index: V, generator: G, embedder: E, config: AssistantConfig) -> Self {
        Self {
            store,
            index,
            generator,
            embedder,
            config,
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub async fn chat(&self, question: &str, top_k: usize) -> Result<ChatResponse, ChatError> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(ChatResponse::answer_only(EMPTY_QUESTION_ANSWER));
        }

        if self.config.chat_mode == ChatMode::General {
            let turn = self.general_turn(question).await;
            return Ok(self.finish(turn, "general"));
        }

        self.store.ensure_ready().await?;

        let catalog = if mentions_detail_word(question) {
            self.store
                .find_all(CATALOG_SCAN_LIMIT)
                .await
                .unwrap_or_else(|error| {
                    warn!(%error, "catalog scan failed, skipping named product lookup");
                    Vec::new()
                })
        } else {
            Vec::new()
        };

        let intent = classify(question, &catalog);
        info!(intent = intent.label(), "question classified");

        let turn = match &intent {
            Intent::FullCatalog => {
                let products = self.store.find_all(FULL_CATALOG_LIMIT).await?;
                Turn::direct(ChatResponse::with_products(
                    answer::full_catalog(&products),
                    &products,
                ))
            }
            Intent::PriceExtreme { direction } => {
                let products = self
                    .store
                    .find_sorted_by_price(*direction, PRICE_EXTREME_LIMIT)
                    .await?;
                Turn::direct(ChatResponse::with_products(
                    answer::price_extreme(*direction, &products),
                    &products,
                ))
            }
            Intent::NamedProductDetail { product } => Turn::direct(ChatResponse::with_products(
                answer::product_detail(product),
                std::slice::from_ref(&**product),
            )),
            Intent::Greeting => Turn::direct(ChatResponse::answer_only(GREETING_ANSWER)),
            Intent::Thanks => Turn::direct(ChatResponse::answer_only(THANKS_ANSWER)),
            Intent::GenericHelp => Turn::direct(ChatResponse::answer_only(CAPABILITIES_ANSWER)),
            Intent::None => self.retrieval_turn(question, top_k).await?,
        };

        Ok(self.finish(turn, intent.label()))
    }

    /// Semantic search only; no keyword fusion and no generation.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, ChatError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.semantic_hits(query, top_k).await
    }

    pub async fn status(&self) -> AssistantStatus {
        AssistantStatus {
            index_ready: self.index.ensure_ready().await.is_ok(),
            store_ready: self.store.ensure_ready().await.is_ok(),
            provider: self.generator.active_provider(),
            model: self.generator.active_model(),
            chat_mode: self.config.chat_mode,
            credential_loaded: self.config.providers.credential_loaded(),
            debug: self.config.debug,
        }
    }

    /// Drafts listing content for an admin form. Catalog mode keeps to the template.
    pub async fn draft_content(&self, request: &ContentRequest) -> ProductContent {
        if self.config.chat_mode == ChatMode::Catalog {
            return content::template(request);
        }
        content::draft(&self.generator, request).await
    }

    async fn semantic_hits(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, ChatError> {
        self.index.ensure_ready().await?;
        let query_vector = self.embedder.embed(query);
        Ok(self.index.search(&query_vector, top_k.max(1)).await?)
    }

    async fn retrieval_turn(&self, question: &str, top_k: usize) -> Result<Turn, ChatError> {
        let semantic = self.semantic_hits(question, top_k).await?;
        let ranked = ranker::rank(&self.store, question, &semantic).await;
        let products = ranked.products();
        let scores = ranked.scores();

        let mut attempt = None;
        let mut generated = None;
        if self.config.chat_mode != ChatMode::Catalog {
            let prompt = chat_prompt(question, &products);
            let (generation, record) = self.generate(&prompt, None).await;
            generated = generation
                .filter(|generation| quality::accept(&generation.text, &products, generation.provider))
                .map(|generation| generation.text);
            attempt = Some(record);
        }

        let used_fallback = generated.is_none();
        if let Some(record) = attempt.as_mut() {
            record.used_fallback = used_fallback;
        }
        let answer = generated.unwrap_or_else(|| answer::build(question, &products, &scores));
        debug!(used_fallback, product_count = products.len(), "retrieval answer ready");

        Ok(Turn {
            response: ChatResponse::with_products(answer, &products),
            attempt,
        })
    }

    async fn general_turn(&self, question: &str) -> Turn {
        let prompt = general_prompt(question);
        let (generation, mut record) = self.generate(&prompt, Some(GENERAL_SYSTEM_PROMPT)).await;
        let answer = generation
            .map(|generation| generation.text)
            .filter(|text| !text.trim().is_empty());
        record.used_fallback = answer.is_none();

        Turn {
            response: ChatResponse::answer_only(
                answer.unwrap_or_else(|| GENERAL_UNAVAILABLE_ANSWER.to_string()),
            ),
            attempt: Some(record),
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> (Option<Generation>, ProviderAttempt) {
        match self.generator.generate(prompt, system_prompt).await {
            Ok(generation) => {
                let record = ProviderAttempt {
                    provider: generation.provider.to_string(),
                    model: generation.model.clone(),
                    prompt: prompt.to_string(),
                    result: Some(generation.text.clone()),
                    error: None,
                    used_fallback: false,
                };
                (Some(generation), record)
            }
            Err(error) => {
                if self.config.debug {
                    debug!(%error, "generation failed, using catalog answer");
                }
                let record = ProviderAttempt {
                    provider: self.generator.active_provider().to_string(),
                    model: self.generator.active_model(),
                    prompt: prompt.to_string(),
                    result: None,
                    error: Some(error.to_string()),
                    used_fallback: true,
                };
                (None, record)
            }
        }
    }

    fn finish(&self, turn: Turn, intent: &str) -> ChatResponse {
        let mut response = turn.response;
        if !self.config.debug {
            return response;
        }

        let llm_used = turn
            .attempt
            .as_ref()
            .filter(|attempt| attempt.result.is_some())
            .map(|attempt| attempt.provider.clone())
            .unwrap_or_else(|| "none".to_string());
        let llm_model = turn
            .attempt
            .as_ref()
            .map(|attempt| attempt.model.clone())
            .unwrap_or_else(|| self.generator.active_model());
        let llm_error = turn
            .attempt
            .as_ref()
            .and_then(|attempt| attempt.error.clone())
            .unwrap_or_default();

        response.diagnostics = Some(ChatDiagnostics {
            intent: intent.to_string(),
            llm_used,
            llm_model,
            llm_error,
            attempt: turn.attempt,
        });
        response
    }
}
