use crate::keyword::KeywordQuery;
use crate::traits::ProductStore;
use crate::{Candidate, CandidateSource, Product, RankedProduct, RankedResult, SearchHit};
use std::collections::HashMap;
use tracing::warn;

pub const KEYWORD_LIMIT: usize = 10;
pub const RANKED_LIMIT: usize = 12;

pub const KEYWORD_BASE_BOOST: f64 = 0.22;
pub const NAME_MATCH_BOOST: f64 = 0.35;
pub const CATEGORY_MATCH_BOOST: f64 = 0.12;
pub const TOKEN_OVERLAP_STEP: f64 = 0.03;
pub const TOKEN_OVERLAP_CAP: f64 = 0.18;

/// Scores are additive and not normalised: semantic similarity seeds the
/// map and keyword literal matches add fixed boosts on top.
pub async fn rank<S>(store: &S, question: &str, semantic: &[SearchHit]) -> RankedResult
where
    S: ProductStore + Send + Sync + ?Sized,
{
    let query = KeywordQuery::parse(question);
    let keyword_hits = if query.is_empty() {
        Vec::new()
    } else {
        store
            .find_by_keyword(&query, KEYWORD_LIMIT)
            .await
            .unwrap_or_else(|error| {
                warn!(%error, "keyword search failed, ranking on semantic hits only");
                Vec::new()
            })
    };

    let candidates = fuse(question, semantic, &keyword_hits);
    materialize(store, candidates).await
}

/// Merges semantic and keyword candidates into one list, best first.
///
/// Ties keep insertion order, so semantic entries stay ahead of keyword-only
/// entries with the same score.
pub fn fuse(question: &str, semantic: &[SearchHit], keyword_hits: &[Product]) -> Vec<Candidate> {
    let mut scored = ScoreMap::default();
    for hit in semantic {
        scored.seed(&hit.id, hit.score);
    }

    let lowered = question.to_lowercase();
    let tokens = question_tokens(&lowered);
    for product in keyword_hits {
        scored.boost(&product.id, keyword_boost(&lowered, &tokens, product));
    }

    scored.into_ranked()
}

pub fn keyword_boost(lowered_question: &str, question_tokens: &[String], product: &Product) -> f64 {
    let mut boost = KEYWORD_BASE_BOOST;

    let name = product.name.trim().to_lowercase();
    if !name.is_empty() && lowered_question.contains(&name) {
        boost += NAME_MATCH_BOOST;
    }

    let category = product.category.trim().to_lowercase();
    if !category.is_empty() && lowered_question.contains(&category) {
        boost += CATEGORY_MATCH_BOOST;
    }

    let description = product.description.to_lowercase();
    let overlap = question_tokens
        .iter()
        .filter(|token| name.contains(token.as_str()) || description.contains(token.as_str()))
        .count();
    boost += (TOKEN_OVERLAP_STEP * overlap as f64).min(TOKEN_OVERLAP_CAP);

    boost
}

/// Lowercased whitespace tokens longer than two characters, trimmed of
/// surrounding punctuation. Duplicates are kept.
pub fn question_tokens(lowered_question: &str) -> Vec<String> {
    lowered_question
        .split_whitespace()
        .map(|token| token.trim_matches(|ch: char| !ch.is_alphanumeric()))
        .filter(|token| token.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

async fn materialize<S>(store: &S, candidates: Vec<Candidate>) -> RankedResult
where
    S: ProductStore + Send + Sync + ?Sized,
{
    let top: Vec<Candidate> = candidates.into_iter().take(RANKED_LIMIT).collect();
    if top.is_empty() {
        return RankedResult::default();
    }

    let ids: Vec<String> = top.iter().map(|candidate| candidate.id.clone()).collect();
    let products = store.find_by_ids(&ids).await.unwrap_or_else(|error| {
        warn!(%error, "product lookup failed for ranked ids");
        Vec::new()
    });
    let mut by_id: HashMap<String, Product> = products
        .into_iter()
        .map(|product| (product.id.clone(), product))
        .collect();

    RankedResult {
        items: top
            .into_iter()
            .filter_map(|candidate| {
                by_id.remove(&candidate.id).map(|product| RankedProduct {
                    product,
                    score: candidate.score,
                    source: candidate.source,
                })
            })
            .collect(),
    }
}

#[derive(Default)]
struct ScoreMap {
    order: Vec<Candidate>,
    positions: HashMap<String, usize>,
}

impl ScoreMap {
    fn seed(&mut self, id: &str, score: f64) {
        if self.positions.contains_key(id) {
            return;
        }
        self.positions.insert(id.to_string(), self.order.len());
        self.order.push(Candidate {
            id: id.to_string(),
            score,
            source: CandidateSource::Semantic,
        });
    }

    fn boost(&mut self, id: &str, boost: f64) {
        match self.positions.get(id) {
            Some(&position) => {
                let entry = &mut self.order[position];
                entry.score += boost;
                entry.source = CandidateSource::Hybrid;
            }
            None => {
                self.positions.insert(id.to_string(), self.order.len());
                self.order.push(Candidate {
                    id: id.to_string(),
                    score: boost,
                    source: CandidateSource::Keyword,
                });
            }
        }
    }

    fn into_ranked(self) -> Vec<Candidate> {
        let mut ranked = self.order;
        ranked.sort_by(|left, right| right.score.total_cmp(&left.score));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PriceDirection, StoreError};
    use async_trait::async_trait;

    fn hit(id: &str, score: f64) -> SearchHit {
        SearchHit {
            id: id.to_string(),
            score,
        }
    }

    fn product(id: &str, name: &str, category: &str, description: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            ..Product::default()
        }
    }

    #[test]
    fn keyword_hit_on_semantic_candidate_becomes_hybrid() {
        let semantic = vec![hit("p-1", 0.5)];
        let keyword = vec![product("p-1", "X9", "", "")];

        let fused = fuse("x9", &semantic, &keyword);

        assert_eq!(fused.len(), 1);
        assert!((fused[0].score - 1.07).abs() < 1e-9);
        assert_eq!(fused[0].source, CandidateSource::Hybrid);
    }

    #[test]
    fn boosts_combine_name_category_and_overlap() {
        let tokens = question_tokens("aurora headphones for travel");
        let aurora = product(
            "p-1",
            "Aurora Headphones",
            "headphones",
            "Great for travel",
        );

        let boost = keyword_boost("aurora headphones for travel", &tokens, &aurora);
        // aurora, headphones, for, travel all overlap
        let expected = 0.22 + 0.35 + 0.12 + 0.12;
        assert!((boost - expected).abs() < 1e-9);
    }

    #[test]
    fn token_overlap_is_capped() {
        let question = "alpha bravo charlie delta echo foxtrot golf hotel";
        let tokens = question_tokens(question);
        let everything = product("p-1", "Widget", "", question);

        let boost = keyword_boost(question, &tokens, &everything);
        assert!((boost - (KEYWORD_BASE_BOOST + TOKEN_OVERLAP_CAP)).abs() < 1e-9);
    }

    #[test]
    fn ties_keep_semantic_entries_first() {
        let semantic = vec![hit("sem", 0.22)];
        let keyword = vec![product("kw", "Unrelated", "", "")];

        let fused = fuse("zz", &semantic, &keyword);

        assert_eq!(fused[0].id, "sem");
        assert_eq!(fused[0].source, CandidateSource::Semantic);
        assert_eq!(fused[1].id, "kw");
        assert_eq!(fused[1].source, CandidateSource::Keyword);
    }

    #[test]
    fn fusion_is_repeatable() {
        let semantic = vec![hit("a", 0.4), hit("b", 0.4), hit("c", 0.1)];
        let keyword = vec![product("c", "Mug", "kitchen", "ceramic mug"), product("d", "Cup", "", "")];

        let first = fuse("ceramic mug", &semantic, &keyword);
        let second = fuse("ceramic mug", &semantic, &keyword);
        assert_eq!(first, second);
        assert_eq!(first[0].id, "c");
    }

    #[test]
    fn punctuation_is_trimmed_from_tokens() {
        assert_eq!(
            question_tokens("headphones? under $50, ok"),
            vec!["headphones".to_string(), "under".to_string()]
        );
    }

    struct FakeStore {
        products: Vec<Product>,
        keyword_hits: Vec<Product>,
    }

    #[async_trait]
    impl ProductStore for FakeStore {
        async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, StoreError> {
            // reversed on purpose; ranking must restore order
            Ok(self
                .products
                .iter()
                .rev()
                .filter(|product| ids.contains(&product.id))
                .cloned()
                .collect())
        }

        async fn find_all(&self, _limit: usize) -> Result<Vec<Product>, StoreError> {
            Ok(self.products.clone())
        }

        async fn find_sorted_by_price(
            &self,
            _direction: PriceDirection,
            _limit: usize,
        ) -> Result<Vec<Product>, StoreError> {
            Ok(Vec::new())
        }

        async fn find_by_keyword(
            &self,
            _query: &KeywordQuery,
            _limit: usize,
        ) -> Result<Vec<Product>, StoreError> {
            Ok(self.keyword_hits.clone())
        }
    }

    #[tokio::test]
    async fn rank_restores_order_and_drops_unknown_ids() {
        let store = FakeStore {
            products: vec![
                product("a", "Alpha Lamp", "lighting", ""),
                product("b", "Bravo Mug", "kitchen", ""),
            ],
            keyword_hits: vec![product("b", "Bravo Mug", "kitchen", "")],
        };
        let semantic = vec![hit("a", 0.6), hit("ghost", 0.5), hit("b", 0.2)];

        let ranked = rank(&store, "bravo mug", &semantic).await;

        let ids: Vec<&str> = ranked.items.iter().map(|item| item.product.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(ranked.items[0].source, CandidateSource::Hybrid);
        assert!((ranked.items[1].score - 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn rank_caps_materialized_results() {
        let products: Vec<Product> = (0..20)
            .map(|index| product(&format!("p-{index}"), &format!("Item {index}"), "", ""))
            .collect();
        let semantic: Vec<SearchHit> = (0..20)
            .map(|index| hit(&format!("p-{index}"), 1.0 - index as f64 * 0.01))
            .collect();
        let store = FakeStore {
            products,
            keyword_hits: Vec::new(),
        };

        let ranked = rank(&store, "q", &semantic).await;
        assert_eq!(ranked.len(), RANKED_LIMIT);
        assert_eq!(ranked.items[0].product.id, "p-0");
    }
}
