use crate::Product;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 256;

pub trait Embedder {
    fn dimensions(&self) -> usize;
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Hashed character-trigram embedder with unit-length output, so the dot
/// product of two embeddings is their cosine similarity.
#[derive(Debug, Clone, Copy)]
pub struct TrigramEmbedder {
    pub dimensions: usize,
}

impl Default for TrigramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl Embedder for TrigramEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let padded = format!(" {} ", text.to_lowercase());
        let chars: Vec<char> = padded.chars().collect();

        for window in chars.windows(3) {
            if window.iter().all(|ch| ch.is_whitespace()) {
                continue;
            }
            let mut hash = 1469598103934665603u64;
            for ch in window {
                let mut buffer = [0u8; 4];
                for byte in ch.encode_utf8(&mut buffer).bytes() {
                    hash ^= byte as u64;
                    hash = hash.wrapping_mul(1099511628211);
                }
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

/// Text a product is embedded under: name, category, description and highlights.
pub fn product_embedding_text(product: &Product) -> String {
    let mut parts = vec![product.name.as_str(), product.category.as_str()];
    parts.push(product.description.as_str());
    parts.extend(product.highlights.iter().map(String::as_str));
    parts
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(". ")
}

pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f64 {
    let dot: f32 = left.iter().zip(right).map(|(a, b)| a * b).sum();
    let left_norm = left.iter().map(|value| value * value).sum::<f32>().sqrt();
    let right_norm = right.iter().map(|value| value * value).sum::<f32>().sqrt();
    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }
    f64::from(dot / (left_norm * right_norm))
}
