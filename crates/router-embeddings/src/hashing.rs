//! Feature-hashing embedder.
//!
//! Each lower-cased alphanumeric token is hashed with SHA-256; the first
//! eight digest bytes pick a bucket and the ninth picks a sign. The bucket
//! counts are L2-normalized. Texts sharing words land close together, which
//! is enough to route between a handful of distinct action descriptions
//! without downloading a model.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::EmbeddingError;
use crate::model::{ensure_text, Embedding, EmbeddingModel, ModelInfo};

/// Deterministic bag-of-words embedder.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    info: ModelInfo,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self, EmbeddingError> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidInput(
                "hashing dimension must be > 0".to_string(),
            ));
        }
        Ok(Self {
            info: ModelInfo {
                name: format!("feature-hashing-{}", dimension),
                dimension,
                max_sequence_length: usize::MAX,
            },
        })
    }

    fn bucket(&self, token: &str) -> (usize, f32) {
        let digest = Sha256::digest(token.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let index = (u64::from_le_bytes(head) % self.info.dimension as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

impl EmbeddingModel for HashingEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        ensure_text(text)?;

        let mut values = vec![0.0f32; self.info.dimension];
        let mut tokens = 0usize;
        for token in tokenize(text) {
            let (index, sign) = self.bucket(&token);
            values[index] += sign;
            tokens += 1;
        }

        // A zero vector is equidistant from every entry and would match
        // whichever action comes first.
        if tokens == 0 {
            return Err(EmbeddingError::InvalidInput(
                "text has no alphanumeric tokens".to_string(),
            ));
        }

        debug!(tokens, "Hashed text");
        Ok(Embedding::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq_distance(a: &Embedding, b: &Embedding) -> f32 {
        a.values
            .iter()
            .zip(&b.values)
            .map(|(x, y)| (x - y) * (x - y))
            .sum()
    }

    #[test]
    fn test_rejects_zero_dimension() {
        assert!(HashingEmbedder::new(0).is_err());
    }

    #[test]
    fn test_is_deterministic() {
        let embedder = HashingEmbedder::new(256).unwrap();
        let a = embedder.embed("Open Google Chrome to the home page.").unwrap();
        let b = embedder.embed("Open Google Chrome to the home page.").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.dimension(), 256);
    }

    #[test]
    fn test_output_is_unit_length() {
        let embedder = HashingEmbedder::new(128).unwrap();
        let emb = embedder.embed("check the ram").unwrap();
        let norm_sq: f32 = emb.values.iter().map(|x| x * x).sum();
        assert!((norm_sq - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let embedder = HashingEmbedder::new(256).unwrap();
        let a = embedder.embed("Launch the CALCULATOR!").unwrap();
        let b = embedder.embed("launch the calculator").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_empty_text() {
        let embedder = HashingEmbedder::new(64).unwrap();
        assert!(matches!(
            embedder.embed(""),
            Err(EmbeddingError::InvalidInput(_))
        ));
        assert!(embedder.embed_batch(&["ok", " "]).is_err());
    }

    #[test]
    fn test_rejects_text_without_tokens() {
        let embedder = HashingEmbedder::new(256).unwrap();
        for text in ["?!?", "!!!", "... --- ..."] {
            assert!(
                matches!(embedder.embed(text), Err(EmbeddingError::InvalidInput(_))),
                "text: {text:?}"
            );
        }
        assert!(embedder.embed("?!? calculator").is_ok());
    }

    #[test]
    fn test_shared_words_are_closer() {
        let embedder = HashingEmbedder::new(1024).unwrap();
        let query = embedder.embed("launch the calculator").unwrap();
        let calc = embedder
            .embed("Open the calculator application on the system.")
            .unwrap();
        let ram = embedder
            .embed("Check the system RAM usage and return it as a percentage.")
            .unwrap();

        assert!(sq_distance(&query, &calc) < sq_distance(&query, &ram));
    }
}
