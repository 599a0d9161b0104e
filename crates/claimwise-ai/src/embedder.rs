//! ONNX Runtime sentence embeddings for clause retrieval.
//!
//! Runs a sentence-transformers model (all-MiniLM-L6-v2, 384 dimensions)
//! locally: tokenize, masked mean pooling over the token embeddings, then
//! L2 normalization so cosine similarity reduces to a dot product. The
//! model directory must contain `model.onnx` and `tokenizer.json`.

use std::path::Path;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::info;

/// Token budget per input (MiniLM's max sequence length).
const MAX_TOKENS: usize = 256;

/// Inputs per inference call; larger requests are processed in slices.
const SUB_BATCH: usize = 256;

/// Sentence embedding generator backed by ONNX Runtime.
pub struct Embedder {
    session: Session,
    tokenizer: Tokenizer,
    dim: usize,
}

impl Embedder {
    /// Load a model from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?.commit_from_file(&model_path)?;
        let dim = infer_dim(session.outputs()[0].dtype()).unwrap_or(384);

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;
        tokenizer.with_padding(Some(tokenizers::PaddingParams {
            ..Default::default()
        }));

        info!(dim, model = %model_path.display(), "loaded embedding model");
        Ok(Self {
            session,
            tokenizer,
            dim,
        })
    }

    /// Embedding dimensionality (384 for all-MiniLM-L6-v2).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Embed one text, returning a unit-length vector.
    pub fn embed(&mut self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut vectors = self.run_inference(&[text])?;
        Ok(vectors.pop().unwrap())
    }

    /// Embed many texts, returning one unit-length vector per input.
    ///
    /// Inputs are sliced into sub-batches internally so callers can pass
    /// an entire document's chunks in one call.
    pub fn embed_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for slice in texts.chunks(SUB_BATCH) {
            vectors.extend(self.run_inference(slice)?);
        }
        Ok(vectors)
    }

    fn run_inference(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let batch = texts.len();

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;
        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        // Flat [batch, seq_len] tensors.
        let mut input_ids = vec![0i64; batch * seq_len];
        let mut attention_mask = vec![0i64; batch * seq_len];
        let mut token_type_ids = vec![0i64; batch * seq_len];
        for (i, encoding) in encodings.iter().enumerate() {
            let offset = i * seq_len;
            for (j, &id) in encoding.get_ids().iter().enumerate() {
                input_ids[offset + j] = id as i64;
            }
            for (j, &mask) in encoding.get_attention_mask().iter().enumerate() {
                attention_mask[offset + j] = mask as i64;
            }
            for (j, &tid) in encoding.get_type_ids().iter().enumerate() {
                token_type_ids[offset + j] = tid as i64;
            }
        }

        let shape = [batch as i64, seq_len as i64];
        let ids_tensor = Tensor::from_array((shape, input_ids.into_boxed_slice()))?;
        let mask_tensor = Tensor::from_array((shape, attention_mask.clone().into_boxed_slice()))?;
        let type_tensor = Tensor::from_array((shape, token_type_ids.into_boxed_slice()))?;

        let outputs = self.session.run(ort::inputs![
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
            "token_type_ids" => type_tensor,
        ])?;

        // Token embeddings come back as [batch, seq_len, dim].
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[0] as usize == batch && dims[2] as usize == self.dim,
            "unexpected output shape {dims:?}, expected [{batch}, {seq_len}, {}]",
            self.dim
        );
        let out_seq_len = dims[1] as usize;

        let mut vectors = Vec::with_capacity(batch);
        for i in 0..batch {
            let mut pooled = vec![0.0f32; self.dim];
            let mut mask_total = 0.0f32;
            for j in 0..out_seq_len {
                let mask = attention_mask[i * seq_len + j] as f32;
                if mask > 0.0 {
                    let offset = (i * out_seq_len + j) * self.dim;
                    for (d, p) in pooled.iter_mut().enumerate() {
                        *p += output_data[offset + d] * mask;
                    }
                    mask_total += mask;
                }
            }
            if mask_total > 0.0 {
                for p in &mut pooled {
                    *p /= mask_total;
                }
            }
            normalize(&mut pooled);
            vectors.push(pooled);
        }
        Ok(vectors)
    }
}

/// L2-normalize in place.
fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Read the embedding dimension off the model's declared output shape.
fn infer_dim(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn model_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("models")
            .join("all-MiniLM-L6-v2")
    }

    fn require_model() -> PathBuf {
        let dir = model_dir();
        if !dir.join("model.onnx").exists() {
            panic!(
                "Model not found. Download from HuggingFace:\n  \
                 curl -L -o models/all-MiniLM-L6-v2/model.onnx \
                 https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/onnx/model.onnx"
            );
        }
        dir
    }

    #[test]
    fn load_model() {
        let dir = require_model();
        let embedder = Embedder::load(&dir).unwrap();
        assert_eq!(embedder.dim(), 384);
    }

    #[test]
    fn embed_single_clause() {
        let dir = require_model();
        let mut embedder = Embedder::load(&dir).unwrap();
        let vec = embedder
            .embed("Orthopaedic procedures are subject to a waiting period")
            .unwrap();
        assert_eq!(vec.len(), 384);
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "expected unit norm, got {norm}");
    }

    #[test]
    fn embed_batch_of_clauses() {
        let dir = require_model();
        let mut embedder = Embedder::load(&dir).unwrap();
        let texts = &[
            "Knee and hip replacement surgery coverage",
            "Pre-existing conditions excluded for 36 months",
            "Cashless treatment at network hospitals",
        ];
        let vecs = embedder.embed_batch(texts).unwrap();
        assert_eq!(vecs.len(), 3);
        for (i, v) in vecs.iter().enumerate() {
            assert_eq!(v.len(), 384, "text {i} has wrong dimension");
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!(
                (norm - 1.0).abs() < 1e-4,
                "text {i}: expected unit norm, got {norm}"
            );
        }
    }

    #[test]
    fn related_clauses_are_closer() {
        let dir = require_model();
        let mut embedder = Embedder::load(&dir).unwrap();

        let v_knee = embedder.embed("knee surgery waiting period").unwrap();
        let v_ortho = embedder
            .embed("orthopaedic joint replacement procedures")
            .unwrap();
        let v_premium = embedder.embed("premium payment grace period").unwrap();

        let sim_ortho = cosine_sim(&v_knee, &v_ortho);
        let sim_premium = cosine_sim(&v_knee, &v_premium);
        assert!(
            sim_ortho > sim_premium,
            "knee-ortho ({sim_ortho:.4}) should beat knee-premium ({sim_premium:.4})"
        );
    }

    #[test]
    fn embed_empty_batch() {
        let dir = require_model();
        let mut embedder = Embedder::load(&dir).unwrap();
        assert!(embedder.embed_batch(&[]).unwrap().is_empty());
    }

    fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }
}
