//! Local AI inference: policy-text chunking and ONNX sentence embeddings.

pub mod chunker;
#[cfg(feature = "onnx")]
mod embedder;

pub use chunker::Chunker;
#[cfg(feature = "onnx")]
pub use embedder::Embedder;
