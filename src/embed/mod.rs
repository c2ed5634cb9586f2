// Sentence embeddings — trait-based so the backend can be swapped.
//
// The default backend runs a BERT-family sentence encoder locally via ONNX.

pub mod download;
pub mod onnx;
pub mod traits;
