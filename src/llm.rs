//! Answer-generation trait and prompt assembly.

use async_trait::async_trait;

use crate::document::Chunk;
use crate::error::Result;

/// A hosted language model that answers a question given supporting context.
///
/// Implementations receive *all* retrieved chunks for a single call (the
/// stuff strategy — no sub-batching or map-reduce) and may be
/// nondeterministic. The pipeline never retries a failed call.
#[async_trait]
pub trait AnswerModel: Send + Sync {
    /// Generate an answer to `question` using `context` as supporting
    /// passages.
    async fn answer(&self, question: &str, context: &[Chunk]) -> Result<String>;
}

/// Concatenate the retrieved chunks into a single context block, each
/// passage labelled with its provenance.
pub fn stuff_context(context: &[Chunk]) -> String {
    let mut block = String::new();
    for chunk in context {
        if !block.is_empty() {
            block.push_str("\n\n");
        }
        block.push_str(&format!("[{} of {}]\n{}", chunk.provenance, chunk.source, chunk.text));
    }
    block
}
