//! Prompt construction for grounded answers.
//!
//! The generation step is only trusted because the prompt confines the
//! model to the retrieved excerpts and tells it what to say when they do
//! not contain the answer.

use newsbot_types::retrieval::RetrievedPassage;

/// Reply used when no passage clears the score threshold. The language
/// model is never called in that case.
pub const FALLBACK_REPLY: &str =
    "I couldn't find relevant information about that in the provided articles.";

/// Reply the model is instructed to give when the context lacks the answer.
pub const NOT_IN_CONTEXT_REPLY: &str =
    "I couldn't find information about that in the provided articles.";

/// Placed between consecutive passages in the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Join passage texts in the order given. No re-ranking happens here.
pub fn build_context(passages: &[RetrievedPassage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Build the full prompt. `context` and `question` are embedded verbatim.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a news assistant. Answer the user's question using only the news article \
excerpts in the CONTEXT section below. Keep the answer short and factual. \
If the excerpts do not contain the answer, reply exactly: \"{NOT_IN_CONTEXT_REPLY}\"\n\
\n\
CONTEXT:\n\
{context}\n\
\n\
USER'S QUESTION:\n\
{question}\n"
    )
}
