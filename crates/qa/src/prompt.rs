//! Grounded prompt assembly
//!
//! Renders retrieved chunks into a context block and embeds it in the
//! fixed tutor prompt: role statement, strict grounding instruction, a
//! verbatim fallback phrase for absent answers, the question, and a
//! bullet-point formatting instruction.

use tutorforge_ingestion::chunker::Chunk;

/// Phrase the model must use verbatim when the content lacks the answer.
pub const NOT_FOUND_FALLBACK: &str = "Sorry, I couldn't find the answer in the textbook.";

/// Advisory returned when the completion service rate-limits a request.
pub const RATE_LIMIT_ADVISORY: &str =
    "⏳ Rate limit reached. Please wait 20 seconds and try again.";

/// Advisory returned when a question arrives before the throttle interval
/// has elapsed.
pub const THROTTLE_ADVISORY: &str =
    "⏳ Please wait 3 seconds before asking another question.";

/// Render retrieved chunks as a context block.
///
/// One line per chunk - page annotation plus text - joined with blank
/// lines, in retrieval order. The order signals relevance priority to the
/// model and must not be re-sorted.
pub fn render_context(chunks: &[&Chunk]) -> String {
    chunks
        .iter()
        .map(|c| format!("(Page {}) {}", c.page, c.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the full tutor prompt around an assembled context block.
pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "You are an AI tutor for school students.\n\
         \n\
         Answer the question using ONLY the textbook content below.\n\
         The answer MAY be paraphrased but MUST be based on the text.\n\
         \n\
         If the answer is not present, say:\n\
         \"{fallback}\"\n\
         \n\
         Textbook Content:\n\
         {context}\n\
         \n\
         Question: {question}\n\
         \n\
         Answer in clear bullet points:",
        fallback = NOT_FOUND_FALLBACK,
        context = context,
        question = question,
    )
}
