/// Sentence the model is told to use when the context cannot answer the question.
pub const REFUSAL: &str =
    "The context doesn't contain enough information to answer this question.";

pub const STOP_SEQUENCES: [&str; 4] = ["\n\n", "Context:", "Question:", "Answer:"];

/// The retry prompt ends on "Answer based on the context:", so `Answer:` must not stop it.
pub const RETRY_STOP_SEQUENCES: [&str; 3] = ["\n\n", "Context:", "Question:"];

#[must_use]
pub fn answer_prompt(question: &str, context: &str) -> String {
    format!(
        "You must answer based ONLY on the provided context. \
         Do not provide generic information.\n\n\
         Context: {context}\n\n\
         Question: {question}\n\n\
         Based on the context above, provide a detailed answer. If the context doesn't contain \
         enough information to answer the question, say \"{REFUSAL}\" \
         Start your response directly:"
    )
}

#[must_use]
pub fn retry_prompt(question: &str, context: &str) -> String {
    format!(
        "Use ONLY the context below to answer the question. Do not provide generic information.\n\n\
         Context: {context}\n\n\
         Question: {question}\n\n\
         Answer based on the context:"
    )
}
