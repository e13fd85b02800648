pub const NO_DOCUMENTS_ANSWER: &str =
    "I don't have any relevant information to answer your question. \
     Please upload some documents first.";

pub const BACKEND_UNAVAILABLE_ANSWER: &str = "Ollama is not available. Please install and start \
Ollama to enable chat functionality.\n\n\
To fix this:\n\
1. Install Ollama from https://ollama.ai\n\
2. Start the service: `ollama serve`\n\
3. Pull a model: `ollama pull llama3.2:3b`";

const ROLE_PREFIXES: [&str; 5] = ["Q:", "A:", "Question:", "Answer:", "Response:"];

/// Answers shorter than this, in characters, trigger one regeneration.
pub const MIN_ANSWER_CHARS: usize = 50;

/// Trim the raw completion and strip leading role labels until none remain.
#[must_use]
pub fn strip_role_prefixes(raw: &str) -> String {
    let mut text = raw.trim();
    while let Some(rest) = ROLE_PREFIXES.iter().find_map(|p| text.strip_prefix(p)) {
        text = rest.trim_start();
    }
    text.to_owned()
}

/// Short or dangling (`...:`) answers are treated as incomplete.
#[must_use]
pub fn needs_repair(answer: &str) -> bool {
    answer.ends_with(':') || answer.chars().count() < MIN_ANSWER_CHARS
}
