use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DOCENT_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("DOCENT_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("DOCENT_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Ok(v) = std::env::var("DOCENT_INDEX_DIR") {
            self.index.dir = v.into();
        }
        if let Ok(v) = std::env::var("DOCENT_CHUNK_SIZE") {
            if let Ok(size) = v.parse::<usize>() {
                self.document.chunk_size = size;
            } else {
                tracing::warn!("ignoring invalid DOCENT_CHUNK_SIZE value: {v}");
            }
        }
        if let Ok(v) = std::env::var("DOCENT_CHUNK_OVERLAP") {
            if let Ok(overlap) = v.parse::<usize>() {
                self.document.chunk_overlap = overlap;
            } else {
                tracing::warn!("ignoring invalid DOCENT_CHUNK_OVERLAP value: {v}");
            }
        }
        if let Ok(v) = std::env::var("DOCENT_QUERY_TOP_K")
            && let Ok(k) = v.parse::<usize>()
        {
            self.query.top_k = k;
        }
        if let Ok(v) = std::env::var("DOCENT_QUERY_TEMPERATURE")
            && let Ok(t) = v.parse::<f32>()
        {
            self.query.temperature = t;
        }
        if let Ok(v) = std::env::var("DOCENT_QUERY_CONTEXT_BUDGET")
            && let Ok(budget) = v.parse::<usize>()
        {
            self.query.context_budget = budget;
        }
    }
}
