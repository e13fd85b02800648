#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Document(#[from] docent_memory::document::DocumentError),

    #[error(transparent)]
    Index(#[from] docent_memory::IndexError),
}
