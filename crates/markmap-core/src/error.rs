pub type Result<T> = std::result::Result<T, Error>;

/// Failures while turning a block's source text into a tree.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "Malformed YAML front-matter. If you were trying to use a YAML front-matter, please ensure that you've correctly opened and closed the YAML front-matter with un-indented `---` blocks"
    )]
    MalformedFrontMatter,

    #[error("Invalid YAML front-matter: {message}")]
    InvalidFrontMatterYaml { message: String },

    #[error("Mind map source contains no nodes")]
    EmptyDocument,
}
