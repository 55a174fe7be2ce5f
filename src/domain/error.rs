use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("stored value under `{key}` is malformed; fix or remove it before starting: {source}")]
    MalformedStore {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
