use crate::core::errors::ApiError;

use super::AppConfig;

/// Reject configurations the chunking and retrieval pipeline cannot run with.
pub fn validate_config(config: &AppConfig) -> Result<(), ApiError> {
    if config.chunk_size == 0 {
        return Err(ApiError::BadRequest("chunk_size must be positive".into()));
    }
    if config.chunk_overlap >= config.chunk_size {
        return Err(ApiError::BadRequest(
            "chunk_overlap must be smaller than chunk_size".into(),
        ));
    }
    if config.max_results == 0 {
        return Err(ApiError::BadRequest("max_results must be positive".into()));
    }
    if config.max_history == 0 {
        return Err(ApiError::BadRequest("max_history must be positive".into()));
    }
    if config.anthropic.max_tokens == 0 {
        return Err(ApiError::BadRequest(
            "anthropic.max_tokens must be positive".into(),
        ));
    }
    if config.anthropic.model.trim().is_empty() {
        return Err(ApiError::BadRequest("anthropic.model must be set".into()));
    }
    if config.embedding.model.trim().is_empty() {
        return Err(ApiError::BadRequest("embedding.model must be set".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        let mut config = AppConfig::default();
        config.chunk_overlap = config.chunk_size;
        assert!(validate_config(&config).is_err());

        config.chunk_overlap = config.chunk_size - 1;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_zero_top_k() {
        let mut config = AppConfig::default();
        config.max_results = 0;
        assert!(validate_config(&config).is_err());
    }
}
