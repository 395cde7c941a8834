use crate::PipelineError;

/// Check encoder output against the contract: one vector per text, uniform
/// dimensionality, finite components.
pub fn validate_embeddings(
    vectors: &[Vec<f32>],
    expected_len: usize,
    dimensions: usize,
) -> Result<(), PipelineError> {
    if vectors.len() != expected_len {
        return Err(PipelineError::EncoderFailure(format!(
            "expected {} vectors, got {}",
            expected_len,
            vectors.len()
        )));
    }

    for (index, vector) in vectors.iter().enumerate() {
        if vector.len() != dimensions {
            return Err(PipelineError::EncoderFailure(format!(
                "vector {} has {} dimensions, expected {}",
                index,
                vector.len(),
                dimensions
            )));
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(PipelineError::EncoderFailure(format!(
                "vector {} contains non-finite values",
                index
            )));
        }
    }

    Ok(())
}
