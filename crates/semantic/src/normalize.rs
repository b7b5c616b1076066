use crate::EmbeddingError;

/// In-place L2 normalization. Zero vectors are left untouched.
pub fn l2_normalize_in_place(v: &mut [f32]) {
    let norm_sq: f32 = v.iter().map(|x| x * x).sum();
    if norm_sq > 0.0 {
        let inv_norm = norm_sq.sqrt().recip();
        for x in v.iter_mut() {
            *x *= inv_norm;
        }
    }
}

/// Collapses every run of Unicode whitespace to a single space and trims the ends.
///
/// Returns [`EmbeddingError::EmptyInput`] when nothing is left, so every embedder
/// rejects blank queries the same way.
pub fn prepare_text(text: &str) -> Result<String, EmbeddingError> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(EmbeddingError::EmptyInput);
    }
    Ok(collapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_normalize_simple_vector() {
        let mut v = vec![3.0f32, 4.0];
        l2_normalize_in_place(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_zero_vector() {
        let mut v = vec![0.0f32, 0.0, 0.0];
        l2_normalize_in_place(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn l2_normalize_maintains_unit_length() {
        let mut v = vec![-1.0f32, 2.0, -3.0, 4.0];
        l2_normalize_in_place(&mut v);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn prepare_text_collapses_whitespace() {
        assert_eq!(
            prepare_text("  what\tis \n\n cholera  ").unwrap(),
            "what is cholera"
        );
    }

    #[test]
    fn prepare_text_rejects_blank() {
        assert_eq!(prepare_text(""), Err(EmbeddingError::EmptyInput));
        assert_eq!(prepare_text(" \n\t\u{3000}"), Err(EmbeddingError::EmptyInput));
    }
}
