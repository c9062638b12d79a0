/// Magnitude substituted for (near-)zero vectors so normalization stays
/// finite and never produces NaN
pub const NORM_EPSILON: f32 = 1e-12;

/// L2-normalize a vector.
///
/// Computes sqrt(Σ vᵢ²) and divides every component by it. When the
/// magnitude falls below [`NORM_EPSILON`] the epsilon is used instead, so
/// the zero vector maps to a very large but finite result rather than
/// NaN or infinity.
pub fn normalize(vector: &[f32]) -> Vec<f32> {
    let magnitude = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    let magnitude = if magnitude < NORM_EPSILON {
        NORM_EPSILON
    } else {
        magnitude
    };
    vector.iter().map(|v| v / magnitude).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l2_norm(vector: &[f32]) -> f32 {
        vector.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    #[test]
    fn test_unit_norm() {
        let v = vec![3.0, 4.0];
        let n = normalize(&v);
        assert!((l2_norm(&n) - 1.0).abs() < 1e-6);
        assert!((n[0] - 0.6).abs() < 1e-6);
        assert!((n[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_unit_norm_many_dimensions() {
        let v: Vec<f32> = (0..384).map(|i| (i as f32 - 192.0) / 50.0).collect();
        let n = normalize(&v);
        assert!((l2_norm(&n) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector_is_finite() {
        let v = vec![0.0; 8];
        let n = normalize(&v);
        assert_eq!(n.len(), 8);
        for component in n {
            assert!(component.is_finite());
            assert!(!component.is_nan());
        }
    }

    #[test]
    fn test_negative_components() {
        let v = vec![-1.0, 2.0, -2.0];
        let n = normalize(&v);
        assert!((l2_norm(&n) - 1.0).abs() < 1e-6);
        assert!(n[0] < 0.0);
        assert!(n[2] < 0.0);
    }

    #[test]
    fn test_empty_vector() {
        let n = normalize(&[]);
        assert!(n.is_empty());
    }
}
