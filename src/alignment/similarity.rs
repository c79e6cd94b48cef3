// Cosine similarity between column vectors.
//
// The result is `None` when cosine is undefined: mismatched or empty
// dimensions, a zero-norm vector, or a non-finite result. A similarity graph
// turns `None` into a missing edge; 0.0 is a real score and stays an edge.

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn norm(a: &[f64]) -> f64 {
    a.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// `dot(a, b) / (|a| * |b|)`, in [-1, 1].
pub fn cosine(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let denom = norm(a) * norm(b);
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }

    let sim = dot(a, b) / denom;
    // Rounding can push |sim| a hair past 1.
    sim.is_finite().then(|| sim.clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let a = vec![1.0, 2.0, 3.0];
        let sim = cosine(&a, &a).unwrap();
        assert!((sim - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_orthogonal_is_zero_not_absent() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        let sim = cosine(&a, &b).expect("orthogonal vectors have a defined cosine");
        assert!(sim.abs() < 1e-10);
    }

    #[test]
    fn test_cosine_proportional() {
        // Same direction, different magnitudes, should be 1.0
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![2.0, 4.0, 6.0];
        assert!((cosine(&a, &b).unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_opposite_is_negative_one() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![-3.0, 0.0, 0.0];
        assert!((cosine(&a, &b).unwrap() + 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_zero_vector_is_undefined() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![1.0, 2.0, 3.0];
        assert!(cosine(&a, &b).is_none());
        assert!(cosine(&b, &a).is_none());
    }

    #[test]
    fn test_cosine_empty_is_undefined() {
        assert!(cosine(&[], &[]).is_none());
    }

    #[test]
    fn test_cosine_mismatched_dimensions_is_undefined() {
        assert!(cosine(&[1.0, 2.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_cosine_is_symmetric() {
        let a = vec![1.0, 3.0, -2.0, 0.5];
        let b = vec![2.0, -1.0, 4.0, 0.0];
        let ab = cosine(&a, &b).unwrap();
        let ba = cosine(&b, &a).unwrap();
        assert!((ab - ba).abs() < 1e-12, "Cosine should be symmetric");
    }

    #[test]
    fn test_cosine_overflowing_norm_is_undefined() {
        let a = vec![1e200, 1e200];
        let b = vec![1e200, 1e200];
        // norm overflows to infinity
        assert!(cosine(&a, &b).is_none());
        let c = vec![1e100, 3e100];
        let sim = cosine(&c, &c).unwrap();
        assert!(sim <= 1.0 && sim >= -1.0);
    }
}
