/// Vectors with an L2 norm below this are treated as degenerate and never divided by.
pub const NORM_EPSILON: f32 = 1e-6;

pub fn l2_norm(v: &[f32]) -> f32 {
    // Accumulate in f64; long embeddings lose precision otherwise.
    let mut sum = 0.0f64;
    for x in v {
        let x = f64::from(*x);
        sum += x * x;
    }
    sum.sqrt() as f32
}

/// Unit-length copy of `v`, or `None` when the norm is tiny or not finite.
pub fn normalized(v: &[f32]) -> Option<Vec<f32>> {
    let norm = l2_norm(v);
    if !norm.is_finite() || norm < NORM_EPSILON {
        return None;
    }
    Some(v.iter().map(|x| x / norm).collect())
}

/// Inner product of two unit vectors, clamped to [-1, 1].
pub fn unit_dot(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
    }
    (dot as f32).clamp(-1.0, 1.0)
}
