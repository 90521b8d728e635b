use num_traits::Float;

/// Generic linear interpolation between two values.
pub fn lin_interp<T: Float>(v0: T, v1: T, fac: T) -> T {
    v0 + (v1 - v0) * fac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lin_interp() {
        assert_eq!(lin_interp(1.0, 3.0, 0.5), 2.0);
        assert_eq!(lin_interp(5.0, 9.0, 0.0), 5.0);
        assert_eq!(lin_interp(5.0, 9.0, 1.0), 9.0);
    }
}
