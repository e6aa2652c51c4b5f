//! Millimetre to printer-dot conversion
//!
//! Both command languages address a 203 DPI raster, i.e. 8 dots per mm.

/// Device resolution in dots per millimetre
pub const DOTS_PER_MM: f64 = 8.0;

/// Device resolution in dots per inch, as announced in headers
pub const DPI: u32 = 203;

/// Convert millimetres to dots
///
/// Rounds to nearest, ties away from zero. Every coordinate is converted
/// on its own so rounding error never accumulates across elements.
pub fn mm_to_dots(mm: f64) -> i64 {
    (mm * DOTS_PER_MM).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(mm_to_dots(0.0), 0);
    }

    #[test]
    fn test_one_inch() {
        assert_eq!(mm_to_dots(25.4), 203);
    }

    #[test]
    fn test_half_dot_rounds_up() {
        // 0.0625 mm = 0.5 dot
        assert_eq!(mm_to_dots(0.0625), 1);
        assert_eq!(mm_to_dots(0.05), 0);
        assert_eq!(mm_to_dots(50.0), 400);
    }

    #[test]
    fn test_monotonic() {
        let mut prev = mm_to_dots(0.0);
        for i in 1..=2000 {
            let dots = mm_to_dots(i as f64 * 0.037);
            assert!(dots >= prev, "not monotonic at step {}", i);
            prev = dots;
        }
    }
}
