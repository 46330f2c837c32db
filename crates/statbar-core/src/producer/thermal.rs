//! Thermal zone reading.

pub const PLACEHOLDER: &str = "??°C";

/// Formats a thermal zone value given in millidegrees Celsius.
pub fn format(millidegrees: Option<i64>) -> String {
    match millidegrees {
        Some(m) => format!("{:2.0}°C", m as f64 / 1e3),
        None => PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(format(Some(42000)), "42°C");
        assert_eq!(format(Some(41600)), "42°C");
        assert_eq!(format(Some(5000)), " 5°C");
        assert_eq!(format(None), "??°C");
    }
}
