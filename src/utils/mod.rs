use url::Url;

use crate::domain::AppError;

/// Checks that the input is an absolute http(s) URL before any request is made.
pub fn validate_source_url(input: &str) -> Result<Url, AppError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AppError::Validation("URL is required".to_string()));
    }

    let url = Url::parse(input).map_err(|e| AppError::Validation(format!("{}: {}", input, e)))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(AppError::Validation(format!(
            "{}: expected an http or https link",
            input
        ))),
    }
}

/// Formats a count with thousands separators, e.g. `1234567` -> `1,234,567`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats seconds as `m:ss`, or `h:mm:ss` past an hour.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Rounded percentage label, e.g. `42.6` -> `43%`.
pub fn percent_label(percent: f32) -> String {
    format!("{}%", percent.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_source_url() {
        assert!(validate_source_url("  https://www.youtube.com/@chan/videos ").is_ok());
        assert!(matches!(validate_source_url(""), Err(AppError::Validation(_))));
        assert!(matches!(validate_source_url("   "), Err(AppError::Validation(_))));
        assert!(matches!(validate_source_url("not a url"), Err(AppError::Validation(_))));
        assert!(matches!(
            validate_source_url("ftp://example.com/list"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(5.0), "0:05");
        assert_eq!(format_duration(754.4), "12:34");
        assert_eq!(format_duration(3725.0), "1:02:05");
    }

    #[test]
    fn test_percent_label() {
        assert_eq!(percent_label(42.6), "43%");
        assert_eq!(percent_label(0.0), "0%");
        assert_eq!(percent_label(100.0), "100%");
    }
}
