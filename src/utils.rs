// src/utils.rs
use regex::Regex;
use std::sync::OnceLock;

static NON_DIAL: OnceLock<Regex> = OnceLock::new();

fn non_dial() -> &'static Regex {
    NON_DIAL.get_or_init(|| Regex::new(r"[^0-9+]").expect("valid regex literal"))
}

/// Pick the first usable entry out of a phone-number field.
///
/// The column holds whatever upstream scraping left behind: a JSON-encoded
/// array of numbers, a comma-separated list, or a single free-text number.
fn first_phone_entry(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('[') {
        if let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(trimmed) {
            return values
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .find(|s| !s.is_empty());
        }
    }

    trimmed
        .split(',')
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Best-effort normalization of a stored phone number into E.164 shape.
///
/// Ten bare digits are assumed to be US numbers. Anything that cleans up to
/// fewer than ten digits is rejected rather than dialed.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let entry = first_phone_entry(raw)?;
    let cleaned = non_dial().replace_all(&entry, "");
    let digits: String = cleaned.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        10 => Some(format!("+1{}", digits)),
        11..=15 => Some(format!("+{}", digits)),
        _ => None,
    }
}

/// Strip currency formatting from an estimated-pay value before it is read
/// aloud on a call ("$2,400" would otherwise be pronounced literally).
pub fn normalize_pay(raw: &str) -> String {
    raw.replace('$', "").replace(',', "").trim().to_string()
}

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_bare_us_number() {
        assert_eq!(
            normalize_phone("5551234567"),
            Some("+15551234567".to_string())
        );
        assert_eq!(
            normalize_phone("(555) 123-4567"),
            Some("+15551234567".to_string())
        );
    }

    #[test]
    fn test_normalize_phone_with_country_code() {
        assert_eq!(
            normalize_phone("+1 555 123 4567"),
            Some("+15551234567".to_string())
        );
        assert_eq!(
            normalize_phone("15551234567"),
            Some("+15551234567".to_string())
        );
        assert_eq!(
            normalize_phone("+44 20 7946 0958"),
            Some("+442079460958".to_string())
        );
    }

    #[test]
    fn test_normalize_phone_json_array() {
        assert_eq!(
            normalize_phone(r#"["5551234567", "5559876543"]"#),
            Some("+15551234567".to_string())
        );
        assert_eq!(normalize_phone("[]"), None);
    }

    #[test]
    fn test_normalize_phone_comma_list() {
        assert_eq!(
            normalize_phone("555-123-4567, 555-987-6543"),
            Some("+15551234567".to_string())
        );
    }

    #[test]
    fn test_normalize_phone_rejects_garbage() {
        assert_eq!(normalize_phone(""), None);
        assert_eq!(normalize_phone("n/a"), None);
        assert_eq!(normalize_phone("12345"), None);
    }

    #[test]
    fn test_normalize_pay() {
        assert_eq!(normalize_pay("$2,400"), "2400");
        assert_eq!(normalize_pay(" 1800 "), "1800");
        assert_eq!(normalize_pay("$1,200 - $1,500"), "1200 - 1500");
    }

    #[test]
    fn test_get_file_extension() {
        assert_eq!(get_file_extension("resume.pdf"), Some("pdf".to_string()));
        assert_eq!(get_file_extension("resume.PDF"), Some("pdf".to_string()));
        assert_eq!(get_file_extension("noext"), None);
    }
}
