use common::error::{AppError, Res};
use url::Url;

/// Accepts absolute http(s) URLs only and returns the trimmed input.
pub fn validate_url(raw: &str) -> Res<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("URL is required".to_string()));
    }

    let invalid = || AppError::BadRequest("Invalid URL. Must start with http:// or https://".to_string());
    let parsed = Url::parse(trimmed).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(invalid());
    }

    Ok(trimmed.to_string())
}

/// `local@domain.tld` shape check, returns the lower-cased address.
pub fn normalize_email(raw: &str) -> Res<String> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }
    if !is_email_shaped(email) {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    Ok(email.to_lowercase())
}

fn is_email_shaped(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_and_https_urls_pass() {
        assert_eq!(validate_url(" https://example.com/a?b=c ").unwrap(), "https://example.com/a?b=c");
        assert!(validate_url("http://localhost:3000").is_ok());
    }

    #[test]
    fn other_schemes_and_garbage_fail() {
        for raw in ["", "example.com", "ftp://example.com", "javascript:alert(1)", "mailto:a@b.co"] {
            assert!(validate_url(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn emails_are_lower_cased() {
        assert_eq!(normalize_email(" Ada@Example.COM ").unwrap(), "ada@example.com");
    }

    #[test]
    fn malformed_emails_fail() {
        for raw in ["", "ada", "ada@", "@example.com", "ada@example", "ada@@example.com", "a da@example.com", "ada@example."] {
            assert!(normalize_email(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn subdomains_and_plus_tags_pass() {
        assert!(normalize_email("ada+news@mail.example.co.uk").is_ok());
    }
}
