use reqwest::Url;

use crate::error::IgtokenError;

/// Result of checking a redirect URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectUriCheck {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl RedirectUriCheck {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Redirect URIs that work with a locally registered Facebook app.
pub fn recommended_redirect_uris() -> Vec<&'static str> {
    vec![
        "https://localhost:3000/auth/callback",
        "http://localhost:3000/auth/callback",
        "https://127.0.0.1:3000/auth/callback",
        "http://127.0.0.1:3000/auth/callback",
    ]
}

pub fn check_redirect_uri(uri: &str) -> RedirectUriCheck {
    let mut check = RedirectUriCheck::default();
    let url = match Url::parse(uri) {
        Ok(url) => url,
        Err(e) => {
            check.errors.push(format!("Not an absolute URL: {e}"));
            return check;
        }
    };

    match url.scheme() {
        "https" => {}
        "http" => {
            let host = url.host_str().unwrap_or_default();
            if host != "localhost" && host != "127.0.0.1" {
                check
                    .warnings
                    .push("HTTPS is recommended for non-local redirect URIs".into());
            }
        }
        scheme => check
            .errors
            .push(format!("Redirect URI must use http or https, not '{scheme}'")),
    }

    if url.host_str().map_or(true, str::is_empty) {
        check.errors.push("Redirect URI has no host".into());
    }

    if url.path() == "/" {
        check
            .warnings
            .push("Consider a specific callback path such as /auth/callback".into());
    }

    check
}

pub fn ensure_redirect_uri(uri: &str) -> Result<(), IgtokenError> {
    let check = check_redirect_uri(uri);
    match check.errors.into_iter().next() {
        Some(first) => Err(IgtokenError::validation("redirect URI", first)),
        None => Ok(()),
    }
}
