use reqwest::Url;

use crate::error::IgtokenError;

/// Pull the authorization `code` out of the URL the browser was redirected to.
///
/// A provider-reported `error` (for example when the user denies access)
/// becomes an `OAuthError`; anything else unusable is a `Validation` error.
pub fn extract_code(redirect_url: &str) -> Result<String, IgtokenError> {
    let url = Url::parse(redirect_url.trim())
        .map_err(|e| IgtokenError::validation("redirect URL", format!("not a valid URL: {e}")))?;

    let mut code = None;
    let mut error = None;
    let mut description = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" if !value.is_empty() => code = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" | "error_reason" if description.is_none() => {
                description = Some(value.into_owned())
            }
            _ => {}
        }
    }

    if let Some(code) = code {
        return Ok(code);
    }
    if let Some(error) = error {
        return Err(IgtokenError::OAuthError(match description {
            Some(d) => format!("{error}: {d}"),
            None => error,
        }));
    }
    Err(IgtokenError::validation(
        "redirect URL",
        "URL must contain an authorization code parameter",
    ))
}
