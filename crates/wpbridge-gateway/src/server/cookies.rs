//! Browser cookies owned by the bridge feature

use axum::http::{header, HeaderMap, HeaderValue};
use url::form_urlencoded::byte_serialize;
use wpbridge_core::branding::{FEATURE_COOKIES, SITE_COOKIE};

/// `Set-Cookie` for the non-secret site cookie shown by the UI.
pub fn site_cookie(base_url: &str) -> Option<HeaderValue> {
    let value: String = byte_serialize(base_url.as_bytes()).collect();
    HeaderValue::from_str(&format!("{}={}; Path=/; SameSite=Lax", SITE_COOKIE, value)).ok()
}

/// `Set-Cookie` header clearing one cookie.
pub fn clearing_cookie(name: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!("{}=; Max-Age=0; Path=/", name)).ok()
}

/// Headers clearing every feature cookie.
pub fn clear_feature_cookies() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for value in FEATURE_COOKIES.iter().filter_map(|name| clearing_cookie(name)) {
        headers.append(header::SET_COOKIE, value);
    }
    headers
}
