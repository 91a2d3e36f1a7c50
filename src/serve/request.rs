//! Mapping request URLs to archive paths.

/// Extract the archive path from a request.
///
/// Accepts either a bare path (`/css/site.css`) or a URL using `scheme`
/// (`app://localhost/css/site.css`). Query strings and fragments are dropped
/// and percent-escapes decoded. Returns `None` for URLs with another scheme
/// or paths that do not decode to UTF-8.
pub fn request_path(scheme: &str, request: &str) -> Option<String> {
    let path = match request.split_once("://") {
        Some((s, rest)) => {
            if !s.eq_ignore_ascii_case(scheme) {
                return None;
            }
            // Skip the authority component.
            match rest.find('/') {
                Some(i) => &rest[i..],
                None => "",
            }
        }
        None => request,
    };

    let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
    percent_decode(&path[..end])
}

fn percent_decode(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(out).ok()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_paths() {
        assert_eq!(request_path("app", "/index.html").as_deref(), Some("/index.html"));
        assert_eq!(request_path("app", "img/logo.png").as_deref(), Some("img/logo.png"));
    }

    #[test]
    fn test_scheme_urls() {
        assert_eq!(
            request_path("app", "app://localhost/js/app.js?v=3#top").as_deref(),
            Some("/js/app.js")
        );
        assert_eq!(request_path("app", "APP://localhost").as_deref(), Some(""));
        assert_eq!(request_path("app", "https://example.com/index.html"), None);
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(
            request_path("app", "/my%20file%2Etxt").as_deref(),
            Some("/my file.txt")
        );
        assert_eq!(request_path("app", "/caf%C3%A9.css").as_deref(), Some("/café.css"));
        assert_eq!(request_path("app", "/100%").as_deref(), Some("/100%"));
        assert_eq!(request_path("app", "/%zz").as_deref(), Some("/%zz"));
        assert_eq!(request_path("app", "/%ff"), None);
    }
}
