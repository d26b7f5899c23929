use std::sync::LazyLock;

use regex::Regex;

use crate::text;

static POSTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s¤"'<>]+?\.jpg"#).unwrap());

pub fn extract(raw: &str) -> Option<String> {
    text::first_match(&POSTER_RE, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_jpg_url() {
        let raw = "data:image/gif;base64,R0lGOD¤https://fr.web.img6.acsta.net/c_310_420/pictures/24/05/13/poster.jpg¤https://x/y.jpg";
        assert_eq!(
            extract(raw).as_deref(),
            Some("https://fr.web.img6.acsta.net/c_310_420/pictures/24/05/13/poster.jpg")
        );
    }

    #[test]
    fn no_jpg_is_none() {
        assert_eq!(extract("https://example.com/poster.png"), None);
        assert_eq!(extract(""), None);
    }
}
