//! Text cleanup before tokenization.
//!
//! Search API snippets arrive with `<b>` highlight tags, HTML character
//! references and punctuation. Both normalizers strip those and are
//! idempotent: running them on their own output changes nothing.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(?:[A-Za-z]+|#[0-9]+|#[xX][0-9A-Fa-f]+);").expect("valid entity regex"));
// `\w` is Unicode-aware: Hangul, Latin letters, digits and `_` all survive.
static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid word regex"));
static NON_HANGUL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^가-힣\s]").expect("valid hangul regex"));

fn strip_markup(raw: &str) -> String {
    let without_tags = TAG_RE.replace_all(raw, "");
    ENTITY_RE.replace_all(&without_tags, "").into_owned()
}

/// Remove markup and every character that is neither a word character nor whitespace.
///
/// # Examples
///
/// ```
/// use fandom_lens::text::normalize;
/// assert_eq!(normalize("<b>케이팝</b> 데몬 헌터스!"), "케이팝 데몬 헌터스");
/// ```
pub fn normalize(raw: &str) -> String {
    let text = strip_markup(raw);
    NON_WORD_RE.replace_all(&text, "").into_owned()
}

/// Remove markup and keep only Hangul syllables and whitespace.
///
/// Used for co-occurrence input, where Latin fragments and digits in
/// snippets are mostly noise.
pub fn normalize_hangul(raw: &str) -> String {
    let text = strip_markup(raw);
    NON_HANGUL_RE.replace_all(&text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags_and_punctuation() {
        assert_eq!(
            normalize("<b>케이팝 데몬 헌터스</b>, 빌보드 1위!"),
            "케이팝 데몬 헌터스 빌보드 1위"
        );
    }

    #[test]
    fn test_strips_entities() {
        assert_eq!(normalize("&quot;골든&quot; 열풍 &amp; 인기"), "골든 열풍  인기");
        assert_eq!(normalize("it&#39;s"), "its");
    }

    #[test]
    fn test_keeps_word_characters() {
        assert_eq!(normalize("K_pop 2025 케데헌"), "K_pop 2025 케데헌");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize_hangul(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "<b>케이팝</b> 데몬 헌터스 &quot;골든&quot;",
            "a<b<c>>d!!",
            "이미 정제된 문장",
            "100% 흥행... (넷플릭스)",
        ];
        for raw in samples {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
            let once = normalize_hangul(raw);
            assert_eq!(normalize_hangul(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_hangul_only() {
        assert_eq!(normalize_hangul("<b>K-pop</b> 케이팝 2025년"), " 케이팝 년");
    }
}
