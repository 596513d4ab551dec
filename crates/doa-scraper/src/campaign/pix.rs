//! PIX key detection.
//!
//! Keys are only accepted shortly after a "pix" or "chave" mention, so
//! unrelated numbers elsewhere on the page are ignored.

use std::sync::LazyLock;

use regex::Regex;

/// Characters searched after each anchor.
const WINDOW: usize = 160;

static COPY_BUTTON_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:copiar|copiado|copied|copy)\b").expect("valid regex")
});
static ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:pix|chave)\b").expect("valid regex"));

/// Key formats in priority order: random key, email, CNPJ, CPF, phone.
static KEY_PATTERNS: LazyLock<[Regex; 5]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)\b[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\b")
            .expect("valid regex"),
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex"),
        Regex::new(r"\b\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2}\b").expect("valid regex"),
        Regex::new(r"\b\d{3}\.?\d{3}\.?\d{3}-?\d{2}\b").expect("valid regex"),
        Regex::new(r"(?:\+?55\s?)?\(?\b\d{2}\)?\s?9\d{4}[-\s]?\d{4}\b").expect("valid regex"),
    ]
});

/// First PIX key found near a "pix"/"chave" mention in `text`.
pub(crate) fn find_pix_key(text: &str) -> Option<String> {
    let cleaned = COPY_BUTTON_NOISE.replace_all(text, " ");

    ANCHOR.find_iter(&cleaned).find_map(|anchor| {
        let window: String = cleaned[anchor.end()..].chars().take(WINDOW).collect();
        KEY_PATTERNS
            .iter()
            .find_map(|re| re.find(&window))
            .map(|m| m.as_str().trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_key_after_label() {
        assert_eq!(
            find_pix_key("Chave PIX: 123e4567-e89b-12d3-a456-426614174000 Copiar").as_deref(),
            Some("123e4567-e89b-12d3-a456-426614174000")
        );
    }

    #[test]
    fn email_key_with_copy_button_noise() {
        assert_eq!(
            find_pix_key("Doe via Pix copiar doacoes@exemplo.org.br copiado").as_deref(),
            Some("doacoes@exemplo.org.br")
        );
    }

    #[test]
    fn cnpj_before_cpf() {
        assert_eq!(
            find_pix_key("chave pix 12.345.678/0001-90").as_deref(),
            Some("12.345.678/0001-90")
        );
        assert_eq!(
            find_pix_key("chave pix 123.456.789-09").as_deref(),
            Some("123.456.789-09")
        );
    }

    #[test]
    fn phone_key() {
        assert_eq!(
            find_pix_key("PIX (11) 98765-4321").as_deref(),
            Some("(11) 98765-4321")
        );
    }

    #[test]
    fn numbers_far_from_anchor_are_ignored() {
        assert!(find_pix_key("Ligue 123.456.789-09 para saber mais").is_none());
        let far = format!("pix {} 123.456.789-09", "x".repeat(WINDOW));
        assert!(find_pix_key(&far).is_none());
    }
}
