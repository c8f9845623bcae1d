//! Language detection and normalization
//!
//! Detection is heuristic: romanized-Telugu keywords for pure-ASCII text,
//! Unicode block tests for Indic and East Asian scripts, then diacritic and
//! keyword checks for Latin-script European languages. Both functions are
//! total; unrecognized input falls back to the defaults.

/// Common romanized Telugu words, used both for detection and to decide when
/// an ASCII query still needs translation before embedding.
const TELUGU_TRANSLITERATIONS: [&str; 7] = [
    "ante",
    "emi",
    "emiti",
    "ela",
    "vundali",
    "bagunnara",
    "santosham",
];

/// Short codes the corpus pipeline accepts; everything else maps to "en".
const SUPPORTED_CODES: [&str; 23] = [
    "en", "hi", "ta", "te", "kn", "ml", "bn", "gu", "mr", "pa", "or", "as", "sa", "es", "fr",
    "de", "it", "pt", "ru", "ja", "ko", "zh", "ar",
];

fn has_block(text: &str, lo: u32, hi: u32) -> bool {
    text.chars().any(|c| {
        let cp = c as u32;
        cp >= lo && cp <= hi
    })
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn has_any_char(text: &str, set: &str) -> bool {
    text.chars().any(|c| set.contains(c))
}

/// True when the text reads like a romanized Telugu query.
#[must_use]
pub fn looks_transliterated(text: &str) -> bool {
    contains_any(&text.to_lowercase(), &TELUGU_TRANSLITERATIONS)
}

/// Classify raw input text into a language tag.
///
/// Deterministic and total: the same input always yields the same tag, and
/// text with no matching signal falls back to `en-IN`.
#[must_use]
pub fn detect_language(text: &str) -> &'static str {
    let lower = text.to_lowercase();

    // Romanized Telugu written in plain Latin letters
    let plain_ascii = text.chars().all(|c| {
        c.is_ascii_alphanumeric() || c.is_ascii_whitespace() || "?,!.:'\"-".contains(c)
    });
    if plain_ascii && !text.is_empty() && contains_any(&lower, &TELUGU_TRANSLITERATIONS) {
        return "te-IN";
    }

    // Script blocks
    if has_block(text, 0x0900, 0x097F) {
        return "hi-IN"; // Devanagari
    }
    if has_block(text, 0x0B80, 0x0BFF) {
        return "ta-IN"; // Tamil
    }
    if has_block(text, 0x0C00, 0x0C7F) {
        return "te-IN"; // Telugu
    }
    if has_block(text, 0x0C80, 0x0CFF) {
        return "kn-IN"; // Kannada
    }
    if has_block(text, 0x0D00, 0x0D7F) {
        return "ml-IN"; // Malayalam
    }
    if has_block(text, 0x0980, 0x09FF) {
        return "bn-IN"; // Bengali
    }
    if has_block(text, 0x0A80, 0x0AFF) {
        return "gu-IN"; // Gujarati
    }
    if has_block(text, 0x0A00, 0x0A7F) {
        return "pa-IN"; // Gurmukhi
    }
    if has_block(text, 0x0B00, 0x0B7F) {
        return "or-IN"; // Odia
    }
    if has_block(text, 0x0600, 0x06FF) {
        return "ar";
    }
    if has_block(text, 0x4E00, 0x9FFF) {
        return "zh";
    }
    if has_block(text, 0x3040, 0x309F) || has_block(text, 0x30A0, 0x30FF) {
        return "ja";
    }
    if has_block(text, 0xAC00, 0xD7AF) {
        return "ko";
    }

    // Latin-script heuristics
    if has_any_char(&lower, "áéíóúñü") || contains_any(&lower, &["hola", "gracias", "por favor"])
    {
        return "es";
    }
    if has_any_char(&lower, "àâäéèêëïîôöùûüÿç") || contains_any(&lower, &["bonjour", "merci"]) {
        return "fr";
    }
    if has_any_char(&lower, "äöüß") || contains_any(&lower, &["hallo", "danke"]) {
        return "de";
    }
    if has_any_char(&lower, "àèéìíîòóù") || contains_any(&lower, &["ciao", "grazie"]) {
        return "it";
    }
    if has_any_char(&lower, "ãâáàçéêíóôõú") || contains_any(&lower, &["olá", "obrigado"]) {
        return "pt";
    }
    if has_block(text, 0x0400, 0x04FF) {
        return "ru";
    }

    "en-IN"
}

/// Canonicalize a language tag to a supported short code.
///
/// Strips the region subtag ("en-IN" -> "en"), lowercases, and verifies
/// membership in the allow-list; anything else maps to "en".
#[must_use]
pub fn normalize_lang_code(code: &str) -> String {
    let base = code
        .to_lowercase()
        .split('-')
        .next()
        .unwrap_or_default()
        .to_string();
    if SUPPORTED_CODES.contains(&base.as_str()) {
        base
    } else {
        "en".to_string()
    }
}

/// English name for a supported short code, used in generation prompts.
#[must_use]
pub fn language_name(short_code: &str) -> &'static str {
    match short_code {
        "hi" => "Hindi",
        "ta" => "Tamil",
        "te" => "Telugu",
        "kn" => "Kannada",
        "ml" => "Malayalam",
        "bn" => "Bengali",
        "gu" => "Gujarati",
        "mr" => "Marathi",
        "pa" => "Punjabi",
        "or" => "Odia",
        "as" => "Assamese",
        "sa" => "Sanskrit",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "ar" => "Arabic",
        _ => "English",
    }
}
