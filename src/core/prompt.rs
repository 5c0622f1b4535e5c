//! Prompt construction for translation and dictionary lookups

use crate::core::models::Mode;

/// Sentinel language code for automatic detection / direction
pub const AUTO: &str = "auto";

/// Display names used inside prompts
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("zh-CN", "简体中文"),
    ("zh-TW", "繁體中文"),
    ("en", "English"),
    ("ja", "日本語"),
    ("ko", "한국어"),
    ("es", "Español"),
    ("fr", "Français"),
    ("de", "Deutsch"),
    ("ru", "Русский"),
    (AUTO, "自动检测"),
];

/// Human-readable name for a language code, or the code itself when unknown
pub fn language_name(code: &str) -> &str {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// All known language codes with their display names
pub fn supported_languages() -> &'static [(&'static str, &'static str)] {
    LANGUAGE_NAMES
}

/// Build the single user message sent to the model.
///
/// Selection order: dictionary mode, then automatic target direction, then
/// automatic source detection, then an explicit language pair. The text is
/// appended verbatim.
pub fn build_prompt(text: &str, source_lang: &str, target_lang: &str, mode: Mode) -> String {
    if mode == Mode::Dictionary {
        return format!(
            "Please provide a dictionary-style explanation in Chinese (简体中文) for the following word/phrase:

Format your response as follows:
1. 【词性】(Part of Speech) - e.g., n. v. adj. adv. etc.
2. 【发音】(Pronunciation) - phonetic symbols if applicable
3. 【释义】(Meanings) - list all common meanings, numbered
4. 【例句】(Example Sentences) - provide 2-3 bilingual examples
5. 【搭配】(Collocations) - common phrases using this word (if applicable)
6. 【同义词】(Synonyms) - similar words (if applicable)

Word/Phrase:
{text}"
        );
    }

    if target_lang == AUTO {
        return format!(
            "Please translate the following text intelligently:

Rules:
1. Detect the source language automatically
2. If source is Chinese (简体中文/繁體中文) → translate to English
3. If source is English → translate to 简体中文
4. If source is other languages → translate to 简体中文
5. Only output the translated text, no explanations
6. Preserve formatting (line breaks, punctuation)

Text to translate:
{text}"
        );
    }

    let direction = if source_lang == AUTO {
        format!("to {}", language_name(target_lang))
    } else {
        format!(
            "from {} to {}",
            language_name(source_lang),
            language_name(target_lang)
        )
    };

    format!(
        "Please translate the following text {direction}.

Requirements:
1. Only output the translated text, no explanations or notes
2. Preserve the original formatting (line breaks, punctuation)
3. Keep technical terms and proper nouns when appropriate

Text to translate:
{text}"
    )
}
