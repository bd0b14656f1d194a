//! Exclusion filter: skips models that are out of scope before any
//! probe is sent.
//!
//! Non-text modalities and auxiliary model classes would only burn
//! quota on a chat probe that can never succeed. Matching is plain
//! substring containment on the lower-cased id.

use crate::adapters::Model;

/// Built-in denylist. Covers image, speech, translation, OCR, rerank,
/// embedding and realtime variants.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "image",
    "tts",
    "asr",
    "mt",
    "ocr",
    "rerank",
    "embedding",
    "realtime",
    "livetranslate",
];

/// Whether `id` matches the built-in denylist or any caller-supplied
/// substring. Empty caller entries are ignored.
pub fn should_skip(id: &str, extra: &[String]) -> bool {
    let lower = id.to_lowercase();

    if DEFAULT_EXCLUDES.iter().any(|p| lower.contains(p)) {
        return true;
    }

    extra
        .iter()
        .filter(|p| !p.is_empty())
        .any(|p| lower.contains(&p.to_lowercase()))
}

/// Keep only the models that survive `should_skip`, in listing order.
pub fn filter_models(models: Vec<Model>, extra: &[String]) -> Vec<Model> {
    models
        .into_iter()
        .filter(|m| !should_skip(&m.id, extra))
        .collect()
}

/// Split a comma-separated `--exclude` value into trimmed, non-empty parts.
pub fn split_excludes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_excludes() {
        assert!(should_skip("qwen-image-gen", &[]));
        assert!(should_skip("CosyVoice-TTS-v1", &[]));
        assert!(should_skip("text-embedding-v3", &[]));
        assert!(should_skip("gte-rerank", &[]));
        assert!(!should_skip("qwen-plus", &[]));
        assert!(!should_skip("deepseek-chat", &[]));
    }

    #[test]
    fn test_extra_excludes_are_case_insensitive() {
        let extra = vec!["Chat".to_string()];
        assert!(should_skip("deepseek-chat", &extra));
        assert!(should_skip("CHAT-model", &extra));
        assert!(!should_skip("deepseek-reasoner", &extra));
    }

    #[test]
    fn test_empty_extra_entry_ignored() {
        let extra = vec![String::new()];
        assert!(!should_skip("qwen-plus", &extra));
    }

    #[test]
    fn test_filter_models_drops_image_variant() {
        let listing = vec![
            Model::new("qwen-plus"),
            Model::new("qwen-image-gen"),
            Model::new("qwen-turbo"),
        ];
        let kept: Vec<String> = filter_models(listing, &[]).into_iter().map(|m| m.id).collect();
        assert_eq!(kept, vec!["qwen-plus".to_string(), "qwen-turbo".to_string()]);
    }

    #[test]
    fn test_filtered_models_never_contain_excluded_substring() {
        let extra = vec!["preview".to_string(), "LATEST".to_string()];
        let listing: Vec<Model> = [
            "gpt-4o", "gpt-4o-preview", "whisper-asr", "o1-latest", "qwen-max", "ocr-lite",
        ]
        .iter()
        .map(|id| Model::new(*id))
        .collect();

        let kept = filter_models(listing.clone(), &extra);
        for m in &kept {
            let lower = m.id.to_lowercase();
            assert!(DEFAULT_EXCLUDES.iter().all(|p| !lower.contains(p)));
            assert!(extra.iter().all(|p| !lower.contains(&p.to_lowercase())));
        }
        let expected = listing.iter().filter(|m| !should_skip(&m.id, &extra)).count();
        assert_eq!(kept.len(), expected);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_split_excludes() {
        assert_eq!(split_excludes(""), Vec::<String>::new());
        assert_eq!(split_excludes(" vl , ,audio"), vec!["vl".to_string(), "audio".to_string()]);
    }
}
