//! Catalog of Deepgram STT models and Aura TTS voices offered to users

use serde::Serialize;

/// One selectable model or voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

const fn model(id: &'static str, name: &'static str, description: &'static str) -> ModelInfo {
    ModelInfo {
        id,
        name,
        description,
    }
}

/// Deepgram transcription models
pub const STT_MODELS: &[ModelInfo] = &[
    model("nova-3", "Nova 3", "Latest, most accurate"),
    model("nova-2", "Nova 2", "Fast and accurate"),
    model("nova", "Nova", "Original Nova"),
    model("enhanced", "Enhanced", "High accuracy"),
    model("base", "Base", "Fast, lower accuracy"),
];

/// Deepgram Aura voices
pub const TTS_MODELS: &[ModelInfo] = &[
    model("aura-2-asteria-en", "Asteria (Aura 2)", "Female, American"),
    model("aura-asteria-en", "Asteria", "Female, American"),
    model("aura-luna-en", "Luna", "Female, American"),
    model("aura-stella-en", "Stella", "Female, American"),
    model("aura-athena-en", "Athena", "Female, British"),
    model("aura-hera-en", "Hera", "Female, American"),
    model("aura-orion-en", "Orion", "Male, American"),
    model("aura-arcas-en", "Arcas", "Male, American"),
    model("aura-perseus-en", "Perseus", "Male, American"),
    model("aura-angus-en", "Angus", "Male, Irish"),
    model("aura-orpheus-en", "Orpheus", "Male, American"),
    model("aura-helios-en", "Helios", "Male, British"),
    model("aura-zeus-en", "Zeus", "Male, American"),
];

/// Whether `id` is a known transcription model
#[must_use]
pub fn is_stt_model(id: &str) -> bool {
    STT_MODELS.iter().any(|m| m.id == id)
}

/// Whether `id` is a known TTS voice
#[must_use]
pub fn is_tts_model(id: &str) -> bool {
    TTS_MODELS.iter().any(|m| m.id == id)
}

/// One catalog line, starred when `id` is the selected model
#[must_use]
pub fn catalog_line(model: &ModelInfo, selected: &str) -> String {
    let marker = if model.id == selected { '*' } else { ' ' };
    format!(
        " {marker} {:<20} {:<18} {}",
        model.id, model.name, model.description
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_STT_MODEL, DEFAULT_TTS_MODEL};

    #[test]
    fn defaults_are_in_catalog() {
        assert!(is_stt_model(DEFAULT_STT_MODEL));
        assert!(is_tts_model(DEFAULT_TTS_MODEL));
    }

    #[test]
    fn unknown_ids_rejected() {
        assert!(!is_stt_model("whisper-1"));
        assert!(!is_tts_model("nova-3"));
    }

    #[test]
    fn catalog_line_marks_selected_model() {
        let starred: Vec<_> = TTS_MODELS
            .iter()
            .filter(|m| catalog_line(m, "aura-luna-en").starts_with(" *"))
            .map(|m| m.id)
            .collect();
        assert_eq!(starred, ["aura-luna-en"]);

        let line = catalog_line(&STT_MODELS[0], "nova-2");
        assert!(line.starts_with("   nova-3"));
    }
}
