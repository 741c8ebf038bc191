use std::path::Path;

use serde::{Deserialize, Serialize};

/// One row of the annotation table: an audio clip and its captions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    /// Audio file name, extension included (e.g. `rain.wav`)
    pub audio_file_name: String,
    /// Raw captions in caption-column order
    pub captions: Vec<String>,
}

impl AnnotationEntry {
    pub fn new(audio_file_name: impl Into<String>, captions: Vec<String>) -> Self {
        Self {
            audio_file_name: audio_file_name.into(),
            captions,
        }
    }

    /// Audio file name without its extension
    pub fn clip_stem(&self) -> String {
        file_stem(&self.audio_file_name)
    }

    pub fn caption(&self, index: usize) -> Option<&str> {
        self.captions.get(index).map(String::as_str)
    }
}

/// All captions of a split, entry order first, then caption order
pub fn collect_captions(entries: &[AnnotationEntry]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|e| e.captions.iter().cloned())
        .collect()
}

pub(crate) fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_stem() {
        let entry = AnnotationEntry::new("Rain on roof.wav", vec![]);
        assert_eq!(entry.clip_stem(), "Rain on roof");
    }

    #[test]
    fn test_collect_captions_order() {
        let entries = vec![
            AnnotationEntry::new("a.wav", vec!["a1".into(), "a2".into()]),
            AnnotationEntry::new("b.wav", vec!["b1".into(), "b2".into()]),
        ];
        assert_eq!(collect_captions(&entries), vec!["a1", "a2", "b1", "b2"]);
    }
}
