//! Binary-content request options and generator payloads

use bytes::Bytes;

/// Marks a generation request as producing a binary artifact
///
/// Presence of these options routes the orchestrator through the blob tier;
/// absence means the generated value is persisted inline.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaOptions {
    /// Expected MIME type of the artifact
    pub mime_type: String,
    /// File extension used when deriving the blob path
    pub extension: Option<String>,
}

impl MediaOptions {
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            extension: None,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Extension for the blob path, derived from the MIME type when not set
    pub fn extension_or_guess(&self) -> String {
        if let Some(ext) = &self.extension {
            return ext.clone();
        }

        mime_guess::get_mime_extensions_str(&self.mime_type)
            .and_then(|exts| exts.first())
            .map(|ext| (*ext).to_string())
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Binary-capable generator output
///
/// Generators for media requests return one of these; the orchestrator
/// materializes it into bytes before handing it to the blob tier.
#[derive(Debug, Clone)]
pub enum MediaPayload {
    /// Raw bytes, ready to store
    Bytes(Bytes),
    /// Base64-encoded bytes (typical for TTS provider responses)
    Base64(String),
    /// Remote URL to fetch the artifact from
    RemoteUrl(String),
}

impl MediaPayload {
    /// Approximate size hint for logging; `None` when unknown before fetch
    pub fn size_hint(&self) -> Option<usize> {
        match self {
            Self::Bytes(data) => Some(data.len()),
            Self::Base64(encoded) => Some(encoded.len() / 4 * 3),
            Self::RemoteUrl(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_extension_wins() {
        let options = MediaOptions::new("audio/mpeg").with_extension("mp3");
        assert_eq!(options.extension_or_guess(), "mp3");
    }

    #[test]
    fn test_extension_guessed_from_mime() {
        let options = MediaOptions::new("image/png");
        assert_eq!(options.extension_or_guess(), "png");
    }

    #[test]
    fn test_unknown_mime_falls_back_to_bin() {
        let options = MediaOptions::new("application/x-vendor-unknown");
        assert_eq!(options.extension_or_guess(), "bin");
    }

    #[test]
    fn test_size_hint() {
        assert_eq!(MediaPayload::Bytes(Bytes::from_static(b"abcd")).size_hint(), Some(4));
        assert_eq!(MediaPayload::RemoteUrl("https://x".to_string()).size_hint(), None);
    }
}
