//! Playlist files
//!
//! A TOML list of `[[track]]` tables describing catalog metadata plus how the
//! simulated media behaves:
//!
//! ```toml
//! [[track]]
//! id = "t1"
//! title = "Intro"
//! artist = "Biito"
//! length_secs = 4.5      # real media length
//! catalog_secs = 5       # nominal duration shown before media reports one
//! fail = false           # simulate a broken stream
//! ```

use crate::backend::{SimBackend, SimOptions, SimSource};
use anyhow::{bail, Context};
use biito_playback::Track;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// One playlist entry
#[derive(Debug, Clone, Deserialize)]
pub struct LibraryEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,

    /// Media URI, `sim://<id>` when omitted
    #[serde(default)]
    pub uri: Option<String>,

    /// Real media length in seconds
    pub length_secs: f64,

    /// Nominal catalog duration in seconds
    #[serde(default)]
    pub catalog_secs: Option<u64>,

    /// Every load of this entry fails
    #[serde(default)]
    pub fail: bool,
}

impl LibraryEntry {
    pub fn uri(&self) -> String {
        self.uri
            .clone()
            .unwrap_or_else(|| format!("sim://{}", self.id))
    }

    pub fn track(&self) -> Track {
        let mut track = Track::new(
            self.id.as_str(),
            self.title.as_str(),
            self.artist.as_str(),
            self.album.as_str(),
            self.uri(),
        );
        track.duration = self.catalog_secs.map(Duration::from_secs);
        track
    }
}

/// Parsed playlist file
#[derive(Debug, Clone, Deserialize)]
pub struct Library {
    #[serde(default, rename = "track")]
    entries: Vec<LibraryEntry>,
}

impl Library {
    /// Read and validate a playlist file
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read playlist {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid playlist {}", path.display()))
    }

    /// Parse and validate playlist TOML
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let library: Self = toml::from_str(text)?;

        if library.entries.is_empty() {
            bail!("playlist has no tracks");
        }
        for entry in &library.entries {
            if !entry.length_secs.is_finite() || entry.length_secs <= 0.0 {
                bail!(
                    "track '{}' has invalid length_secs {}",
                    entry.id,
                    entry.length_secs
                );
            }
        }

        Ok(library)
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    /// Catalog tracks in playlist order
    pub fn tracks(&self) -> Vec<Track> {
        self.entries.iter().map(LibraryEntry::track).collect()
    }

    /// Backend serving every entry of this playlist
    pub fn backend(&self, options: SimOptions) -> SimBackend {
        let mut backend = SimBackend::new(options);
        for entry in &self.entries {
            backend.add_source(
                entry.uri(),
                SimSource {
                    length: Duration::from_secs_f64(entry.length_secs),
                    fail: entry.fail,
                },
            );
        }
        backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries_with_defaults() {
        let library = Library::parse(
            r#"
            [[track]]
            id = "t1"
            title = "Intro"
            length_secs = 4.5

            [[track]]
            id = "t2"
            title = "Outro"
            artist = "Biito"
            uri = "https://cdn.example/t2.mp3"
            length_secs = 3
            catalog_secs = 3
            "#,
        )
        .unwrap();

        let tracks = library.tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].uri, "sim://t1");
        assert_eq!(tracks[0].duration, None);
        assert_eq!(tracks[1].uri, "https://cdn.example/t2.mp3");
        assert_eq!(tracks[1].duration, Some(Duration::from_secs(3)));
        assert!(!library.entries()[0].fail);
    }

    #[test]
    fn rejects_empty_playlist() {
        assert!(Library::parse("").is_err());
    }

    #[test]
    fn rejects_non_positive_length() {
        let err = Library::parse(
            r#"
            [[track]]
            id = "t1"
            title = "Silence"
            length_secs = 0
            "#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("length_secs"));
    }
}
