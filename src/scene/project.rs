use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::scene::model::AnimationSequence;

/// JSON project documents.
///
/// Everything that comes in from outside is validated before it is handed back, so a loaded
/// sequence always satisfies [`AnimationSequence::validate`].
impl AnimationSequence {
    /// Parse and validate a project from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FlipbookResult<Self> {
        let seq: Self = serde_json::from_reader(r)
            .map_err(|e| FlipbookError::serde(format!("parse project JSON: {e}")))?;
        seq.validate()?;
        Ok(seq)
    }

    /// Parse and validate a project from a JSON string.
    pub fn from_json(s: &str) -> FlipbookResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Load a project file from disk.
    pub fn load(path: impl AsRef<Path>) -> FlipbookResult<Self> {
        use anyhow::Context as _;

        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open project file '{}'", path.display()))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> FlipbookResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FlipbookError::serde(format!("serialize project JSON: {e}")))
    }

    /// Write the pretty-printed JSON document to `w`.
    pub fn to_writer<W: Write>(&self, w: W) -> FlipbookResult<()> {
        serde_json::to_writer_pretty(w, self)
            .map_err(|e| FlipbookError::serde(format!("serialize project JSON: {e}")))
    }

    /// Write the project to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> FlipbookResult<()> {
        use anyhow::Context as _;

        let path = path.as_ref();
        let f = File::create(path)
            .with_context(|| format!("create project file '{}'", path.display()))?;
        let mut w = BufWriter::new(f);
        self.to_writer(&mut w)?;
        w.flush()
            .with_context(|| format!("flush project file '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/project.rs"]
mod tests;
