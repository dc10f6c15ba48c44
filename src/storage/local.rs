//! Local filesystem storage implementation.
//!
//! The table is kept as one pretty-printed JSON object so it can be read and
//! diffed by hand:
//!
//! ```text
//! {
//!   "101234": {
//!     "first_seen": 1760000000,
//!     "last_updated": 1760086400,
//!     "product_name": "Sky Garden",
//!     "original_price": 19.99,
//!     "ever_removed": false
//!   }
//! }
//! ```
//!
//! Floats are always written with exactly two fractional digits. Prices are
//! the only floats in the table.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::SeenGames;
use crate::storage::SeenStore;

/// Pretty JSON formatter that writes every float as `{:.2}`.
struct CentsFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl CentsFormatter<'_> {
    fn new() -> Self {
        Self {
            inner: PrettyFormatter::with_indent(b"    "),
        }
    }
}

impl Formatter for CentsFormatter<'_> {
    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        write!(writer, "{value:.2}")
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }
}

/// Serialize the table as pretty JSON with two-digit floats.
pub fn encode_table(games: &SeenGames) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, CentsFormatter::new());
    games.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Seen-games table stored in a local JSON file.
#[derive(Debug, Clone)]
pub struct LocalSeenStore {
    path: PathBuf,
}

impl LocalSeenStore {
    /// Create a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persistence_error(&self, message: impl std::fmt::Display) -> AppError {
        AppError::persistence(self.path.display().to_string(), message)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.persistence_error(format!("cannot create directory: {e}")))?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> io::Result<()> {
        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await
    }

    /// Read bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.persistence_error(e)),
        }
    }
}

#[async_trait]
impl SeenStore for LocalSeenStore {
    async fn load(&self) -> Result<SeenGames> {
        let Some(bytes) = self.read_bytes().await? else {
            log::debug!("No seen-games file at {}", self.path.display());
            return Ok(SeenGames::new());
        };

        // An empty table may have been written as `[]` by older tooling.
        let trimmed = String::from_utf8_lossy(&bytes);
        let trimmed = trimmed.trim();
        if trimmed.is_empty() || trimmed == "[]" {
            return Ok(SeenGames::new());
        }

        serde_json::from_str(trimmed)
            .map_err(|e| self.persistence_error(format!("corrupt seen-games table: {e}")))
    }

    async fn save(&self, games: &SeenGames) -> Result<()> {
        let bytes = encode_table(games)?;
        self.ensure_dir().await?;
        self.write_bytes(&bytes)
            .await
            .map_err(|e| self.persistence_error(e))?;

        log::debug!(
            "Saved {} seen games to {}",
            games.len(),
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
