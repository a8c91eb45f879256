use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local scratch directory holding one copy of each upload.
///
/// The directory must already exist; it is never created here.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingStatus {
    Ready,
    Missing,
    NotADirectory,
}

impl StagingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StagingStatus::Ready => "ready",
            StagingStatus::Missing => "missing",
            StagingStatus::NotADirectory => "not_a_directory",
        }
    }
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes the full payload under `name`, truncating any previous file.
    /// Returns the path that was written.
    pub async fn write(&self, name: &str, data: &[u8]) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, data).await?;
        Ok(path)
    }

    /// Re-opens a staged file by its basename and reads it fully
    pub async fn read_back(&self, written: &Path) -> io::Result<(String, Vec<u8>)> {
        let basename = written
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("staged path has no file name: {}", written.display()),
                )
            })?
            .to_string();

        let data = fs::read(self.root.join(&basename)).await?;
        Ok((basename, data))
    }

    pub async fn probe(&self) -> StagingStatus {
        match fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => StagingStatus::Ready,
            Ok(_) => StagingStatus::NotADirectory,
            Err(_) => StagingStatus::Missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path());

        let path = staging.write("clip.wav", b"RIFF....WAVE").await.unwrap();
        assert_eq!(path, dir.path().join("clip.wav"));

        let (name, data) = staging.read_back(&path).await.unwrap();
        assert_eq!(name, "clip.wav");
        assert_eq!(data, b"RIFF....WAVE");
    }

    #[tokio::test]
    async fn test_write_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path());

        staging.write("clip.wav", b"first version, longer").await.unwrap();
        let path = staging.write("clip.wav", b"second").await.unwrap();

        let (_, data) = staging.read_back(&path).await.unwrap();
        assert_eq!(data, b"second");
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path().join("absent"));

        let err = staging.write("clip.wav", b"data").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_read_back_uses_basename() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        let staging = StagingArea::new(dir.path());

        let path = staging.write("nested/clip.wav", b"data").await.unwrap();
        let err = staging.read_back(&path).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_probe() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(StagingArea::new(dir.path()).probe().await, StagingStatus::Ready);
        assert_eq!(
            StagingArea::new(dir.path().join("absent")).probe().await,
            StagingStatus::Missing
        );

        let file = dir.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        assert_eq!(
            StagingArea::new(&file).probe().await,
            StagingStatus::NotADirectory
        );
    }
}
