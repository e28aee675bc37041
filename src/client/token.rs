use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;

/// Where the signed-in user's token is kept between CLI runs.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when no one has logged in yet.
    pub fn load(&self) -> anyhow::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(s) => {
                let token = s.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read token from {}", self.path.display())),
        }
    }

    pub fn save(&self, token: &str) -> anyhow::Result<()> {
        fs::write(&self.path, token)
            .with_context(|| format!("write token to {}", self.path.display()))
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                Err(e).with_context(|| format!("remove {}", self.path.display()))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fintrack-token-{tag}-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn missing_file_means_logged_out() {
        let file = TokenFile::new(temp_path("missing"));
        assert_eq!(file.load().unwrap(), None);
        file.clear().unwrap();
    }

    #[test]
    fn save_load_clear() {
        let file = TokenFile::new(temp_path("cycle"));
        file.save("abc.def.ghi").unwrap();
        assert_eq!(file.load().unwrap().as_deref(), Some("abc.def.ghi"));
        file.clear().unwrap();
        assert_eq!(file.load().unwrap(), None);
    }

    #[test]
    fn path_names_the_file_written() {
        let target = temp_path("where");
        let file = TokenFile::new(&target);
        assert_eq!(file.path(), target.as_path());
        file.save("abc").unwrap();
        assert!(file.path().exists());
        file.clear().unwrap();
        assert!(!file.path().exists());
    }
}
