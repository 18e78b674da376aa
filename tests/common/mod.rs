use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test helper providing an input tree and an output location in a temp dir
pub struct TestFixture {
    _temp_dir: TempDir,
    pub base_path: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let base_path = temp_dir.path().to_path_buf();
        let input = base_path.join("files");
        let output = base_path.join("export");
        fs::create_dir_all(&input).unwrap();
        Self {
            _temp_dir: temp_dir,
            base_path,
            input,
            output,
        }
    }

    /// Writes a template below the input directory
    pub fn template(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.input.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Reads a file from the output directory, `None` if it was not written
    pub fn exported(&self, relative: &str) -> Option<String> {
        fs::read_to_string(self.output.join(relative)).ok()
    }

    /// Writes a .env file next to the input directory and returns its provider URI
    pub fn dotenv(&self, content: &str) -> String {
        let path = self.base_path.join(".env");
        fs::write(&path, content).unwrap();
        format!("dotenv:{}", path.display())
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
