use crate::errors::ErrorCondition;
use crate::monitoring::Diagnostics;
use crate::region::Disposable;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
/// A file handle that announces its release on the diagnostics sink.
pub struct TrackedFile {
    path: PathBuf,
    file: File,
    diagnostics: Arc<Diagnostics>,
}
impl TrackedFile {
    pub fn open(path: &Path, diagnostics: &Arc<Diagnostics>) -> Result<Self, ErrorCondition> {
        let file = File::open(path).map_err(|e| ErrorCondition::from_io(&e, path))?;
        Ok(Self::wrap(path, file, diagnostics))
    }
    pub fn create(path: &Path, diagnostics: &Arc<Diagnostics>) -> Result<Self, ErrorCondition> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| ErrorCondition::from_io(&e, path))?;
        Ok(Self::wrap(path, file, diagnostics))
    }
    fn wrap(path: &Path, file: File, diagnostics: &Arc<Diagnostics>) -> Self {
        Self {
            path: path.to_path_buf(),
            file,
            diagnostics: Arc::clone(diagnostics),
        }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
    pub fn write_line(&mut self, line: &str) -> Result<(), ErrorCondition> {
        writeln!(self.file, "{}", line).map_err(|e| ErrorCondition::from_io(&e, &self.path))
    }
    pub fn read_to_string(&mut self) -> Result<String, ErrorCondition> {
        let mut content = String::new();
        self.file
            .read_to_string(&mut content)
            .map_err(|e| ErrorCondition::from_io(&e, &self.path))?;
        Ok(content)
    }
}
impl Disposable for TrackedFile {
    fn dispose(&mut self) -> Result<(), ErrorCondition> {
        self.file.flush().map_err(|e| ErrorCondition::from_io(&e, &self.path))?;
        self.diagnostics.info("dispose", format!("closed {}", self.display_name()));
        Ok(())
    }
}
