//! Reading sources and writing resolved artifacts.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::program::Program;

pub const SOURCE_EXT: &str = "jasm";
/// Appended to the source path to name its resolved artifact.
pub const COMPILED_SUFFIX: &str = "~";

#[derive(thiserror::Error, Debug)]
pub enum ArtifactError {
    #[error("file extension not supported: {} (expected .jasm or .jasm~)", .path.display())]
    Extension { path: PathBuf },
    #[error("could not create '{}': file already exists", .path.display())]
    Exists { path: PathBuf },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// True for `name.jasm~`.
pub fn is_artifact(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(|e| e.strip_suffix(COMPILED_SUFFIX))
        == Some(SOURCE_EXT)
}

/// Read a `.jasm` source or a `.jasm~` artifact; both compile the same way.
pub fn read_source(path: &Path) -> Result<String, ArtifactError> {
    let ext = path.extension().and_then(|e| e.to_str());
    if ext != Some(SOURCE_EXT) && !is_artifact(path) {
        return Err(ArtifactError::Extension {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

/// `prog.jasm` -> `prog.jasm~`
pub fn artifact_path(source: &Path) -> PathBuf {
    let mut s = source.as_os_str().to_os_string();
    s.push(COMPILED_SUFFIX);
    PathBuf::from(s)
}

/// Write the resolved program to `path`. Never overwrites an existing file.
pub fn write_artifact(path: &Path, program: &Program) -> Result<(), ArtifactError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => ArtifactError::Exists {
                path: path.to_path_buf(),
            },
            _ => ArtifactError::Io(e),
        })?;
    file.write_all(program.artifact().as_bytes())?;
    debug!(path = %path.display(), lines = program.len(), "artifact written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("jasm-artifact-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn artifact_path_appends_suffix() {
        assert_eq!(
            artifact_path(Path::new("dir/loop.jasm")),
            PathBuf::from("dir/loop.jasm~")
        );
    }

    #[test]
    fn rejects_other_extensions() {
        let path = scratch("notes.txt");
        std::fs::write(&path, "PUT A0 1\n").unwrap();
        assert!(matches!(read_source(&path), Err(ArtifactError::Extension { .. })));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn writes_once_then_refuses_to_overwrite() {
        let src = scratch("count.jasm");
        std::fs::write(&src, "start:\n  INC A0\n  JMP start\n").unwrap();
        let text = read_source(&src).unwrap();
        let program = Program::compile(&text).unwrap();

        let out = artifact_path(&src);
        let _ = std::fs::remove_file(&out);
        write_artifact(&out, &program).unwrap();
        assert!(is_artifact(&out));
        assert_eq!(read_source(&out).unwrap(), "start:\nINC A0\nJMP 1\n");
        assert!(matches!(
            write_artifact(&out, &program),
            Err(ArtifactError::Exists { .. })
        ));
        let _ = std::fs::remove_file(&out);
        let _ = std::fs::remove_file(&src);
    }
}
