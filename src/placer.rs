/// Placement of classified icons under the destination root.
///
/// Files land in `<destination>/<category>/<color>/<name>`. When the name is
/// taken, a counter is inserted before the extension (`name_1.svg`,
/// `name_2.svg`, ...) up to a fixed number of attempts.
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Suffixes tried before a file is given up on.
pub const DEFAULT_MAX_COLLISION_ATTEMPTS: u32 = 10_000;

/// Errors that can occur while placing a single file.
#[derive(Debug, Error)]
pub enum PlaceError {
    /// Failed to create the category/color directory.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    /// Failed to move the file to its destination.
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// Every suffixed name up to the limit is already taken.
    #[error("No free name for {} after {attempts} attempts", path.display())]
    CollisionLoopExceeded { path: PathBuf, attempts: u32 },
}

/// Result type for placement operations.
pub type PlaceResult<T> = Result<T, PlaceError>;

/// A completed (or planned) move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Where the file was found.
    pub source: PathBuf,
    /// Absolute or root-joined destination path.
    pub destination: PathBuf,
    /// `category/color/name` below the destination root.
    pub relative: PathBuf,
}

/// Computes destinations and moves files into them.
#[derive(Debug, Clone)]
pub struct Placer {
    destination_root: PathBuf,
    max_attempts: u32,
}

impl Placer {
    pub fn new(destination_root: impl Into<PathBuf>, max_attempts: u32) -> Self {
        Self {
            destination_root: destination_root.into(),
            max_attempts,
        }
    }

    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// `<destination>/<category>/<color>`.
    pub fn destination_dir(&self, category: &str, color: &str) -> PathBuf {
        self.destination_root.join(category).join(color)
    }

    /// Finds the first free name in `dir`, starting with `file_name` itself.
    ///
    /// `is_taken` decides whether a candidate is occupied, which lets a dry
    /// run account for destinations it has already planned.
    pub fn resolve_destination(
        &self,
        dir: &Path,
        file_name: &str,
        is_taken: impl Fn(&Path) -> bool,
    ) -> PlaceResult<PathBuf> {
        let candidate = dir.join(file_name);
        if !is_taken(&candidate) {
            return Ok(candidate);
        }

        for counter in 1..=self.max_attempts {
            let candidate = dir.join(suffixed_name(file_name, counter));
            if !is_taken(&candidate) {
                return Ok(candidate);
            }
        }

        Err(PlaceError::CollisionLoopExceeded {
            path: dir.join(file_name),
            attempts: self.max_attempts,
        })
    }

    /// Computes where a file would go without touching the filesystem
    /// beyond existence checks.
    pub fn plan(
        &self,
        source: &Path,
        category: &str,
        color: &str,
        file_name: &str,
        planned: &HashSet<PathBuf>,
    ) -> PlaceResult<Placement> {
        let dir = self.destination_dir(category, color);
        let destination = self.resolve_destination(&dir, file_name, |candidate| {
            planned.contains(candidate) || is_occupied(candidate)
        })?;
        Ok(self.placement(source, category, color, destination))
    }

    /// Creates the destination directory and moves `source` into it.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use iconsort::placer::Placer;
    /// use std::path::Path;
    ///
    /// let placer = Placer::new("sorted", 100);
    /// match placer.place(Path::new("raw/ic_wifi.svg"), "status_bar", "default", "wifi.svg") {
    ///     Ok(placement) => println!("moved to {}", placement.relative.display()),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn place(
        &self,
        source: &Path,
        category: &str,
        color: &str,
        file_name: &str,
    ) -> PlaceResult<Placement> {
        let dir = self.destination_dir(category, color);
        fs::create_dir_all(&dir).map_err(|e| PlaceError::DirectoryCreationFailed {
            path: dir.clone(),
            source: e,
        })?;

        let destination = self.resolve_destination(&dir, file_name, is_occupied)?;

        move_file(source, &destination).map_err(|e| PlaceError::MoveFailed {
            from: source.to_path_buf(),
            to: destination.clone(),
            source: e,
        })?;

        Ok(self.placement(source, category, color, destination))
    }

    fn placement(
        &self,
        source: &Path,
        category: &str,
        color: &str,
        destination: PathBuf,
    ) -> Placement {
        let mut relative = PathBuf::from(category);
        relative.push(color);
        if let Some(name) = destination.file_name() {
            relative.push(name);
        }
        Placement {
            source: source.to_path_buf(),
            destination,
            relative,
        }
    }
}

/// Inserts `_<counter>` before the last extension.
///
/// `wifi.svg` becomes `wifi_1.svg`; names without an extension (or dot
/// files such as `.svg`) get the suffix at the end.
pub fn suffixed_name(file_name: &str, counter: u32) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{counter}.{ext}"),
        _ => format!("{file_name}_{counter}"),
    }
}

/// Any directory entry counts, including dangling symlinks.
fn is_occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Renames, falling back to copy and delete across filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(
                from = %from.display(),
                to = %to.display(),
                "rename crosses devices, copying instead"
            );
            fs::copy(from, to)?;
            if let Err(e) = fs::remove_file(from) {
                let _ = fs::remove_file(to);
                return Err(e);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}
