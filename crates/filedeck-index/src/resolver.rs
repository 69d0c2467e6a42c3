//! Client path resolution against the configured scan root.
//!
//! Every client-supplied path passes through here before it touches the
//! filesystem. Resolution fails closed: anything that would land outside
//! the root (`..` escapes, absolute paths elsewhere, null bytes, symlinks
//! pointing out) is rejected.

use std::path::{Component, Path, PathBuf};

use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;

/// A validated path inside the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Path relative to the scan root, `/`-separated. Empty for the root.
    pub rel: String,
    /// Absolute filesystem path.
    pub abs: PathBuf,
}

impl ResolvedPath {
    /// Returns the final path component, or the empty string for the root.
    pub fn name(&self) -> &str {
        self.rel.rsplit('/').next().unwrap_or("")
    }

    /// Whether this is the scan root itself.
    pub fn is_root(&self) -> bool {
        self.rel.is_empty()
    }
}

/// Maps logical client paths to validated absolute locations.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Canonicalized scan root.
    root: PathBuf,
}

impl PathResolver {
    /// Creates a resolver for the given scan root.
    ///
    /// The root must exist; it is canonicalized once here so later
    /// containment checks compare canonical forms.
    pub async fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        let root = tokio::fs::canonicalize(&root).await.map_err(|e| {
            AppError::configuration(format!(
                "Scan root '{}' is not accessible: {e}",
                root.display()
            ))
        })?;
        Ok(Self { root })
    }

    /// The canonical scan root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The root as a resolved path (rel = "").
    pub fn root_path(&self) -> ResolvedPath {
        ResolvedPath {
            rel: String::new(),
            abs: self.root.clone(),
        }
    }

    /// Resolves a client path against the scan root.
    ///
    /// Accepted forms: root-relative paths with or without a leading `/`,
    /// and absolute paths that already lie inside the root. An absolute
    /// path outside the root is retried as root-relative (the normal form
    /// the UI sends), so nothing a client passes can address the host
    /// filesystem.
    pub async fn resolve(&self, raw: &str) -> AppResult<ResolvedPath> {
        if raw.contains('\0') {
            return Err(out_of_root(raw));
        }

        let candidate = Path::new(raw);
        if candidate.is_absolute() {
            if let Some(clean) = normalize(candidate.strip_prefix("/").unwrap_or(candidate)) {
                let abs = Path::new("/").join(&clean);
                if let Ok(rel) = abs.strip_prefix(&self.root) {
                    let rel = rel_string(rel);
                    return self.finish(raw, rel).await;
                }
            }
        }

        let trimmed = raw.trim_start_matches('/');
        let clean = normalize(Path::new(trimmed)).ok_or_else(|| out_of_root(raw))?;
        self.finish(raw, rel_string(&clean)).await
    }

    /// Resolves `raw` inside an already-resolved base directory.
    ///
    /// Used by share browsing: the result is additionally required to stay
    /// under `base`, and an escape is a `Forbidden` rather than a malformed
    /// path, since the share itself is valid.
    pub async fn resolve_within(
        &self,
        base: &ResolvedPath,
        raw: &str,
    ) -> AppResult<ResolvedPath> {
        if raw.contains('\0') {
            return Err(out_of_root(raw));
        }

        let trimmed = raw.trim_start_matches('/');
        let clean = normalize(Path::new(trimmed))
            .ok_or_else(|| AppError::forbidden("Path is outside the shared folder"))?;

        let rel = join_rel(&base.rel, &rel_string(&clean));
        let resolved = self.finish(raw, rel).await?;

        if !in_subtree(&resolved.rel, &base.rel) {
            return Err(AppError::forbidden("Path is outside the shared folder"));
        }
        Ok(resolved)
    }

    /// Returns the absolute path for an already-validated relative path.
    pub fn abs_of(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }

    /// Applies the symlink containment check and assembles the result.
    async fn finish(&self, raw: &str, rel: String) -> AppResult<ResolvedPath> {
        let abs = self.abs_of(&rel);

        // When the target exists, its canonical location must still be
        // under the root; a symlink pointing outside fails here.
        match tokio::fs::canonicalize(&abs).await {
            Ok(real) => {
                let real_rel = real
                    .strip_prefix(&self.root)
                    .map_err(|_| out_of_root(raw))?;
                Ok(ResolvedPath {
                    rel: rel_string(real_rel),
                    abs: real,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(ResolvedPath { rel, abs })
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Lexically normalizes a relative path. Returns `None` when `..` would
/// climb above the start.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !clean.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(clean)
}

fn rel_string(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

fn out_of_root(raw: &str) -> AppError {
    AppError::out_of_root(format!("Path escapes the scan root: '{raw}'"))
}

/// Joins two relative paths, treating "" as the root.
pub fn join_rel(parent: &str, child: &str) -> String {
    match (parent.is_empty(), child.is_empty()) {
        (_, true) => parent.to_string(),
        (true, false) => child.to_string(),
        (false, false) => format!("{parent}/{child}"),
    }
}

/// Whether `rel` equals `base` or lies underneath it ("" is everything).
pub fn in_subtree(rel: &str, base: &str) -> bool {
    base.is_empty() || rel == base || rel.starts_with(&format!("{base}/"))
}
