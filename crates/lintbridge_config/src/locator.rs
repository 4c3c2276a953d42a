//! Resolution of file names referenced from rule configurations.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Resolves a file name referenced by a rule module.
pub trait FileLocator {
    /// Returns the name the engine should use for `file_name`, or `None` if
    /// the file cannot be found.
    fn locate(&self, file_name: &str) -> io::Result<Option<String>>;
}

/// Project and module directories used to resolve relative file names.
///
/// Search order for a name that does not exist as given:
/// 1. the directory of the rule configuration file
/// 2. the module content roots
/// 3. the module directory
/// 4. the project directory
/// 5. the class path (returns the name unchanged)
#[derive(Debug, Clone, Default)]
pub struct ModuleContext {
    project_dir: Option<PathBuf>,
    module_dir: Option<PathBuf>,
    content_roots: Vec<PathBuf>,
    config_dir: Option<PathBuf>,
    class_path: Vec<PathBuf>,
}

impl ModuleContext {
    /// Creates a context rooted at a project directory.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: Some(project_dir.into()),
            ..Self::default()
        }
    }

    /// Sets the module directory.
    pub fn with_module_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.module_dir = Some(dir.into());
        self
    }

    /// Adds a module content root.
    pub fn with_content_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.content_roots.push(dir.into());
        self
    }

    /// Sets the directory containing the rule configuration file.
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Adds a class path directory.
    pub fn with_class_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.class_path.push(dir.into());
        self
    }

    /// Project directory, if known.
    pub fn project_dir(&self) -> Option<&Path> {
        self.project_dir.as_deref()
    }

    /// Module directory, if known.
    pub fn module_dir(&self) -> Option<&Path> {
        self.module_dir.as_deref()
    }

    /// Directory of the rule configuration file, if known.
    pub fn config_dir(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }

    /// Class path directories.
    pub fn class_path(&self) -> &[PathBuf] {
        &self.class_path
    }

    fn search_dirs(&self) -> impl Iterator<Item = &Path> {
        self.config_dir
            .iter()
            .chain(self.content_roots.iter())
            .chain(self.module_dir.iter())
            .chain(self.project_dir.iter())
            .map(PathBuf::as_path)
    }

    fn on_class_path(&self, file_name: &str) -> io::Result<bool> {
        let relative = file_name.strip_prefix('/').unwrap_or(file_name);
        for dir in &self.class_path {
            if dir.join(relative).try_exists()? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl FileLocator for ModuleContext {
    fn locate(&self, file_name: &str) -> io::Result<Option<String>> {
        if Path::new(file_name).try_exists()? {
            return Ok(Some(file_name.to_string()));
        }

        let lower = file_name.to_ascii_lowercase();
        if file_name.trim().is_empty() || lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Some(file_name.to_string()));
        }

        for dir in self.search_dirs() {
            let candidate = dir.join(file_name);
            if candidate.try_exists()? {
                let absolute = absolute_normalized(&candidate)?;
                return Ok(Some(absolute.to_string_lossy().into_owned()));
            }
        }

        if self.on_class_path(file_name)? {
            return Ok(Some(file_name.to_string()));
        }

        Ok(None)
    }
}

/// Removes `.` and `..` components without touching the file system.
///
/// A `..` that would climb above the root or the start of a relative path is
/// kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Makes `path` absolute against the working directory and normalizes it.
pub fn absolute_normalized(path: &Path) -> io::Result<PathBuf> {
    Ok(normalize_path(&std::path::absolute(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::fs;
    use tempfile::tempdir;

    #[rstest]
    #[case("/a/b/../c", "/a/c")]
    #[case("/a/./b/", "/a/b")]
    #[case("/..", "/")]
    #[case("a/../../b", "../b")]
    #[case("./a", "a")]
    fn test_normalize_path(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_path(Path::new(input)), PathBuf::from(expected));
    }

    #[rstest]
    #[case::blank("   ")]
    #[case::http("http://example.com/suppressions.xml")]
    #[case::https("HTTPS://example.com/suppressions.xml")]
    fn test_passes_through_unresolvable_names(#[case] name: &str) {
        let dir = tempdir().unwrap();
        let context = ModuleContext::new(dir.path());
        assert_eq!(context.locate(name).unwrap(), Some(name.to_string()));
    }

    #[test]
    fn test_existing_name_is_returned_unchanged() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("header.txt");
        fs::write(&file, "// header").unwrap();

        let name = file.to_string_lossy().into_owned();
        let context = ModuleContext::default();
        assert_eq!(context.locate(&name).unwrap(), Some(name));
    }

    #[test]
    fn test_config_dir_wins_over_project_dir() {
        let dir = tempdir().unwrap();
        let config_dir = dir.path().join("rules");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("suppressions.xml"), "").unwrap();
        fs::write(dir.path().join("suppressions.xml"), "").unwrap();

        let context = ModuleContext::new(dir.path()).with_config_dir(&config_dir);
        let located = context.locate("suppressions.xml").unwrap().unwrap();
        assert_eq!(
            PathBuf::from(located),
            normalize_path(&config_dir.join("suppressions.xml"))
        );
    }

    #[test]
    fn test_search_order_content_roots_then_module_then_project() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        let module = dir.path().join("module");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&module).unwrap();
        fs::write(module.join("import-control.xml"), "").unwrap();
        fs::write(dir.path().join("import-control.xml"), "").unwrap();

        let context = ModuleContext::new(dir.path())
            .with_content_root(&root)
            .with_module_dir(&module);
        let located = context.locate("import-control.xml").unwrap().unwrap();
        assert_eq!(PathBuf::from(located), module.join("import-control.xml"));

        fs::write(root.join("import-control.xml"), "").unwrap();
        let located = context.locate("import-control.xml").unwrap().unwrap();
        assert_eq!(PathBuf::from(located), root.join("import-control.xml"));
    }

    #[test]
    fn test_parent_relative_name_is_normalized() {
        let dir = tempdir().unwrap();
        let module = dir.path().join("app");
        let shared = dir.path().join("shared");
        fs::create_dir_all(&module).unwrap();
        fs::create_dir_all(&shared).unwrap();
        fs::write(shared.join("suppressions.xml"), "").unwrap();

        let context = ModuleContext::new(dir.path().join("elsewhere")).with_module_dir(&module);
        let located = context.locate("../shared/suppressions.xml").unwrap().unwrap();
        assert_eq!(PathBuf::from(&located), shared.join("suppressions.xml"));
        assert!(Path::new(&located).is_absolute());
    }

    #[test]
    fn test_class_path_returns_raw_name() {
        let dir = tempdir().unwrap();
        let class_path = dir.path().join("classes");
        fs::create_dir_all(class_path.join("config")).unwrap();
        fs::write(class_path.join("config/header.txt"), "").unwrap();

        let context = ModuleContext::new(dir.path()).with_class_path(&class_path);
        assert_eq!(
            context.locate("/config/header.txt").unwrap(),
            Some("/config/header.txt".to_string())
        );
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let context = ModuleContext::new(dir.path());
        assert_eq!(context.locate("missing.xml").unwrap(), None);
    }
}
