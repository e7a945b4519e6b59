//! Exclusion rules for the release archive
//!
//! Finder metadata never belongs in a published template. Anything else
//! is packaged unless `dist.exclude` names it.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Patterns always left out of the archive
const DEFAULT_EXCLUDES: &[&str] = &[".DS_Store", "**/.DS_Store"];

/// Errors for exclusion rules
#[derive(Debug, thiserror::Error)]
pub enum ExcludeError {
    #[error("Glob pattern error: {0}")]
    GlobError(#[from] globset::Error),
}

/// Glob-based archive filter
#[derive(Debug)]
pub struct ExcludeRules {
    glob_set: GlobSet,
}

impl ExcludeRules {
    /// Default rules plus `extra` patterns (from `dist.exclude`)
    pub fn new<S: AsRef<str>>(extra: &[S]) -> Result<Self, ExcludeError> {
        let mut builder = GlobSetBuilder::new();

        for pattern in DEFAULT_EXCLUDES {
            builder.add(Glob::new(pattern)?);
        }
        for pattern in extra {
            let pattern = pattern.as_ref().trim();
            if !pattern.is_empty() {
                builder.add(Glob::new(pattern)?);
            }
        }

        Ok(Self {
            glob_set: builder.build()?,
        })
    }

    /// Check a path relative to the archive root
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.glob_set.is_match(path_str.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ExcludeRules {
        ExcludeRules::new::<&str>(&[]).unwrap()
    }

    #[test]
    fn test_default_excludes_ds_store() {
        let rules = defaults();

        assert!(rules.is_excluded(Path::new(".DS_Store")));
        assert!(rules.is_excluded(Path::new("pygios/app_packages.iphoneos/.DS_Store")));
    }

    #[test]
    fn test_editor_files_need_configured_patterns() {
        let rules = defaults();
        assert!(!rules.is_excluded(Path::new("pygios/main.py~")));
        assert!(!rules.is_excluded(Path::new("pygios/.main.py.swp")));

        let rules = ExcludeRules::new(&["**/*~", "**/*.swp"]).unwrap();
        assert!(rules.is_excluded(Path::new("pygios/main.py~")));
        assert!(rules.is_excluded(Path::new("pygios/.main.py.swp")));
    }

    #[test]
    fn test_template_files_not_excluded() {
        let rules = defaults();

        assert!(!rules.is_excluded(Path::new("pygios.xcodeproj/project.pbxproj")));
        assert!(!rules.is_excluded(Path::new("pygios/app_packages.iphoneos/pygame/base.so")));
        assert!(!rules.is_excluded(Path::new("pygios/main.py")));
    }

    #[test]
    fn test_extra_patterns() {
        let rules = ExcludeRules::new(&["**/__pycache__/**", "*.pyc"]).unwrap();

        assert!(rules.is_excluded(Path::new("pygios/app_packages.iphoneos/pygame/__pycache__/x.pyc")));
        assert!(rules.is_excluded(Path::new("pygios/main.pyc")));
        assert!(rules.is_excluded(Path::new(".DS_Store")));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(ExcludeRules::new(&["[unclosed"]).is_err());
    }
}
