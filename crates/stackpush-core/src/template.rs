//! Stack template discovery

use crate::error::{PushError, Result};
use stackpush_config::TemplateSelection;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Template file names, in lookup order
pub const TEMPLATE_CANDIDATES: [&str; 3] = ["cft.template", "cft.yml", "cft.json"];

/// An immutable template body and the file it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    file_name: String,
    path: PathBuf,
    body: String,
}

impl Template {
    pub fn new(file_name: impl Into<String>, body: impl Into<String>) -> Self {
        let file_name = file_name.into();
        Self {
            path: PathBuf::from(&file_name),
            file_name,
            body: body.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Literal, case-sensitive substring check against the body
    pub fn mentions(&self, text: &str) -> bool {
        self.body.contains(text)
    }
}

pub struct TemplateResolver {
    root: PathBuf,
    selection: TemplateSelection,
}

impl TemplateResolver {
    pub fn new(root: impl Into<PathBuf>, selection: TemplateSelection) -> Self {
        Self {
            root: root.into(),
            selection,
        }
    }

    /// Locate and read the template under the root directory
    ///
    /// With [`TemplateSelection::LastMatch`] every candidate is checked and
    /// the last existing one in [`TEMPLATE_CANDIDATES`] order wins.
    pub fn resolve(&self) -> Result<Template> {
        let found: Vec<&str> = TEMPLATE_CANDIDATES
            .iter()
            .copied()
            .filter(|name| self.root.join(name).is_file())
            .collect();

        let Some(&chosen) = found.last() else {
            return Err(PushError::TemplateNotFound {
                root: self.root.clone(),
                candidates: TEMPLATE_CANDIDATES.join(", "),
            });
        };

        if found.len() > 1 {
            match self.selection {
                TemplateSelection::Strict => {
                    return Err(PushError::AmbiguousTemplate {
                        root: self.root.clone(),
                        found: found.join(", "),
                    });
                }
                TemplateSelection::LastMatch => {
                    warn!(
                        candidates = %found.join(", "),
                        chosen = chosen,
                        "Multiple templates found; using the last candidate"
                    );
                }
            }
        }

        let path = self.root.join(chosen);
        let body = std::fs::read_to_string(&path).map_err(|e| PushError::TemplateRead {
            path: path.clone(),
            message: e.to_string(),
        })?;
        info!("Template used: {}", chosen);

        Ok(Template {
            file_name: chosen.to_string(),
            path,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolve_single_candidate() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("cft.yml"), "Resources: {}").unwrap();

        let template = TemplateResolver::new(temp_dir.path(), TemplateSelection::LastMatch)
            .resolve()
            .unwrap();
        assert_eq!(template.file_name(), "cft.yml");
        assert_eq!(template.body(), "Resources: {}");
        assert_eq!(template.path(), temp_dir.path().join("cft.yml"));
    }

    #[test]
    fn test_resolve_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("template.yml"), "{}").unwrap();

        let result = TemplateResolver::new(temp_dir.path(), TemplateSelection::LastMatch).resolve();
        match result {
            Err(PushError::TemplateNotFound { candidates, .. }) => {
                assert_eq!(candidates, "cft.template, cft.yml, cft.json");
            }
            other => panic!("Expected TemplateNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_last_match_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("cft.template"), "template").unwrap();
        fs::write(temp_dir.path().join("cft.json"), "json").unwrap();

        let template = TemplateResolver::new(temp_dir.path(), TemplateSelection::LastMatch)
            .resolve()
            .unwrap();
        assert_eq!(template.file_name(), "cft.json");
        assert_eq!(template.body(), "json");
    }

    #[test]
    fn test_strict_rejects_ambiguity() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("cft.template"), "template").unwrap();
        fs::write(temp_dir.path().join("cft.yml"), "yml").unwrap();

        let result = TemplateResolver::new(temp_dir.path(), TemplateSelection::Strict).resolve();
        match result {
            Err(PushError::AmbiguousTemplate { found, .. }) => {
                assert_eq!(found, "cft.template, cft.yml");
            }
            other => panic!("Expected AmbiguousTemplate, got {:?}", other),
        }
    }

    #[test]
    fn test_directory_is_not_a_template() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("cft.json")).unwrap();
        fs::write(temp_dir.path().join("cft.template"), "template").unwrap();

        let template = TemplateResolver::new(temp_dir.path(), TemplateSelection::Strict)
            .resolve()
            .unwrap();
        assert_eq!(template.file_name(), "cft.template");
    }
}
