// File: src/template_loader.rs
// Purpose: Locates and reads view files under the application's views root

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Extension appended to every view name
pub const VIEW_EXTENSION: &str = ".html.json";

/// Reads views such as `views/users/show.html.json` by name (`users/show`)
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    views_root: PathBuf,
}

impl TemplateLoader {
    pub fn new(views_root: impl Into<PathBuf>) -> Self {
        Self {
            views_root: views_root.into(),
        }
    }

    pub fn views_root(&self) -> &Path {
        &self.views_root
    }

    /// Where the view called `name` is expected to live
    pub fn view_path(&self, name: &str) -> PathBuf {
        let name = name.trim_start_matches('/');
        self.views_root.join(format!("{}{}", name, VIEW_EXTENSION))
    }

    /// Reads a view's template text
    pub fn load(&self, name: &str) -> Result<String> {
        let path = self.view_path(name);
        fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => Error::ViewNotFound {
                name: name.to_string(),
                path: path.clone(),
            },
            _ => Error::ViewIo {
                path: path.clone(),
                source,
            },
        })
    }
}
