//! Loads the project file (`hubsite.yaml`) and the theme file
//! (`theme/theme.yaml`) and resolves them into a [`Config`].

use crate::render::TemplatePaths;
use crate::theme::Theme;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

pub const PROJECT_FILE: &str = "hubsite.yaml";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "_output";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

/// Which identity backend the signup form talks to.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SignupBackend {
    /// No backend; the form renders disabled.
    None,

    /// An in-process account store, for local development.
    Memory,
}

impl Default for SignupBackend {
    fn default() -> Self {
        SignupBackend::None
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Project {
    title: String,

    #[serde(default)]
    author: Option<Author>,
    site_root: Url,

    #[serde(default)]
    theme: Theme,

    #[serde(default)]
    signup: SignupBackend,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ThemeFile {
    home_template: Vec<PathBuf>,
    listing_template: Vec<PathBuf>,
    hub_template: Vec<PathBuf>,
    sub_page_template: Vec<PathBuf>,
    blog_index_template: Vec<PathBuf>,
    blog_post_template: Vec<PathBuf>,
    not_found_template: Vec<PathBuf>,
    signup_template: Vec<PathBuf>,
    tools_template: Vec<PathBuf>,
}

pub struct Config {
    pub title: String,
    pub author: Option<Author>,
    pub home_page: Url,
    pub static_url: Url,
    pub theme: Theme,
    pub signup: SignupBackend,
    pub content_directory: PathBuf,
    pub templates: TemplatePaths,
    pub static_source_directory: PathBuf,
    pub output_directory: PathBuf,
}

impl Config {
    /// Finds `hubsite.yaml` in `dir` or the nearest parent directory and
    /// loads it. `output_directory` defaults to `_output` next to the project
    /// file.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, output_directory)
                .with_context(|| format!("Loading configuration from `{}`", path.display()))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        use crate::util::read_yaml;
        let project: Project = read_yaml(path, "project")?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{}'",
                path.display()
            )
        })?;

        let theme_dir = project_root.join("theme");
        let theme: ThemeFile = read_yaml(&theme_dir.join("theme.yaml"), "theme")?;
        let in_theme = |paths: Vec<PathBuf>| -> Vec<PathBuf> {
            paths.iter().map(|relpath| theme_dir.join(relpath)).collect()
        };

        // Relative joins against a root without a trailing slash would drop
        // its last path segment.
        let mut home_page = project.site_root;
        if !home_page.path().ends_with('/') {
            let path = format!("{}/", home_page.path());
            home_page.set_path(&path);
        }

        Ok(Config {
            title: project.title,
            author: project.author,
            static_url: home_page.join("static/")?,
            home_page,
            theme: project.theme,
            signup: project.signup,
            content_directory: project_root.join("content"),
            templates: TemplatePaths {
                home: in_theme(theme.home_template),
                listing: in_theme(theme.listing_template),
                hub: in_theme(theme.hub_template),
                sub_page: in_theme(theme.sub_page_template),
                blog_index: in_theme(theme.blog_index_template),
                blog_post: in_theme(theme.blog_post_template),
                not_found: in_theme(theme.not_found_template),
                signup: in_theme(theme.signup_template),
                tools: in_theme(theme.tools_template),
            },
            static_source_directory: theme_dir.join("static"),
            output_directory: match output_directory {
                Some(dir) => dir.to_owned(),
                None => project_root.join(DEFAULT_OUTPUT_DIRECTORY),
            },
        })
    }
}
