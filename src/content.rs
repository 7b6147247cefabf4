//! Loads a [`Site`] from a content directory: one YAML file per hub category,
//! a directory of markdown blog posts and the free software listing. Missing
//! files and directories load as empty catalogs.

use crate::blog::{BlogPost, Error as BlogError};
use crate::catalog::{Catalog, DuplicateKey};
use crate::hub::{Category, HubEntry, InvalidEntry};
use crate::site::Site;
use crate::tool::Tool;
use serde::de::DeserializeOwned;
use std::fmt;
use std::fs::read_dir;
use std::path::{Path, PathBuf};

const MARKDOWN_EXTENSION: &str = "md";

/// The directory, relative to the content directory, holding blog posts.
pub const BLOG_DIRECTORY: &str = "blog";

/// The file, relative to the content directory, listing free software.
pub const TOOLS_FILE: &str = "tools.yaml";

/// Loads every catalog found under `content_directory`.
pub fn load_site(content_directory: &Path) -> Result<Site> {
    let courses = load_hubs(content_directory, Category::Course)?;
    let products = load_hubs(content_directory, Category::Product)?;
    let documents = load_hubs(content_directory, Category::Document)?;
    let blog = load_blog(&content_directory.join(BLOG_DIRECTORY))?;
    let tools = load_tools(content_directory)?;
    log::info!(
        "loaded {} courses, {} products, {} documents, {} blog posts, {} tools",
        courses.len(),
        products.len(),
        documents.len(),
        blog.len(),
        tools.len()
    );
    Ok(Site::new(courses, products, documents, blog).with_tools(tools))
}

/// Loads the hub catalog for `category` from its YAML file, a sequence of
/// entries in display order.
pub fn load_hubs(content_directory: &Path, category: Category) -> Result<Catalog<HubEntry>> {
    let path = content_directory.join(category.content_file());
    if !path.is_file() {
        log::debug!(
            "no `{}`; the {} catalog is empty",
            path.display(),
            category
        );
        return Ok(Catalog::empty());
    }
    annotate(&path, parse_hubs(&path))
}

fn parse_hubs(path: &Path) -> Result<Catalog<HubEntry>> {
    let entries: Vec<HubEntry> = read_entries(path)?;
    for entry in &entries {
        entry.validate()?;
    }
    Ok(Catalog::from_entries(entries)?)
}

/// Loads the free software listing from `tools.yaml`, in file order.
pub fn load_tools(content_directory: &Path) -> Result<Catalog<Tool>> {
    let path = content_directory.join(TOOLS_FILE);
    if !path.is_file() {
        log::debug!("no `{}`; the tools catalog is empty", path.display());
        return Ok(Catalog::empty());
    }
    annotate(&path, parse_tools(&path))
}

fn parse_tools(path: &Path) -> Result<Catalog<Tool>> {
    let tools: Vec<Tool> = read_entries(path)?;
    for tool in &tools {
        tool.validate()?;
    }
    Ok(Catalog::from_entries(tools)?)
}

// A YAML sequence of entries; an empty file is an empty sequence.
fn read_entries<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        Ok(Vec::new())
    } else {
        Ok(serde_yaml::from_str(&contents)?)
    }
}

/// Loads every `*.md` post in `blog_directory`, ordered by ascending id.
pub fn load_blog(blog_directory: &Path) -> Result<Catalog<BlogPost>> {
    if !blog_directory.is_dir() {
        log::debug!(
            "no `{}`; the blog catalog is empty",
            blog_directory.display()
        );
        return Ok(Catalog::empty());
    }

    let mut posts = Vec::new();
    for result in read_dir(blog_directory)? {
        let path = result?.path();
        if path.is_file() && path.extension().map_or(false, |e| e == MARKDOWN_EXTENSION) {
            posts.push(annotate(&path, parse_post(&path))?);
        }
    }

    posts.sort_by_key(|p| p.id);
    Ok(Catalog::from_entries(posts)?)
}

fn parse_post(path: &Path) -> Result<BlogPost> {
    Ok(BlogPost::parse(&std::fs::read_to_string(path)?)?)
}

fn annotate<T>(path: &Path, result: Result<T>) -> Result<T> {
    result.map_err(|e| Error::Annotated(path.to_owned(), Box::new(e)))
}

/// Represents the result of loading content.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading content.
#[derive(Debug)]
pub enum Error {
    /// Returned when a hub file isn't valid YAML or doesn't match the entry
    /// shape.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when a blog post fails to parse.
    Post(BlogError),

    /// Returned when a hub entry fails validation.
    InvalidEntry(InvalidEntry),

    /// Returned when two entries of one catalog share a key.
    DuplicateKey(DuplicateKey),

    /// Returned for I/O errors.
    Io(std::io::Error),

    /// An error annotated with the file it came from.
    Annotated(PathBuf, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::Post(err) => err.fmt(f),
            Error::InvalidEntry(err) => err.fmt(f),
            Error::DuplicateKey(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::Annotated(path, err) => write!(f, "loading `{}`: {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DeserializeYaml(err) => Some(err),
            Error::Post(err) => Some(err),
            Error::InvalidEntry(err) => Some(err),
            Error::DuplicateKey(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<BlogError> for Error {
    fn from(err: BlogError) -> Error {
        Error::Post(err)
    }
}

impl From<InvalidEntry> for Error {
    fn from(err: InvalidEntry) -> Error {
        Error::InvalidEntry(err)
    }
}

impl From<DuplicateKey> for Error {
    fn from(err: DuplicateKey) -> Error {
        Error::DuplicateKey(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
