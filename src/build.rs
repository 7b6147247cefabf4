//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: loading the content catalogs
//! ([`crate::content`]), rendering every known page ([`crate::write`]),
//! copying the theme's static directory into the output directory, and
//! generating the Atom feed.

use crate::config::Config;
use crate::content::{load_site, Error as ContentError};
use crate::feed::{write_feed, Error as FeedError, FeedConfig};
use crate::hub::Category;
use crate::page::static_pages;
use crate::render::{Error as RenderError, Renderer, Templates};
use crate::route::{
    BLOG_INDEX_SEGMENT, BLOG_POST_SEGMENT, FEED_FILE, NOT_FOUND_FILE, SIGNUP_SEGMENT,
    STATIC_SEGMENT, TOOLS_SEGMENT,
};
use crate::signup::SignupForm;
use crate::write::{Error as WriteError, Writer};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a build produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildSummary {
    pub pages: usize,
    pub assets: usize,
}

/// Builds the site from a [`Config`] object. This calls into
/// [`load_site`], [`Writer::write_pages`], and [`write_feed`] which do the
/// heavy-lifting. This function also copies the static assets from the
/// theme directory to the output directory.
pub fn build_site(config: Config) -> Result<BuildSummary> {
    let site = load_site(&config.content_directory)?;
    let templates = Templates::load(&config.templates)?;

    // Blow away only the directories a build writes, so a mistaken output
    // directory doesn't lose unrelated files.
    std::fs::create_dir_all(&config.output_directory)?;
    for dir in owned_directories() {
        rmdir(&config.output_directory.join(dir))?;
    }
    for file in &["index.html", NOT_FOUND_FILE, FEED_FILE] {
        remove_file(&config.output_directory.join(file))?;
    }

    // Static output has no identity service; the signup page is written in
    // its unavailable state.
    let form = SignupForm::new(None);
    let pages = static_pages(&site, &config.title, &form);
    let writer = Writer {
        renderer: Renderer {
            templates: &templates,
            site_title: &config.title,
            home_page: &config.home_page,
            static_url: &config.static_url,
        },
        output_directory: &config.output_directory,
        theme: config.theme,
    };
    let pages = writer.write_pages(&pages)?;
    log::info!("wrote {} pages", pages);

    let assets = copy_dir(
        &config.static_source_directory,
        &config.output_directory.join(STATIC_SEGMENT),
    )?;
    log::info!("copied {} static assets", assets);

    write_feed(
        FeedConfig {
            title: config.title,
            id: config.home_page.to_string(),
            author: config.author,
            home_page: config.home_page,
        },
        site.blog(),
        File::create(config.output_directory.join(FEED_FILE))?,
    )?;

    Ok(BuildSummary { pages, assets })
}

fn owned_directories() -> Vec<&'static str> {
    let mut dirs: Vec<&'static str> = Category::ALL.iter().map(|c| c.route_segment()).collect();
    dirs.extend_from_slice(&[
        BLOG_INDEX_SEGMENT,
        BLOG_POST_SEGMENT,
        SIGNUP_SEGMENT,
        TOOLS_SEGMENT,
        STATIC_SEGMENT,
    ]);
    dirs
}

/// Copies every file under `src` to the same relative path under `dst`.
/// A missing `src` copies nothing. Returns the number of files copied.
fn copy_dir(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        log::debug!("no static directory at {}", src.display());
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| Error::CopyStatic(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::CopyStatic(e.to_string()))?;
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during loading content,
/// parsing templates, writing, cleaning output directories, copying static
/// assets, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading the content catalogs.
    Content(ContentError),

    /// Returned for errors loading template files.
    Render(RenderError),

    /// Returned for errors writing pages to disk as HTML files.
    Write(WriteError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for errors walking the static directory.
    CopyStatic(String),

    /// Returned for errors writing the feed.
    Feed(FeedError),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Content(err) => err.fmt(f),
            Error::Render(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning '{}': {}", path.display(), err)
            }
            Error::CopyStatic(err) => write!(f, "Copying static files: {}", err),
            Error::Feed(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Content(err) => Some(err),
            Error::Render(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::CopyStatic(_) => None,
            Error::Feed(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ContentError> for Error {
    fn from(err: ContentError) -> Error {
        Error::Content(err)
    }
}

impl From<RenderError> for Error {
    fn from(err: RenderError) -> Error {
        Error::Render(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

fn remove_file(file: &Path) -> Result<()> {
    match std::fs::remove_file(file) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: file.to_owned(),
                err: e,
            }),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_copy_dir() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let src = dir.path().join("static");
        fs::create_dir_all(src.join("css"))?;
        fs::write(src.join("css").join("style.css"), "body {}")?;
        fs::write(src.join("logo.svg"), "<svg/>")?;

        let dst = dir.path().join("out").join("static");
        assert_eq!(2, copy_dir(&src, &dst)?);
        assert_eq!("body {}", fs::read_to_string(dst.join("css").join("style.css"))?);
        assert_eq!(0, copy_dir(&dir.path().join("missing"), &dst)?);
        Ok(())
    }

    #[test]
    fn test_rmdir_missing_is_ok() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        rmdir(&dir.path().join("nope"))?;
        remove_file(&dir.path().join("nope.html"))?;
        Ok(())
    }
}
