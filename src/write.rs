//! Writes rendered [`Page`]s to disk under the output directory.

use crate::page::Page;
use crate::render::{Error as RenderError, Renderer};
use crate::route::output_file;
use crate::theme::Theme;
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Responsible for templating pages and writing them to disk.
pub struct Writer<'a> {
    pub renderer: Renderer<'a>,

    /// The directory pages are written under. A page at URL path `/a/b/` is
    /// written to `{output_directory}/a/b/index.html`.
    pub output_directory: &'a Path,

    /// The theme every written page is rendered with.
    pub theme: Theme,
}

impl Writer<'_> {
    /// Returns the file a page is written to.
    pub fn file_path(&self, page: &Page) -> PathBuf {
        self.output_directory.join(output_file(&page.path))
    }

    /// Takes a single [`Page`], templates it, and writes it to disk.
    fn write_page(&self, page: &Page, file_path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(file_path)?;
        self.renderer.render(page, self.theme, None, &mut file)?;
        Ok(())
    }

    /// Writes every page, creating directories as needed. Returns the number
    /// of pages written.
    pub fn write_pages(&self, pages: &[Page]) -> Result<usize> {
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        for page in pages {
            let file_path = self.file_path(page);
            if let Some(dir) = file_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir)?;
                }
            }
            log::debug!("writing {} to {}", page.path, file_path.display());
            self.write_page(page, &file_path)?;
        }
        Ok(pages.len())
    }
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Render(RenderError),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<RenderError> for Error {
    fn from(err: RenderError) -> Error {
        Error::Render(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Render(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Render(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::page;
    use crate::render::{TemplatePaths, Templates};
    use url::Url;

    #[test]
    fn test_write_pages() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let template = dir.path().join("page.html");
        std::fs::write(&template, "{{ .item.title }}")?;
        let layout = vec![template];
        let templates = Templates::load(&TemplatePaths {
            home: layout.clone(),
            listing: layout.clone(),
            hub: layout.clone(),
            sub_page: layout.clone(),
            blog_index: layout.clone(),
            blog_post: layout.clone(),
            not_found: layout.clone(),
            signup: layout.clone(),
            tools: layout,
        })?;
        let home_page = Url::parse("http://localhost/")?;
        let output = dir.path().join("out");
        let writer = Writer {
            renderer: Renderer {
                templates: &templates,
                site_title: "Site",
                home_page: &home_page,
                static_url: &home_page,
            },
            output_directory: &output,
            theme: Theme::Dark,
        };

        let site = crate::site::Site::empty();
        let pages = vec![page::blog_index(&site), page::blog_not_found("7")];
        assert_eq!(2, writer.write_pages(&pages)?);
        assert_eq!(
            "Latest Blogs",
            std::fs::read_to_string(output.join("blogs/index.html"))?
        );
        assert_eq!(
            "404 - Blog Post Not Found",
            std::fs::read_to_string(output.join("blogsdetail/7/index.html"))?
        );
        Ok(())
    }
}
