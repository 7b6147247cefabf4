//! Loads the theme's templates and renders [`Page`]s through them.

use crate::page::{Layout, Page};
use crate::route::site_path;
use crate::theme::Theme;
use gtmpl::{Template, Value};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use url::Url;

/// The template files for each layout. Each list is joined in order and
/// parsed as a single template, so a layout is typically a shared header
/// fragment, its own body and a shared footer.
#[derive(Clone, Debug, Default)]
pub struct TemplatePaths {
    pub home: Vec<PathBuf>,
    pub listing: Vec<PathBuf>,
    pub hub: Vec<PathBuf>,
    pub sub_page: Vec<PathBuf>,
    pub blog_index: Vec<PathBuf>,
    pub blog_post: Vec<PathBuf>,
    pub not_found: Vec<PathBuf>,
    pub signup: Vec<PathBuf>,
    pub tools: Vec<PathBuf>,
}

/// One parsed template per [`Layout`].
pub struct Templates {
    home: Template,
    listing: Template,
    hub: Template,
    sub_page: Template,
    blog_index: Template,
    blog_post: Template,
    not_found: Template,
    signup: Template,
    tools: Template,
}

impl Templates {
    pub fn load(paths: &TemplatePaths) -> Result<Templates> {
        Ok(Templates {
            home: parse_template(paths.home.iter())?,
            listing: parse_template(paths.listing.iter())?,
            hub: parse_template(paths.hub.iter())?,
            sub_page: parse_template(paths.sub_page.iter())?,
            blog_index: parse_template(paths.blog_index.iter())?,
            blog_post: parse_template(paths.blog_post.iter())?,
            not_found: parse_template(paths.not_found.iter())?,
            signup: parse_template(paths.signup.iter())?,
            tools: parse_template(paths.tools.iter())?,
        })
    }

    pub fn get(&self, layout: Layout) -> &Template {
        match layout {
            Layout::Home => &self.home,
            Layout::Listing => &self.listing,
            Layout::Hub => &self.hub,
            Layout::SubPage => &self.sub_page,
            Layout::BlogIndex => &self.blog_index,
            Layout::BlogPost => &self.blog_post,
            Layout::NotFound => &self.not_found,
            Layout::Signup => &self.signup,
            Layout::Tools => &self.tools,
        }
    }
}

// Loads the template file contents, joins them with a single space and parses
// the result into a template. Nothing is added after the last file.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for (i, template_file) in template_files.enumerate() {
        use std::io::Read;
        if i > 0 {
            contents.push(' ');
        }
        let template_file = template_file.as_ref();
        File::open(&template_file)
            .and_then(|mut f| f.read_to_string(&mut contents))
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?;
    }

    let mut template = Template::default();
    template
        .parse(&contents)
        .map_err(|e| Error::ParseTemplate(e.to_string()))?;
    Ok(template)
}

/// Renders pages with the site-wide values every template can rely on:
/// `site_title`, `home_page`, `site_path`, `static_url`, `theme` and
/// `theme_toggle`. The page's own value is available as `item`.
///
/// Link fields in `item` hold route paths such as `/courses/cloud-devops/`.
/// Templates prefix them with `site_path` (`$.site_path` inside a `range`) so
/// that a site served below the root of its host links correctly.
pub struct Renderer<'a> {
    pub templates: &'a Templates,
    pub site_title: &'a str,
    pub home_page: &'a Url,
    pub static_url: &'a Url,
}

impl Renderer<'_> {
    /// Renders `page` into `w`. `theme_toggle` is the URL that shows the
    /// same page in the other theme, when there is one.
    pub fn render<W: Write>(
        &self,
        page: &Page,
        theme: Theme,
        theme_toggle: Option<&str>,
        w: &mut W,
    ) -> Result<()> {
        use std::collections::HashMap;

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("item".to_owned(), page.item.clone());
        m.insert(
            "site_title".to_owned(),
            Value::String(crate::markdown::escape(self.site_title)),
        );
        m.insert(
            "home_page".to_owned(),
            Value::String(self.home_page.to_string()),
        );
        m.insert(
            "site_path".to_owned(),
            Value::String(site_path(self.home_page).to_owned()),
        );
        m.insert(
            "static_url".to_owned(),
            Value::String(self.static_url.to_string()),
        );
        m.insert("theme".to_owned(), Value::String(theme.css_class()));
        m.insert(
            "theme_toggle".to_owned(),
            match theme_toggle {
                Some(url) => Value::String(crate::markdown::escape(url)),
                None => Value::Nil,
            },
        );

        let context =
            gtmpl::Context::from(Value::Object(m)).map_err(|e| Error::Template(e.to_string()))?;
        self.templates
            .get(page.layout)
            .execute(w, &context)
            .map_err(|e| Error::Template(e.to_string()))
    }

    /// Renders `page` into a string, for responses built in memory.
    pub fn render_to_string(
        &self,
        page: &Page,
        theme: Theme,
        theme_toggle: Option<&str>,
    ) -> Result<String> {
        let mut buf: Vec<u8> = Vec::new();
        self.render(page, theme, theme_toggle, &mut buf)?;
        String::from_utf8(buf).map_err(|e| Error::Template(e.to_string()))
    }
}

/// The result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading or executing templates.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while opening or reading template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors executing a template.
    Template(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => write!(f, "Parsing template: {}", err),
            Error::Template(err) => write!(f, "Executing template: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Template(_) => None,
        }
    }
}
