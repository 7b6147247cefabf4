//! Maps request paths to [`Route`]s and back. The same table drives the
//! development server and the output layout of a build.

use crate::hub::Category;
use std::borrow::Cow;
use url::Url;

pub const BLOG_INDEX_SEGMENT: &str = "blogs";
pub const BLOG_POST_SEGMENT: &str = "blogsdetail";
pub const SIGNUP_SEGMENT: &str = "signup";
pub const TOOLS_SEGMENT: &str = "free-softwares";
pub const STATIC_SEGMENT: &str = "static";
pub const FEED_FILE: &str = "feed.atom";
pub const NOT_FOUND_FILE: &str = "404.html";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Listing(Category),
    Hub { category: Category, key: String },
    SubPage {
        category: Category,
        key: String,
        sub: String,
    },
    BlogIndex,

    /// A blog post, with the id segment as it appeared in the request.
    BlogPost { id: String },
    Signup,
    Tools,

    /// A theme asset, relative to the static directory.
    Asset(String),
    Feed,
    Unknown(String),
}

impl Route {
    /// Parses a request path. The query string is dropped, segments are
    /// percent-decoded and one trailing slash is ignored; the decoded
    /// segments are otherwise kept exactly as requested.
    pub fn parse(path: &str) -> Route {
        let path = path.split('?').next().unwrap_or_default();
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Route::Home;
        }

        let segments: Vec<String> = trimmed.split('/').map(decode).collect();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        match segments.as_slice() {
            [BLOG_INDEX_SEGMENT] => Route::BlogIndex,
            [BLOG_POST_SEGMENT, id] => Route::BlogPost { id: id.to_string() },
            [SIGNUP_SEGMENT] => Route::Signup,
            [TOOLS_SEGMENT] => Route::Tools,
            [FEED_FILE] => Route::Feed,
            [STATIC_SEGMENT, rest @ ..] if !rest.is_empty() && is_safe_asset_path(rest) => {
                Route::Asset(rest.join("/"))
            }
            [segment, rest @ ..] => match (Category::from_route_segment(segment), rest) {
                (Some(category), []) => Route::Listing(category),
                (Some(category), [key]) => Route::Hub {
                    category,
                    key: key.to_string(),
                },
                (Some(category), [key, sub]) => Route::SubPage {
                    category,
                    key: key.to_string(),
                    sub: sub.to_string(),
                },
                _ => Route::Unknown(path.to_owned()),
            },
            [] => Route::Home,
        }
    }

    /// The canonical URL path of the route. Page routes end in a slash.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_owned(),
            Route::Listing(category) => category.listing_path(),
            Route::Hub { category, key } => format!("/{}/{}/", category.route_segment(), key),
            Route::SubPage { category, key, sub } => {
                format!("/{}/{}/{}/", category.route_segment(), key, sub)
            }
            Route::BlogIndex => format!("/{}/", BLOG_INDEX_SEGMENT),
            Route::BlogPost { id } => format!("/{}/{}/", BLOG_POST_SEGMENT, id),
            Route::Signup => format!("/{}/", SIGNUP_SEGMENT),
            Route::Tools => format!("/{}/", TOOLS_SEGMENT),
            Route::Asset(rest) => format!("/{}/{}", STATIC_SEGMENT, rest),
            Route::Feed => format!("/{}", FEED_FILE),
            Route::Unknown(path) => path.clone(),
        }
    }
}

/// Maps a URL path to the file a build writes it to, relative to the output
/// directory: directory paths get an `index.html`.
pub fn output_file(path: &str) -> String {
    let relative = path.trim_start_matches('/');
    if relative.is_empty() || relative.ends_with('/') {
        format!("{}index.html", relative)
    } else {
        relative.to_owned()
    }
}

/// The path prefix of a site whose home page is `home_page`, without the
/// trailing slash: empty for a site at the root of its host, `/docs` for one
/// at `https://example.org/docs/`. Route paths are appended to it to form
/// links.
pub fn site_path(home_page: &Url) -> &str {
    home_page.path().trim_end_matches('/')
}

/// Strips `site_path` from a request path, returning the path relative to the
/// site. Returns `None` for paths outside the site.
pub fn strip_site_path<'p>(site_path: &str, path: &'p str) -> Option<&'p str> {
    match path.strip_prefix(site_path)? {
        "" => Some("/"),
        rest if rest.starts_with('/') => Some(rest),
        _ => None,
    }
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| segment.to_owned())
}

// Checked after decoding, so an encoded separator can't smuggle `..` past it.
fn is_safe_asset_path(segments: &[&str]) -> bool {
    segments.iter().all(|s| {
        !s.is_empty() && *s != "." && *s != ".." && !s.contains('/') && !s.contains('\\')
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn hub(category: Category, key: &str) -> Route {
        Route::Hub {
            category,
            key: key.to_owned(),
        }
    }

    #[test]
    fn test_parse_pages() {
        assert_eq!(Route::Home, Route::parse("/"));
        assert_eq!(Route::Home, Route::parse(""));
        assert_eq!(Route::Listing(Category::Course), Route::parse("/courses/"));
        assert_eq!(Route::Listing(Category::Product), Route::parse("/product"));
        assert_eq!(hub(Category::Course, "cloud-devops"), Route::parse("/courses/cloud-devops"));
        assert_eq!(hub(Category::Document, "reactjs"), Route::parse("/document/reactjs/"));
        assert_eq!(
            Route::SubPage {
                category: Category::Product,
                key: "p2pcloud-crm".to_owned(),
                sub: "pricing".to_owned(),
            },
            Route::parse("/product/p2pcloud-crm/pricing/")
        );
        assert_eq!(Route::BlogIndex, Route::parse("/blogs/"));
        assert_eq!(
            Route::BlogPost { id: "abc".to_owned() },
            Route::parse("/blogsdetail/abc")
        );
        assert_eq!(Route::Signup, Route::parse("/signup?theme=light"));
        assert_eq!(Route::Feed, Route::parse("/feed.atom"));
        assert_eq!(Route::Tools, Route::parse("/free-softwares/"));
        assert_eq!(
            Route::Unknown("/free-softwares/git".to_owned()),
            Route::parse("/free-softwares/git")
        );
    }

    #[test]
    fn test_parse_keeps_key_case_and_decodes() {
        assert_eq!(hub(Category::Course, "Cloud-DevOps"), Route::parse("/courses/Cloud-DevOps"));
        assert_eq!(
            hub(Category::Course, "nonexistent slug"),
            Route::parse("/courses/nonexistent%20slug")
        );
    }

    #[test]
    fn test_parse_assets() {
        assert_eq!(
            Route::Asset("css/style.css".to_owned()),
            Route::parse("/static/css/style.css")
        );
        assert_eq!(
            Route::Unknown("/static/../hubsite.yaml".to_owned()),
            Route::parse("/static/../hubsite.yaml")
        );
        for path in &[
            "/static/..%2F..%2Fhubsite.yaml",
            "/static/css%2F..%2F..%2Fhubsite.yaml",
            "/static/%2E%2E/hubsite.yaml",
            "/static/..%5Chubsite.yaml",
        ] {
            assert_eq!(Route::Unknown(path.to_string()), Route::parse(path), "{}", path);
        }
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(Route::Unknown("/about".to_owned()), Route::parse("/about"));
        assert_eq!(
            Route::Unknown("/courses/a/b/c".to_owned()),
            Route::parse("/courses/a/b/c")
        );
    }

    #[test]
    fn test_path_parses_back() {
        let routes = vec![
            Route::Home,
            Route::Listing(Category::Document),
            hub(Category::Product, "ai-ml-services"),
            Route::SubPage {
                category: Category::Course,
                key: "cloud-devops".to_owned(),
                sub: "iac-terraform".to_owned(),
            },
            Route::BlogIndex,
            Route::BlogPost { id: "3".to_owned() },
            Route::Signup,
            Route::Tools,
            Route::Feed,
        ];
        for route in routes {
            assert_eq!(route, Route::parse(&route.path()));
        }
    }

    #[test]
    fn test_site_path() -> Result<(), url::ParseError> {
        assert_eq!("", site_path(&Url::parse("http://localhost:5277/")?));
        assert_eq!("/site", site_path(&Url::parse("https://example.org/site/")?));

        assert_eq!(Some("/courses/"), strip_site_path("", "/courses/"));
        assert_eq!(Some("/courses/a"), strip_site_path("/site", "/site/courses/a"));
        assert_eq!(Some("/"), strip_site_path("/site", "/site"));
        assert_eq!(Some("/"), strip_site_path("/site", "/site/"));
        assert_eq!(None, strip_site_path("/site", "/sitemap.xml"));
        assert_eq!(None, strip_site_path("/site", "/courses/a"));
        Ok(())
    }

    #[test]
    fn test_output_file() {
        assert_eq!("index.html", output_file("/"));
        assert_eq!("courses/cloud-devops/index.html", output_file("/courses/cloud-devops/"));
        assert_eq!("404.html", output_file("/404.html"));
    }
}
