//! Support for creating an Atom feed from the blog catalog.

use crate::blog::BlogPost;
use crate::catalog::Catalog;
use crate::config::Author;
use atom_syndication::{Category, Content, Entry, Error as AtomError, Feed, Link, Person};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use std::fmt;
use std::io::Write;
use url::Url;

/// The display format of blog post dates, e.g. `Oct 1, 2025`.
pub const DATE_FORMAT: &str = "%b %d, %Y";

/// Bundled configuration for creating a feed.
pub struct FeedConfig {
    pub title: String,
    pub id: String,
    pub author: Option<Author>,

    /// The site's home page. Post URLs are resolved against it.
    pub home_page: Url,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and the blog
/// catalog and writes the result to a [`std::io::Write`].
pub fn write_feed<W: Write>(config: FeedConfig, posts: &Catalog<BlogPost>, w: W) -> Result<()> {
    feed(config, posts)?.write_to(w)?;
    Ok(())
}

fn feed(config: FeedConfig, posts: &Catalog<BlogPost>) -> Result<Feed> {
    let now: DateTime<FixedOffset> = Utc::now().into();
    let mut link = Link::default();
    link.set_href(config.home_page.to_string());
    link.set_rel("alternate");

    let mut feed = Feed::default();
    feed.set_entries(feed_entries(&config, posts, now)?);
    feed.set_title(config.title.as_str());
    feed.set_id(config.id.as_str());
    feed.set_updated(now);
    feed.set_authors(author_to_people(config.author.as_ref()));
    feed.set_links(vec![link]);
    Ok(feed)
}

fn feed_entries(
    config: &FeedConfig,
    posts: &Catalog<BlogPost>,
    now: DateTime<FixedOffset>,
) -> Result<Vec<Entry>> {
    let mut entries: Vec<Entry> = Vec::with_capacity(posts.len());

    for post in posts {
        let url = config.home_page.join(post.path().trim_start_matches('/'))?;
        let date = match parse_date(&post.date) {
            Some(date) => date,
            None => {
                log::warn!(
                    "blog post {}: can't parse date `{}`; using the build time",
                    post.id,
                    post.date
                );
                now
            }
        };

        let mut link = Link::default();
        link.set_href(url.to_string());
        link.set_rel("alternate");

        let mut content = Content::default();
        content.set_value(post.content.clone());
        content.set_content_type("html".to_owned());

        let mut category = Category::default();
        category.set_term(post.category.as_str());

        // The post's byline wins over the site author.
        let author = match post.author.is_empty() {
            true => author_to_people(config.author.as_ref()),
            false => {
                let mut person = Person::default();
                person.set_name(post.author.as_str());
                vec![person]
            }
        };

        let mut entry = Entry::default();
        entry.set_id(url.to_string());
        entry.set_title(post.title.as_str());
        entry.set_updated(date);
        entry.set_published(date);
        entry.set_authors(author);
        entry.set_links(vec![link]);
        entry.set_categories(vec![category]);
        entry.set_content(content);
        entries.push(entry);
    }
    Ok(entries)
}

/// Parses a display date (`Oct 1, 2025`) as midnight UTC.
pub fn parse_date(date: &str) -> Option<DateTime<FixedOffset>> {
    let naive = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()?;
    let midnight = naive.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight).into())
}

fn author_to_people(author: Option<&Author>) -> Vec<Person> {
    match author {
        Some(author) => {
            let mut person = Person::default();
            person.set_name(author.name.as_str());
            person.set_email(author.email.clone());
            vec![person]
        }
        None => Vec::new(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants inlude I/O, Atom, and URL
/// issues.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when there is an Atom-related error.
    Atom(AtomError),

    /// Returned when a post URL can't be built from the home page.
    Url(url::ParseError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Atom(err) => err.fmt(f),
            Error::Url(err) => write!(f, "Building post URL: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Atom(err) => Some(err),
            Error::Url(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::Url(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Datelike;

    fn post(id: u32, date: &str) -> BlogPost {
        BlogPost {
            id,
            title: format!("Post {}", id),
            category: "Tech Trends".to_owned(),
            author: "P2PClouds Institute".to_owned(),
            date: date.to_owned(),
            content: "<p>Body</p>".to_owned(),
            icon: "Zap".to_owned(),
        }
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("Oct 1, 2025").expect("date should parse");
        assert_eq!((2025, 10, 1), (date.year(), date.month(), date.day()));
        assert_eq!(None, parse_date("someday"));
    }

    #[test]
    fn test_write_feed() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let posts = Catalog::from_entries(vec![post(1, "Oct 1, 2025"), post(2, "soon")])?;
        let config = FeedConfig {
            title: "P2PClouds".to_owned(),
            id: "https://example.org/site/".to_owned(),
            author: None,
            home_page: Url::parse("https://example.org/site/")?,
        };
        let mut out: Vec<u8> = Vec::new();
        write_feed(config, &posts, &mut out)?;
        let xml = String::from_utf8(out)?;
        assert!(xml.contains("https://example.org/site/blogsdetail/1/"));
        assert!(xml.contains("https://example.org/site/blogsdetail/2/"));
        assert!(xml.contains("2025-10-01T00:00:00"));
        assert!(xml.contains("P2PClouds Institute"));
        Ok(())
    }
}
