//! Defines the [`BlogPost`] type and the logic for parsing posts from source
//! files. A source file is YAML frontmatter between `---` fences followed by
//! a markdown body, for example:
//!
//! ```md
//! ---
//! id: 1
//! title: Top AI Chatbot Tools
//! category: Tech Trends
//! author: Editorial Team
//! date: Oct 1, 2025
//! icon: Zap
//! ---
//! # Hello
//!
//! World
//! ```

use crate::catalog::{Catalog, Keyed, Resolution};
use crate::markdown;
use serde::Deserialize;
use std::fmt;

/// A blog post. `content` is HTML produced from the post's markdown body and
/// is inserted into pages without further escaping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlogPost {
    pub id: u32,
    pub title: String,
    pub category: String,
    pub author: String,

    /// The display date, kept as written.
    pub date: String,
    pub content: String,

    /// The symbolic name of the post's icon.
    pub icon: String,
}

impl Keyed for BlogPost {
    type Key = u32;

    fn key(&self) -> &u32 {
        &self.id
    }
}

impl BlogPost {
    /// The URL path of the post's detail page.
    pub fn path(&self) -> String {
        format!("/blogsdetail/{}/", self.id)
    }

    /// Parses a post from the contents of a source file.
    pub fn parse(input: &str) -> Result<BlogPost> {
        fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
            const FENCE: &str = "---";
            if !input.starts_with(FENCE) {
                return Err(Error::FrontmatterMissingStartFence);
            }
            match input[FENCE.len()..].find(FENCE) {
                None => Err(Error::FrontmatterMissingEndFence),
                Some(offset) => Ok((
                    FENCE.len(),                        // yaml_start
                    FENCE.len() + offset,               // yaml_stop
                    FENCE.len() + offset + FENCE.len(), // body_start
                )),
            }
        }

        let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;
        if frontmatter.id == 0 {
            return Err(Error::InvalidId);
        }

        let mut content = String::new();
        markdown::to_html(&mut content, &input[body_start..]);
        Ok(BlogPost {
            id: frontmatter.id,
            title: frontmatter.title,
            category: frontmatter.category,
            author: frontmatter.author,
            date: frontmatter.date,
            content,
            icon: frontmatter.icon,
        })
    }
}

#[derive(Deserialize)]
struct Frontmatter {
    id: u32,
    title: String,

    #[serde(default)]
    category: String,

    #[serde(default)]
    author: String,
    date: String,

    #[serde(default = "default_icon")]
    icon: String,
}

fn default_icon() -> String {
    String::from("FileText")
}

impl Catalog<BlogPost> {
    /// Resolves a post from a routed path segment. Only the canonical decimal
    /// form of a registered id resolves; anything else (non-numeric,
    /// out-of-range, signed or zero-padded) resolves to
    /// [`Resolution::NotFound`] carrying the segment as given.
    pub fn resolve_id(&self, raw: &str) -> Resolution<&BlogPost> {
        let id = raw.parse::<u32>().ok().filter(|id| id.to_string() == raw);
        match id.and_then(|id| self.get(&id)) {
            Some(post) => Resolution::Found(post),
            None => Resolution::NotFound(raw.to_owned()),
        }
    }
}

/// Represents the result of a [`BlogPost`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`BlogPost`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a source file is missing its starting frontmatter fence
    /// (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a source file is missing its terminal frontmatter fence.
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when the frontmatter id is zero.
    InvalidId,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => write!(f, "Post must begin with `---`"),
            Error::FrontmatterMissingEndFence => write!(f, "Missing closing `---`"),
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::InvalidId => write!(f, "Post ids must be positive integers"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DeserializeYaml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SOURCE: &str = "---\n\
id: 1\n\
title: Top AI Chatbot Tools\n\
category: Tech Trends\n\
author: Editorial Team\n\
date: Oct 1, 2025\n\
---\n\
# Overview\n\
\n\
Chatbots are **everywhere**.\n";

    fn post(id: u32) -> BlogPost {
        BlogPost {
            id,
            title: format!("Post {}", id),
            category: String::new(),
            author: String::new(),
            date: String::new(),
            content: String::new(),
            icon: default_icon(),
        }
    }

    #[test]
    fn test_parse() -> Result<()> {
        let post = BlogPost::parse(SOURCE)?;
        assert_eq!(1, post.id);
        assert_eq!("Top AI Chatbot Tools", post.title);
        assert_eq!("Oct 1, 2025", post.date);
        assert_eq!("FileText", post.icon);
        assert!(post.content.contains("<h3>Overview</h3>"));
        assert!(post.content.contains("<strong>everywhere</strong>"));
        assert_eq!("/blogsdetail/1/", post.path());
        Ok(())
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            BlogPost::parse("id: 1\n"),
            Err(Error::FrontmatterMissingStartFence)
        ));
        assert!(matches!(
            BlogPost::parse("---\nid: 1\n"),
            Err(Error::FrontmatterMissingEndFence)
        ));
        assert!(matches!(
            BlogPost::parse("---\nid: 0\ntitle: t\ndate: d\n---\n"),
            Err(Error::InvalidId)
        ));
        assert!(matches!(
            BlogPost::parse("---\nid: abc\ntitle: t\ndate: d\n---\n"),
            Err(Error::DeserializeYaml(_))
        ));
    }

    #[test]
    fn test_resolve_id() {
        let blog = Catalog::from_entries(vec![post(1), post(2)]).unwrap();
        assert_eq!(Some(1), blog.resolve_id("1").found().map(|p| p.id));
        assert_eq!(Resolution::NotFound("abc".to_owned()), blog.resolve_id("abc"));
        assert_eq!(Resolution::NotFound("9999".to_owned()), blog.resolve_id("9999"));
        assert_eq!(Resolution::NotFound("-1".to_owned()), blog.resolve_id("-1"));
        assert_eq!(
            Resolution::NotFound("99999999999999999999".to_owned()),
            blog.resolve_id("99999999999999999999")
        );
        assert_eq!(Resolution::NotFound(String::new()), blog.resolve_id(""));
    }

    #[test]
    fn test_resolve_id_is_canonical() {
        let blog = Catalog::from_entries(vec![post(1)]).unwrap();
        for raw in &["+1", "01", "001", " 1"] {
            assert_eq!(Resolution::NotFound(raw.to_string()), blog.resolve_id(raw));
        }
    }
}
