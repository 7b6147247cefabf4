//! Defines the hub content types: [`HubEntry`] (one routable course, product
//! or document), its [`ContentBundle`] and the [`Category`] it belongs to.

use crate::catalog::Keyed;
use serde::Deserialize;
use std::fmt;

/// The hub categories. Each category is served under its own route segment
/// and has its own not-found wording.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Course,
    Product,
    Document,
}

impl Category {
    /// All categories, in navigation order.
    pub const ALL: [Category; 3] = [Category::Course, Category::Product, Category::Document];

    /// The first path segment for the category's routes, e.g. `/courses/{slug}`.
    pub fn route_segment(self) -> &'static str {
        match self {
            Category::Course => "courses",
            Category::Product => "product",
            Category::Document => "document",
        }
    }

    /// Looks up a category by its route segment.
    pub fn from_route_segment(segment: &str) -> Option<Category> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.route_segment() == segment)
    }

    /// The name of the content file the category is loaded from, relative to
    /// the content directory.
    pub fn content_file(self) -> &'static str {
        match self {
            Category::Course => "courses.yaml",
            Category::Product => "products.yaml",
            Category::Document => "documents.yaml",
        }
    }

    /// The singular display noun ("Course", "Product", "Document").
    pub fn noun(self) -> &'static str {
        match self {
            Category::Course => "Course",
            Category::Product => "Product",
            Category::Document => "Document",
        }
    }

    /// The heading of the category's listing page.
    pub fn listing_title(self) -> &'static str {
        match self {
            Category::Course => "Course Categories",
            Category::Product => "Products",
            Category::Document => "Tech Library",
        }
    }

    pub fn not_found_heading(self) -> String {
        format!("404 - {} Not Found", self.noun())
    }

    /// The explanation shown on the not-found view. `key` is echoed verbatim;
    /// escaping is left to the renderer.
    pub fn not_found_message(self, key: &str) -> String {
        match self {
            Category::Course => format!(
                "The course slug `{}` does not match any available course hub data.",
                key
            ),
            Category::Product => format!(
                "The product slug `{}` does not match any available product documentation.",
                key
            ),
            Category::Document => format!(
                "The document slug `{}` does not match any available documentation hub.",
                key
            ),
        }
    }

    /// The label of the not-found view's link back to the listing page.
    pub fn back_label(self) -> &'static str {
        match self {
            Category::Course => "Go Back to Course Categories",
            Category::Product => "Go Back to Product List",
            Category::Document => "Go Back to Tech Library",
        }
    }

    /// The URL path of the category's listing page.
    pub fn listing_path(self) -> String {
        format!("/{}/", self.route_segment())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.route_segment())
    }
}

/// One link on a hub page.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SubPage {
    pub title: String,
    pub description: String,
    pub slug: String,
}

/// The content of a hub page: a title and its sub-pages in display order.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ContentBundle {
    pub title: String,

    #[serde(default)]
    pub sub_pages: Vec<SubPage>,
}

impl ContentBundle {
    pub fn sub_page(&self, slug: &str) -> Option<&SubPage> {
        self.sub_pages.iter().find(|p| p.slug == slug)
    }
}

/// A routable hub: the key it is served under, a short summary for listing
/// cards, and the bundle rendered on the hub page.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct HubEntry {
    #[serde(rename = "slug")]
    pub key: String,

    #[serde(default)]
    pub summary: String,

    #[serde(flatten)]
    pub bundle: ContentBundle,
}

impl Keyed for HubEntry {
    type Key = String;

    fn key(&self) -> &String {
        &self.key
    }
}

impl HubEntry {
    /// The URL path of the hub page.
    pub fn path(&self, category: Category) -> String {
        format!("/{}/{}/", category.route_segment(), self.key)
    }

    /// The URL path of one of the hub's sub-pages.
    pub fn sub_page_path(&self, category: Category, sub_page: &SubPage) -> String {
        format!(
            "/{}/{}/{}/",
            category.route_segment(),
            self.key,
            sub_page.slug
        )
    }

    /// Checks that the key and sub-page slugs are URL-safe slugs and that no
    /// sub-page slug appears twice.
    pub fn validate(&self) -> Result<(), InvalidEntry> {
        if !is_slug(&self.key) {
            return Err(InvalidEntry::NotASlug(self.key.clone()));
        }
        let mut seen = std::collections::HashSet::new();
        for sub_page in &self.bundle.sub_pages {
            if !is_slug(&sub_page.slug) {
                return Err(InvalidEntry::NotASlug(sub_page.slug.clone()));
            }
            if !seen.insert(sub_page.slug.as_str()) {
                return Err(InvalidEntry::DuplicateSubPage {
                    key: self.key.clone(),
                    slug: sub_page.slug.clone(),
                });
            }
        }
        Ok(())
    }
}

pub(crate) fn is_slug(s: &str) -> bool {
    !s.is_empty() && slug::slugify(s) == s
}

/// Returned when a catalog entry fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidEntry {
    /// A key or sub-page slug is not already in slug form.
    NotASlug(String),

    /// A bundle lists the same sub-page slug twice.
    DuplicateSubPage { key: String, slug: String },

    /// A tool's download link isn't an `http` or `https` URL.
    NotAWebLink { key: String, link: String },
}

impl fmt::Display for InvalidEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InvalidEntry::NotASlug(s) => write!(f, "`{}` is not a valid slug", s),
            InvalidEntry::DuplicateSubPage { key, slug } => {
                write!(f, "hub `{}` lists sub-page `{}` twice", key, slug)
            }
            InvalidEntry::NotAWebLink { key, link } => {
                write!(f, "tool `{}` links to `{}`, which is not a web page", key, link)
            }
        }
    }
}

impl std::error::Error for InvalidEntry {}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(key: &str, slugs: &[&str]) -> HubEntry {
        HubEntry {
            key: key.to_owned(),
            summary: String::new(),
            bundle: ContentBundle {
                title: "Title".to_owned(),
                sub_pages: slugs
                    .iter()
                    .map(|s| SubPage {
                        title: s.to_uppercase(),
                        description: String::new(),
                        slug: s.to_string(),
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn test_deserialize_entry() -> Result<(), serde_yaml::Error> {
        let entry: HubEntry = serde_yaml::from_str(
            "slug: cloud-devops\n\
             title: Cloud\n\
             summary: Master the cloud.\n\
             sub_pages:\n  \
               - title: One\n    description: First\n    slug: one\n  \
               - title: Two\n    description: Second\n    slug: two\n",
        )?;
        assert_eq!("cloud-devops", entry.key);
        assert_eq!("Cloud", entry.bundle.title);
        assert_eq!("Master the cloud.", entry.summary);
        assert_eq!(
            vec!["one", "two"],
            entry
                .bundle
                .sub_pages
                .iter()
                .map(|p| p.slug.as_str())
                .collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn test_paths() {
        let e = entry("cloud-devops", &["iac-terraform"]);
        assert_eq!("/courses/cloud-devops/", e.path(Category::Course));
        assert_eq!(
            "/product/cloud-devops/iac-terraform/",
            e.sub_page_path(Category::Product, &e.bundle.sub_pages[0])
        );
    }

    #[test]
    fn test_validate() {
        assert_eq!(Ok(()), entry("cloud-devops", &["a", "b"]).validate());
        assert_eq!(
            Err(InvalidEntry::NotASlug("Cloud DevOps".to_owned())),
            entry("Cloud DevOps", &[]).validate()
        );
        assert_eq!(
            Err(InvalidEntry::NotASlug("Bad Slug".to_owned())),
            entry("ok", &["Bad Slug"]).validate()
        );
        assert_eq!(
            Err(InvalidEntry::DuplicateSubPage {
                key: "ok".to_owned(),
                slug: "a".to_owned(),
            }),
            entry("ok", &["a", "b", "a"]).validate()
        );
    }

    #[test]
    fn test_route_segments_round_trip() {
        for category in Category::ALL.iter().copied() {
            assert_eq!(
                Some(category),
                Category::from_route_segment(category.route_segment())
            );
        }
        assert_eq!(None, Category::from_route_segment("blogs"));
    }

    #[test]
    fn test_not_found_wording() {
        assert_eq!("404 - Course Not Found", Category::Course.not_found_heading());
        assert!(Category::Document
            .not_found_message("nonexistent-slug")
            .contains("`nonexistent-slug`"));
    }
}
