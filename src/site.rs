//! Defines [`Site`], which owns every content catalog and answers the two
//! questions pages ask of it: which keys exist in a category, and what a key
//! resolves to.

use crate::blog::BlogPost;
use crate::catalog::{Catalog, Resolution};
use crate::hub::{Category, ContentBundle, HubEntry};
use crate::tool::Tool;

/// The loaded content of a site. Built once, then only read.
#[derive(Debug)]
pub struct Site {
    courses: Catalog<HubEntry>,
    products: Catalog<HubEntry>,
    documents: Catalog<HubEntry>,
    blog: Catalog<BlogPost>,
    tools: Catalog<Tool>,
}

impl Site {
    pub fn new(
        courses: Catalog<HubEntry>,
        products: Catalog<HubEntry>,
        documents: Catalog<HubEntry>,
        blog: Catalog<BlogPost>,
    ) -> Site {
        Site {
            courses,
            products,
            documents,
            blog,
            tools: Catalog::empty(),
        }
    }

    /// Replaces the free software listing.
    pub fn with_tools(self, tools: Catalog<Tool>) -> Site {
        Site { tools, ..self }
    }

    /// A site with no content at all.
    pub fn empty() -> Site {
        Site::new(
            Catalog::empty(),
            Catalog::empty(),
            Catalog::empty(),
            Catalog::empty(),
        )
    }

    pub fn catalog(&self, category: Category) -> &Catalog<HubEntry> {
        match category {
            Category::Course => &self.courses,
            Category::Product => &self.products,
            Category::Document => &self.documents,
        }
    }

    pub fn blog(&self) -> &Catalog<BlogPost> {
        &self.blog
    }

    pub fn tools(&self) -> &Catalog<Tool> {
        &self.tools
    }

    /// Returns every key registered for `category`, in content order.
    pub fn list_keys(&self, category: Category) -> Vec<String> {
        self.catalog(category).list_keys()
    }

    /// Resolves a hub key within `category` to its bundle.
    pub fn resolve(&self, category: Category, key: &str) -> Resolution<&ContentBundle> {
        self.resolve_entry(category, key).map(|entry| &entry.bundle)
    }

    /// Like [`Site::resolve`], but returns the whole [`HubEntry`].
    pub fn resolve_entry(&self, category: Category, key: &str) -> Resolution<&HubEntry> {
        self.catalog(category).resolve(key)
    }

    /// Returns every blog post id, stringified, in ascending order.
    pub fn list_blog_ids(&self) -> Vec<String> {
        self.blog.list_keys()
    }

    /// Resolves a blog post from a routed path segment.
    pub fn resolve_blog_post(&self, raw: &str) -> Resolution<&BlogPost> {
        self.blog.resolve_id(raw)
    }
}
