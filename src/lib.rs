//! The library code for the `hubsite` site generator. A site is a set of
//! content catalogs (course, product and document hubs, the blog and a free
//! software listing) that are rendered to HTML through the project's theme
//! templates. The work breaks down into three steps:
//!
//! 1. Loading the catalogs from the project's content directory
//!    ([`crate::content`]) into a [`crate::site::Site`]
//! 2. Assembling pages from the catalogs ([`crate::page`])
//! 3. Rendering the pages, either all at once to disk ([`crate::build`]) or
//!    one request at a time ([`crate::serve`])
//!
//! Every path maps to a [`crate::route::Route`]. A key that isn't in its
//! category's catalog never fails a request: it resolves to that category's
//! not-found page, which echoes the key back.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod blog;
pub mod build;
pub mod catalog;
pub mod config;
pub mod content;
pub mod feed;
pub mod hub;
pub mod markdown;
pub mod page;
pub mod render;
pub mod route;
pub mod serve;
pub mod signup;
pub mod site;
pub mod theme;
pub mod tool;
mod util;
pub mod value;
pub mod write;
