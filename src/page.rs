//! Assembles [`Page`]s: the template value, output path and status for every
//! kind of page on the site. [`static_pages`] lists what a build writes;
//! [`page_for`] resolves a single [`Route`] at request time.

use crate::blog::BlogPost;
use crate::catalog::Resolution;
use crate::hub::{Category, HubEntry, SubPage};
use crate::route::{Route, NOT_FOUND_FILE};
use crate::signup::{SignupError, SignupForm, SignupSuccess, MIN_PASSWORD_LENGTH};
use crate::site::Site;
use crate::value::{hub_card, post_summary, sub_page_link, tool_card, Object};
use gtmpl::Value;

pub const STATUS_OK: u16 = 200;
pub const STATUS_NOT_FOUND: u16 = 404;

/// Selects the template a page is rendered with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    Home,
    Listing,
    Hub,
    SubPage,
    BlogIndex,
    BlogPost,
    NotFound,
    Signup,
    Tools,
}

/// An output page. `item` is the page's own template value; site-wide values
/// are added when it is rendered.
pub struct Page {
    pub layout: Layout,

    /// The URL path the page is served under.
    pub path: String,

    /// The HTTP status the page is served with.
    pub status: u16,
    pub item: Value,
}

impl Page {
    fn ok(layout: Layout, path: String, item: Value) -> Page {
        Page {
            layout,
            path,
            status: STATUS_OK,
            item,
        }
    }
}

/// The home page: one section of cards per category, then the blog.
pub fn home(site: &Site, title: &str) -> Page {
    let sections = Category::ALL.iter().copied().map(|category| {
        Object::new()
            .text("title", category.listing_title())
            .text("url", &category.listing_path())
            .list(
                "cards",
                site.catalog(category).iter().map(|e| hub_card(category, e)),
            )
            .into()
    });
    Page::ok(
        Layout::Home,
        Route::Home.path(),
        Object::new()
            .text("title", title)
            .list("sections", sections)
            .list("posts", site.blog().iter().map(post_summary))
            .text("blog_url", &Route::BlogIndex.path())
            .into(),
    )
}

/// The listing page for a category: a card per hub.
pub fn listing(site: &Site, category: Category) -> Page {
    let catalog = site.catalog(category);
    Page::ok(
        Layout::Listing,
        category.listing_path(),
        Object::new()
            .text("title", category.listing_title())
            .list("cards", catalog.iter().map(|e| hub_card(category, e)))
            .flag("empty", catalog.is_empty())
            .into(),
    )
}

/// A hub page: the bundle's title and its sub-pages in order.
pub fn hub(category: Category, entry: &HubEntry) -> Page {
    Page::ok(
        Layout::Hub,
        entry.path(category),
        Object::new()
            .text("title", &entry.bundle.title)
            .text("category", category.noun())
            .text(
                "intro",
                &format!(
                    "Your roadmap to mastery in {}.",
                    entry.key.replace('-', " ").to_uppercase()
                ),
            )
            .list(
                "sub_pages",
                entry
                    .bundle
                    .sub_pages
                    .iter()
                    .map(|p| sub_page_link(category, entry, p)),
            )
            .text("back_url", &category.listing_path())
            .text("back_label", &format!("Back to {}", category.listing_title()))
            .into(),
    )
}

/// A hub sub-page: the link's title and description with a way back to the
/// hub.
pub fn sub_page(category: Category, entry: &HubEntry, sub_page: &SubPage) -> Page {
    Page::ok(
        Layout::SubPage,
        entry.sub_page_path(category, sub_page),
        Object::new()
            .text("title", &sub_page.title)
            .text("description", &sub_page.description)
            .text("hub_title", &entry.bundle.title)
            .text("back_url", &entry.path(category))
            .text("back_label", &format!("Back to {}", entry.bundle.title))
            .into(),
    )
}

pub fn blog_index(site: &Site) -> Page {
    Page::ok(
        Layout::BlogIndex,
        Route::BlogIndex.path(),
        Object::new()
            .text("title", "Latest Blogs")
            .list("posts", site.blog().iter().map(post_summary))
            .flag("empty", site.blog().is_empty())
            .into(),
    )
}

pub fn blog_post(post: &BlogPost) -> Page {
    Page::ok(
        Layout::BlogPost,
        post.path(),
        Object::new()
            .text("title", &post.title)
            .text("category", &post.category)
            .text("author", &post.author)
            .text("date", &post.date)
            .text("icon", &post.icon)
            .html("content", &post.content)
            .text("back_url", &Route::BlogIndex.path())
            .text("back_label", "Back to all Blogs")
            .into(),
    )
}

/// The free software listing: a card per tool, each linking to its
/// download page.
pub fn tools(site: &Site) -> Page {
    Page::ok(
        Layout::Tools,
        Route::Tools.path(),
        Object::new()
            .text("title", "Free Software & Developer Stack")
            .text(
                "intro",
                "Your journey starts with the right setup. Download these free tools to begin learning and building.",
            )
            .list("tools", site.tools().iter().map(tool_card))
            .flag("empty", site.tools().is_empty())
            .text("note", "All links point to official vendor download sites.")
            .into(),
    )
}

/// The fallback for a hub key that isn't in its category. `key` is echoed.
pub fn hub_not_found(category: Category, key: &str) -> Page {
    not_found(
        Route::Hub {
            category,
            key: key.to_owned(),
        }
        .path(),
        &category.not_found_heading(),
        &category.not_found_message(key),
        &category.listing_path(),
        category.back_label(),
    )
}

/// The fallback for a sub-page slug that isn't in its hub.
pub fn sub_page_not_found(category: Category, entry: &HubEntry, sub: &str) -> Page {
    not_found(
        Route::SubPage {
            category,
            key: entry.key.clone(),
            sub: sub.to_owned(),
        }
        .path(),
        "404 - Page Not Found",
        &format!("`{}` is not a part of {}.", sub, entry.bundle.title),
        &entry.path(category),
        &format!("Back to {}", entry.bundle.title),
    )
}

/// The fallback for a blog id that doesn't resolve. `id` is echoed.
pub fn blog_not_found(id: &str) -> Page {
    not_found(
        Route::BlogPost { id: id.to_owned() }.path(),
        "404 - Blog Post Not Found",
        &format!(
            "The article you are looking for does not exist or the ID is invalid. ID: {}",
            id
        ),
        &Route::Home.path(),
        "Go back to the homepage",
    )
}

/// The fallback for any path outside the route table.
pub fn page_not_found(path: &str) -> Page {
    not_found(
        path.to_owned(),
        "404 - Page Not Found",
        &format!("The page `{}` does not exist.", path),
        &Route::Home.path(),
        "Go back to the homepage",
    )
}

fn not_found(
    path: String,
    heading: &str,
    message: &str,
    back_url: &str,
    back_label: &str,
) -> Page {
    Page {
        layout: Layout::NotFound,
        path,
        status: STATUS_NOT_FOUND,
        item: Object::new()
            .text("title", heading)
            .text("message", message)
            .text("back_url", back_url)
            .text("back_label", back_label)
            .into(),
    }
}

/// The signup page. `outcome` is the result of the submission that produced
/// this page, if any; `email` refills the field after a failed submission.
pub fn signup(
    form: &SignupForm,
    outcome: Option<&Result<SignupSuccess, SignupError>>,
    email: &str,
) -> Page {
    let (error, success, email) = match outcome {
        None => (None, None, email),
        Some(Ok(success)) => (None, Some(success.to_string()), ""),
        Some(Err(err)) => (Some(err.to_string()), None, email),
    };
    Page::ok(
        Layout::Signup,
        Route::Signup.path(),
        Object::new()
            .text("title", "Create Your Account")
            .text("subtitle", "Start your journey with us today.")
            .text("action", &Route::Signup.path())
            .text("email", email)
            .text("min_length", &MIN_PASSWORD_LENGTH.to_string())
            .text("button_label", form.button_label())
            .flag("disabled", form.is_disabled())
            .maybe_text("error", error.as_deref())
            .maybe_text("success", success.as_deref())
            .into(),
    )
}

/// Every page a build writes, in a stable order. Hub, sub-page and blog pages
/// are enumerated from the catalogs' keys.
pub fn static_pages(site: &Site, title: &str, form: &SignupForm) -> Vec<Page> {
    let mut pages = vec![
        home(site, title),
        blog_index(site),
        signup(form, None, ""),
        tools(site),
    ];

    for category in Category::ALL.iter().copied() {
        pages.push(listing(site, category));
        for key in site.list_keys(category) {
            if let Resolution::Found(entry) = site.resolve_entry(category, &key) {
                pages.push(hub(category, entry));
                for p in &entry.bundle.sub_pages {
                    pages.push(sub_page(category, entry, p));
                }
            }
        }
    }

    for id in site.list_blog_ids() {
        if let Resolution::Found(post) = site.resolve_blog_post(&id) {
            pages.push(blog_post(post));
        }
    }

    let mut fallback = page_not_found("/");
    fallback.path = format!("/{}", NOT_FOUND_FILE);
    pages.push(fallback);
    pages
}

/// Resolves a request-time route to its page. Every miss yields the not-found
/// page for its category. Returns `None` for routes that aren't pages
/// (assets and the feed).
pub fn page_for(site: &Site, title: &str, form: &SignupForm, route: &Route) -> Option<Page> {
    Some(match route {
        Route::Home => home(site, title),
        Route::Listing(category) => listing(site, *category),
        Route::Hub { category, key } => match site.resolve_entry(*category, key) {
            Resolution::Found(entry) => hub(*category, entry),
            Resolution::NotFound(key) => hub_not_found(*category, &key),
        },
        Route::SubPage { category, key, sub } => match site.resolve_entry(*category, key) {
            Resolution::Found(entry) => match entry.bundle.sub_page(sub) {
                Some(p) => sub_page(*category, entry, p),
                None => sub_page_not_found(*category, entry, sub),
            },
            Resolution::NotFound(key) => hub_not_found(*category, &key),
        },
        Route::BlogIndex => blog_index(site),
        Route::BlogPost { id } => match site.resolve_blog_post(id) {
            Resolution::Found(post) => blog_post(post),
            Resolution::NotFound(id) => blog_not_found(&id),
        },
        Route::Signup => signup(form, None, ""),
        Route::Tools => tools(site),
        Route::Unknown(path) => page_not_found(path),
        Route::Asset(_) | Route::Feed => return None,
    })
}
