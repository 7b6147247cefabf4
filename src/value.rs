//! Conversions from content types into template [`Value`]s. Catalog text is
//! HTML-escaped here, once, so templates can insert every string as-is.

use crate::blog::BlogPost;
use crate::hub::{Category, HubEntry, SubPage};
use crate::tool::Tool;
use crate::markdown::escape;
use gtmpl::Value;
use std::collections::HashMap;

/// Builds a [`Value::Object`] field by field.
#[derive(Default)]
pub struct Object(HashMap<String, Value>);

impl Object {
    pub fn new() -> Object {
        Object::default()
    }

    /// Adds a text field, escaped for HTML.
    pub fn text(mut self, key: &str, text: &str) -> Object {
        self.0.insert(key.to_owned(), Value::String(escape(text)));
        self
    }

    /// Adds a field holding trusted HTML, inserted without escaping.
    pub fn html(mut self, key: &str, html: &str) -> Object {
        self.0.insert(key.to_owned(), Value::String(html.to_owned()));
        self
    }

    /// Adds an optional text field; `None` becomes [`Value::Nil`] so templates
    /// can test it with `{{ if }}`.
    pub fn maybe_text(mut self, key: &str, text: Option<&str>) -> Object {
        let value = match text {
            Some(text) => Value::String(escape(text)),
            None => Value::Nil,
        };
        self.0.insert(key.to_owned(), value);
        self
    }

    pub fn flag(mut self, key: &str, flag: bool) -> Object {
        self.0.insert(key.to_owned(), Value::Bool(flag));
        self
    }

    pub fn value(mut self, key: &str, value: Value) -> Object {
        self.0.insert(key.to_owned(), value);
        self
    }

    pub fn list<I: IntoIterator<Item = Value>>(self, key: &str, items: I) -> Object {
        self.value(key, Value::Array(items.into_iter().collect()))
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Value {
        Value::Object(object.0)
    }
}

/// A listing card for a hub: title, summary and the hub's URL.
pub fn hub_card(category: Category, entry: &HubEntry) -> Value {
    Object::new()
        .text("title", &entry.bundle.title)
        .text("summary", &entry.summary)
        .text("url", &entry.path(category))
        .into()
}

/// A link to one of a hub's sub-pages.
pub fn sub_page_link(category: Category, entry: &HubEntry, sub_page: &SubPage) -> Value {
    Object::new()
        .text("title", &sub_page.title)
        .text("description", &sub_page.description)
        .text("url", &entry.sub_page_path(category, sub_page))
        .into()
}

/// A blog listing card. The post body is left out.
pub fn post_summary(post: &BlogPost) -> Value {
    Object::new()
        .text("id", &post.id.to_string())
        .text("title", &post.title)
        .text("category", &post.category)
        .text("author", &post.author)
        .text("date", &post.date)
        .text("icon", &post.icon)
        .text("url", &post.path())
        .into()
}

/// A free software card. `url` is the vendor's download page, which is
/// external and so never prefixed with the site path.
pub fn tool_card(tool: &Tool) -> Value {
    Object::new()
        .text("name", &tool.name)
        .text("description", &tool.description)
        .text("tag", &tool.tag)
        .text("icon", &tool.icon)
        .text("url", tool.link.as_str())
        .into()
}

/// Reads a string field out of a [`Value::Object`].
pub fn string_field<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    match value {
        Value::Object(fields) => match fields.get(key) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        },
        _ => None,
    }
}

/// Reads an array field out of a [`Value::Object`].
pub fn array_field<'v>(value: &'v Value, key: &str) -> Option<&'v [Value]> {
    match value {
        Value::Object(fields) => match fields.get(key) {
            Some(Value::Array(items)) => Some(items.as_slice()),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hub::ContentBundle;

    #[test]
    fn test_text_is_escaped_and_html_is_not() {
        let value: Value = Object::new()
            .text("title", "Tips & <Tricks>")
            .html("content", "<p>Hi</p>")
            .into();
        assert_eq!(Some("Tips &amp; &lt;Tricks&gt;"), string_field(&value, "title"));
        assert_eq!(Some("<p>Hi</p>"), string_field(&value, "content"));
        assert_eq!(None, string_field(&value, "missing"));
    }

    #[test]
    fn test_hub_card() {
        let entry = HubEntry {
            key: "p2pcloud-crm".to_owned(),
            summary: "Sales & support.".to_owned(),
            bundle: ContentBundle {
                title: "P2PCloud CRM".to_owned(),
                sub_pages: Vec::new(),
            },
        };
        let card = hub_card(Category::Product, &entry);
        assert_eq!(Some("P2PCloud CRM"), string_field(&card, "title"));
        assert_eq!(Some("Sales &amp; support."), string_field(&card, "summary"));
        assert_eq!(Some("/product/p2pcloud-crm/"), string_field(&card, "url"));
    }
}
