//! Defines [`Tool`], one entry of the free software listing. Tools are not
//! hubs: they have no page of their own and link out to the vendor's
//! download page instead.

use crate::catalog::Keyed;
use crate::hub::{is_slug, InvalidEntry};
use serde::Deserialize;
use url::Url;

/// A downloadable tool, as listed in `tools.yaml`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Tool {
    pub slug: String,
    pub name: String,
    pub description: String,

    /// A short label such as "Code Editor".
    pub tag: String,

    /// The official download page.
    pub link: Url,

    /// The symbolic name of the tool's icon.
    #[serde(default = "default_icon")]
    pub icon: String,
}

fn default_icon() -> String {
    String::from("DownloadCloud")
}

impl Keyed for Tool {
    type Key = String;

    fn key(&self) -> &String {
        &self.slug
    }
}

impl Tool {
    /// Checks that the slug is in slug form and that the link is a web link.
    pub fn validate(&self) -> Result<(), InvalidEntry> {
        if !is_slug(&self.slug) {
            return Err(InvalidEntry::NotASlug(self.slug.clone()));
        }
        match self.link.scheme() {
            "http" | "https" => Ok(()),
            _ => Err(InvalidEntry::NotAWebLink {
                key: self.slug.clone(),
                link: self.link.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deserialize_tool() -> Result<(), serde_yaml::Error> {
        let tool: Tool = serde_yaml::from_str(
            "slug: git\n\
             name: Git\n\
             description: Version control.\n\
             tag: Version Control\n\
             link: https://git-scm.com/downloads\n",
        )?;
        assert_eq!("git", tool.key());
        assert_eq!("https://git-scm.com/downloads", tool.link.as_str());
        assert_eq!("DownloadCloud", tool.icon);
        assert_eq!(Ok(()), tool.validate());
        Ok(())
    }

    #[test]
    fn test_validate() -> Result<(), url::ParseError> {
        let tool = Tool {
            slug: "vs-code".to_owned(),
            name: "VS Code".to_owned(),
            description: String::new(),
            tag: "Code Editor".to_owned(),
            link: Url::parse("ftp://example.org/vscode")?,
            icon: default_icon(),
        };
        assert_eq!(
            Err(InvalidEntry::NotAWebLink {
                key: "vs-code".to_owned(),
                link: "ftp://example.org/vscode".to_owned(),
            }),
            tool.validate()
        );
        let tool = Tool {
            slug: "VS Code".to_owned(),
            ..tool
        };
        assert_eq!(
            Err(InvalidEntry::NotASlug("VS Code".to_owned())),
            tool.validate()
        );
        Ok(())
    }
}
