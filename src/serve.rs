//! Development server. Unlike a build, every request is resolved against the
//! catalogs when it arrives, so unknown keys get their category's not-found
//! page with a 404 status and the signup form accepts POSTs. `?theme=`
//! switches the theme and is remembered in a cookie for later requests.

use crate::config::{Config, SignupBackend};
use crate::content::load_site;
use crate::feed::{write_feed, FeedConfig};
use crate::page::{self, page_for, Page};
use crate::render::{Renderer, Templates};
use crate::route::{site_path, strip_site_path, Route};
use crate::signup::{IdentityService, MemoryIdentityService, SignupForm};
use crate::site::Site;
use crate::theme::Theme;
use anyhow::{anyhow, Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

const HTML: &str = "text/html; charset=utf-8";

const THEME_COOKIE: &str = "theme";

/// Loads the project and serves it until the process is stopped.
pub fn serve_site(config: &Config, interface: IpAddr, port: u16) -> Result<()> {
    let site = load_site(&config.content_directory).context("Loading content")?;
    let templates = Templates::load(&config.templates).context("Loading templates")?;
    let memory = MemoryIdentityService::new();
    let identity: Option<&dyn IdentityService> = match config.signup {
        SignupBackend::Memory => Some(&memory),
        SignupBackend::None => None,
    };
    let app = App::new(config, &site, &templates, identity);

    let (server, addr) = try_bind_port(interface, port, MAX_PORT_RETRIES)?;
    log::info!("serving {} at http://{}", config.title, addr);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(&app, request) {
            log::warn!("request error: {:#}", e);
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log::warn!("port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

fn handle_request(app: &App, mut request: Request) -> Result<()> {
    let mut body = String::new();
    if *request.method() == Method::Post {
        request.as_reader().read_to_string(&mut body)?;
    }
    let method = request.method().clone();
    let url = request.url().to_owned();
    let cookie = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Cookie"))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default();

    let reply = match app.respond(&method, &url, &cookie, &body) {
        Ok(reply) => reply,
        Err(e) => {
            let response =
                Response::from_string("500 Internal Server Error").with_status_code(StatusCode(500));
            request.respond(response)?;
            return Err(e);
        }
    };
    log::info!("{} {} {}", method, url, reply.status);

    let mut response = Response::from_data(reply.body)
        .with_status_code(StatusCode(reply.status))
        .with_header(header("Content-Type", reply.content_type)?);
    if let Some(cookie) = &reply.set_cookie {
        response = response.with_header(header("Set-Cookie", cookie)?);
    }
    request.respond(response)?;
    Ok(())
}

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name, value).map_err(|_| anyhow!("invalid header `{}: {}`", name, value))
}

/// A response, before it is sent.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,

    /// A `Set-Cookie` value, sent when the request chose a theme.
    pub set_cookie: Option<String>,
}

/// Request-time state: the loaded site, its templates and the signup form.
pub struct App<'a> {
    config: &'a Config,
    site: &'a Site,
    renderer: Renderer<'a>,
    form: SignupForm<'a>,
}

impl<'a> App<'a> {
    pub fn new(
        config: &'a Config,
        site: &'a Site,
        templates: &'a Templates,
        identity: Option<&'a dyn IdentityService>,
    ) -> App<'a> {
        App {
            config,
            site,
            renderer: Renderer {
                templates,
                site_title: &config.title,
                home_page: &config.home_page,
                static_url: &config.static_url,
            },
            form: SignupForm::new(identity),
        }
    }

    /// Builds the response for a request. `cookie` is the request's `Cookie`
    /// header, empty when absent. `body` is the request body, read only for
    /// POSTs.
    ///
    /// Request paths include the site's path prefix when `site_root` has one;
    /// paths outside the prefix get the generic not-found page.
    pub fn respond(&self, method: &Method, url: &str, cookie: &str, body: &str) -> Result<Reply> {
        let (path, query) = match url.find('?') {
            Some(i) => (&url[..i], &url[i + 1..]),
            None => (url, ""),
        };
        let (theme, chosen) = self.theme(query, cookie);
        let prefix = site_path(&self.config.home_page);
        let route = match strip_site_path(prefix, path) {
            Some(local) => Route::parse(local),
            None => Route::Unknown(path.to_owned()),
        };
        log::debug!("{} {} -> {:?}", method, url, route);

        let mut reply = match &route {
            Route::Asset(rest) => self.asset(rest, path, theme)?,
            Route::Feed => self.feed()?,
            Route::Signup if *method == Method::Post => {
                let (email, password) = signup_fields(body);
                let outcome = self.form.submit(&email, &password);
                self.page(&page::signup(&self.form, Some(&outcome), &email), path, theme)?
            }
            Route::Unknown(_) => self.page(&page::page_not_found(path), path, theme)?,
            _ => match page_for(self.site, &self.config.title, &self.form, &route) {
                Some(page) => self.page(&page, path, theme)?,
                None => self.page(&page::page_not_found(path), path, theme)?,
            },
        };
        reply.set_cookie = chosen.map(|theme| {
            format!(
                "{}={}; Path={}/; SameSite=Lax",
                THEME_COOKIE, theme, prefix
            )
        });
        Ok(reply)
    }

    /// The theme for a request: `?theme=` first, then the theme cookie, then
    /// the project's theme. The second value is set only when the query chose
    /// the theme, so the choice can be remembered.
    fn theme(&self, query: &str, cookie: &str) -> (Theme, Option<Theme>) {
        let requested = url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "theme")
            .and_then(|(_, value)| parse_theme(&value));
        if let Some(theme) = requested {
            return (theme, Some(theme));
        }
        let remembered = cookie
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == THEME_COOKIE)
            .and_then(|(_, value)| parse_theme(value));
        (remembered.unwrap_or(self.config.theme), None)
    }

    fn page(&self, page: &Page, path: &str, theme: Theme) -> Result<Reply> {
        let toggle = format!("{}?theme={}", path, theme.toggle());
        let html = self.renderer.render_to_string(page, theme, Some(&toggle))?;
        Ok(Reply {
            status: page.status,
            content_type: HTML,
            body: html.into_bytes(),
            set_cookie: None,
        })
    }

    fn asset(&self, rest: &str, path: &str, theme: Theme) -> Result<Reply> {
        let file = match self.asset_file(rest) {
            Some(file) => file,
            None => return self.page(&page::page_not_found(path), path, theme),
        };
        let body = std::fs::read(&file).with_context(|| format!("Reading {}", file.display()))?;
        Ok(Reply {
            status: 200,
            content_type: guess_content_type(&file),
            body,
            set_cookie: None,
        })
    }

    /// Resolves an asset to a file inside the static directory. Links and
    /// `..` are resolved before the check, so nothing outside it is served.
    fn asset_file(&self, rest: &str) -> Option<PathBuf> {
        let root = self.config.static_source_directory.canonicalize().ok()?;
        let file = root.join(rest).canonicalize().ok()?;
        if !file.starts_with(&root) {
            log::warn!("refusing asset outside {}: {}", root.display(), rest);
            return None;
        }
        if file.is_file() {
            Some(file)
        } else {
            None
        }
    }

    fn feed(&self) -> Result<Reply> {
        let mut body: Vec<u8> = Vec::new();
        write_feed(
            FeedConfig {
                title: self.config.title.clone(),
                id: self.config.home_page.to_string(),
                author: self.config.author.clone(),
                home_page: self.config.home_page.clone(),
            },
            self.site.blog(),
            &mut body,
        )
        .map_err(|e| anyhow!("Writing feed: {}", e))?;
        Ok(Reply {
            status: 200,
            content_type: "application/atom+xml; charset=utf-8",
            body,
            set_cookie: None,
        })
    }
}

fn parse_theme(value: &str) -> Option<Theme> {
    match value.parse() {
        Ok(theme) => Some(theme),
        Err(e) => {
            log::debug!("ignoring theme: {}", e);
            None
        }
    }
}

/// Reads `email` and `password` out of a form-encoded body. Missing fields
/// are empty.
fn signup_fields(body: &str) -> (String, String) {
    let mut email = String::new();
    let mut password = String::new();
    for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
        match key.as_ref() {
            "email" => email = value.into_owned(),
            "password" => password = value.into_owned(),
            _ => {}
        }
    }
    (email, password)
}

/// Guess MIME content type from file extension.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => HTML,
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::catalog::Catalog;
    use crate::hub::{ContentBundle, HubEntry};
    use crate::render::TemplatePaths;
    use std::fs;
    use std::path::PathBuf;
    use url::Url;

    struct Fixture {
        _dir: tempfile::TempDir,
        config: Config,
        templates: Templates,
        site: Site,
    }

    fn fixture() -> Result<Fixture> {
        fixture_at("http://localhost:8080/")
    }

    fn fixture_at(home_page: &str) -> Result<Fixture> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("secret.yaml"), "password: hunter2")?;
        let page = dir.path().join("page.html");
        fs::write(&page, "{{ .theme }}|{{ .item.title }}")?;
        let not_found = dir.path().join("not_found.html");
        fs::write(&not_found, "{{ .theme }}|{{ .item.title }}|{{ .item.message }}")?;
        let signup = dir.path().join("signup.html");
        fs::write(
            &signup,
            "{{ .item.button_label }}|{{ if .item.error }}{{ .item.error }}{{ end }}|{{ if .item.success }}{{ .item.success }}{{ end }}",
        )?;
        let static_dir = dir.path().join("static");
        fs::create_dir_all(&static_dir)?;
        fs::write(static_dir.join("style.css"), "body {}")?;

        let layout = vec![page];
        let paths = TemplatePaths {
            home: layout.clone(),
            listing: layout.clone(),
            hub: layout.clone(),
            sub_page: layout.clone(),
            blog_index: layout.clone(),
            blog_post: layout.clone(),
            not_found: vec![not_found],
            signup: vec![signup],
            tools: layout,
        };
        let home_page = Url::parse(home_page)?;
        let config = Config {
            title: "Site".to_owned(),
            author: None,
            static_url: home_page.join("static/")?,
            home_page,
            theme: Theme::Dark,
            signup: SignupBackend::Memory,
            content_directory: PathBuf::from("content"),
            templates: paths.clone(),
            static_source_directory: static_dir,
            output_directory: dir.path().join("out"),
        };
        let site = Site::new(
            Catalog::from_entries(vec![HubEntry {
                key: "cloud-devops".to_owned(),
                summary: String::new(),
                bundle: ContentBundle {
                    title: "Cloud & DevOps".to_owned(),
                    sub_pages: Vec::new(),
                },
            }])?,
            Catalog::empty(),
            Catalog::empty(),
            Catalog::empty(),
        );
        Ok(Fixture {
            templates: Templates::load(&paths)?,
            _dir: dir,
            config,
            site,
        })
    }

    fn get(app: &App, url: &str) -> Result<(u16, String)> {
        let reply = app.respond(&Method::Get, url, "", "")?;
        Ok((reply.status, String::from_utf8(reply.body)?))
    }

    #[test]
    fn test_unknown_key_is_404() -> Result<()> {
        let f = fixture()?;
        let app = App::new(&f.config, &f.site, &f.templates, None);

        let (status, body) = get(&app, "/courses/cloud-devops")?;
        assert_eq!(200, status);
        assert_eq!("theme-dark|Cloud &amp; DevOps", body);

        let (status, body) = get(&app, "/courses/nonexistent-slug")?;
        assert_eq!(404, status);
        assert!(body.starts_with("theme-dark|404 - Course Not Found|"));
        assert!(body.contains("nonexistent-slug"));
        Ok(())
    }

    #[test]
    fn test_theme_query() -> Result<()> {
        let f = fixture()?;
        let app = App::new(&f.config, &f.site, &f.templates, None);
        assert!(get(&app, "/?theme=light")?.1.starts_with("theme-light|"));
        assert!(get(&app, "/?theme=purple")?.1.starts_with("theme-dark|"));
        Ok(())
    }

    #[test]
    fn test_assets() -> Result<()> {
        let f = fixture()?;
        let app = App::new(&f.config, &f.site, &f.templates, None);
        let reply = app.respond(&Method::Get, "/static/style.css", "", "")?;
        assert_eq!(200, reply.status);
        assert_eq!("text/css; charset=utf-8", reply.content_type);
        assert_eq!(b"body {}".to_vec(), reply.body);
        assert_eq!(404, get(&app, "/static/missing.css")?.0);
        assert_eq!(404, get(&app, "/static/../page.html")?.0);
        Ok(())
    }

    #[test]
    fn test_assets_stay_in_static_dir() -> Result<()> {
        let f = fixture()?;
        let app = App::new(&f.config, &f.site, &f.templates, None);
        for url in &[
            "/static/..%2Fsecret.yaml",
            "/static/..%2F..%2Fsecret.yaml",
            "/static/%2E%2E/secret.yaml",
        ] {
            let (status, body) = get(&app, url)?;
            assert_eq!(404, status, "{}", url);
            assert!(!body.contains("hunter2"), "{}", url);
        }
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_asset_link_out_of_static_dir() -> Result<()> {
        let f = fixture()?;
        std::os::unix::fs::symlink(
            f._dir.path().join("secret.yaml"),
            f.config.static_source_directory.join("secret.yaml"),
        )?;
        let app = App::new(&f.config, &f.site, &f.templates, None);
        let (status, body) = get(&app, "/static/secret.yaml")?;
        assert_eq!(404, status);
        assert!(!body.contains("hunter2"));
        Ok(())
    }

    #[test]
    fn test_theme_is_remembered() -> Result<()> {
        let f = fixture()?;
        let app = App::new(&f.config, &f.site, &f.templates, None);

        let reply = app.respond(&Method::Get, "/?theme=light", "", "")?;
        assert_eq!(
            Some("theme=light; Path=/; SameSite=Lax"),
            reply.set_cookie.as_deref()
        );

        let reply = app.respond(&Method::Get, "/courses/cloud-devops", "theme=light", "")?;
        assert_eq!(None, reply.set_cookie);
        assert!(String::from_utf8(reply.body)?.starts_with("theme-light|"));

        let reply = app.respond(&Method::Get, "/?theme=dark", "a=b; theme=light", "")?;
        assert!(String::from_utf8(reply.body)?.starts_with("theme-dark|"));

        let reply = app.respond(&Method::Get, "/", "theme=sepia", "")?;
        assert!(String::from_utf8(reply.body)?.starts_with("theme-dark|"));
        Ok(())
    }

    #[test]
    fn test_site_below_root() -> Result<()> {
        let f = fixture_at("http://localhost:8080/site/")?;
        let app = App::new(&f.config, &f.site, &f.templates, None);
        assert_eq!(200, get(&app, "/site/courses/cloud-devops")?.0);
        assert_eq!(200, get(&app, "/site")?.0);
        assert_eq!(200, get(&app, "/site/static/style.css")?.0);
        assert_eq!(404, get(&app, "/courses/cloud-devops")?.0);
        assert_eq!(404, get(&app, "/sitemap.xml")?.0);

        let reply = app.respond(&Method::Get, "/site/?theme=light", "", "")?;
        assert_eq!(
            Some("theme=light; Path=/site/; SameSite=Lax"),
            reply.set_cookie.as_deref()
        );
        Ok(())
    }

    #[test]
    fn test_feed() -> Result<()> {
        let f = fixture()?;
        let app = App::new(&f.config, &f.site, &f.templates, None);
        let reply = app.respond(&Method::Get, "/feed.atom", "", "")?;
        assert_eq!(200, reply.status);
        assert!(reply.content_type.starts_with("application/atom+xml"));
        Ok(())
    }

    #[test]
    fn test_signup_without_service() -> Result<()> {
        let f = fixture()?;
        let app = App::new(&f.config, &f.site, &f.templates, None);
        assert_eq!("Loading Service...||", get(&app, "/signup/")?.1);
        let reply = app.respond(
            &Method::Post,
            "/signup/",
            "",
            "email=a%40example.com&password=12345678",
        )?;
        assert_eq!(
            "Loading Service...|Authentication service is not ready. Please try again.|",
            String::from_utf8(reply.body)?
        );
        Ok(())
    }

    #[test]
    fn test_signup_with_memory_service() -> Result<()> {
        let f = fixture()?;
        let service = MemoryIdentityService::new();
        let app = App::new(&f.config, &f.site, &f.templates, Some(&service));

        let post = |body: &str| -> Result<String> {
            let reply = app.respond(&Method::Post, "/signup/", "", body)?;
            Ok(String::from_utf8(reply.body)?)
        };
        assert_eq!(
            "Sign Up|Password must be at least 8 characters long.|",
            post("email=a%40example.com&password=short")?
        );
        assert_eq!(
            "Sign Up||Success! Account created for user ID: local-000001.",
            post("email=a%40example.com&password=12345678")?
        );
        assert_eq!(
            "Sign Up|This email address is already in use. Try logging in instead.|",
            post("email=a%40example.com&password=12345678")?
        );
        assert_eq!(1, service.len());
        Ok(())
    }
}
