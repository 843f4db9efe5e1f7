//! Preview server.
//!
//! A lightweight HTTP server built on `tiny_http` exposing the routes this
//! tool owns plus rendered page previews:
//!
//! - `GET /sitemap.xml` - generated sitemap (404 when disabled)
//! - `GET /robots.txt`  - filtered robots.txt text
//! - `GET /`            - home preview with the injected head block
//! - `GET /<id>`        - single-item preview with head block and JSON-LD
//!
//! Each request reads the settings through a fresh store instance, so the
//! read-through cache is scoped to one request/response cycle.

use crate::{
    config::SiteConfig,
    content::{ContentItem, ContentSource, export::ExportSource},
    generator::{SitemapError, build_sitemap},
    log,
    meta::{RenderContext, filter_robots, head_block, render::html_escape, resolve},
    settings::{Settings, default_robots, store::JsonStore},
    utils::xml::inject_head,
};
use anyhow::{Context, Result};
use std::{net::SocketAddr, sync::Arc};
use tiny_http::{Header, Request, Response, Server, StatusCode};

// ============================================================================
// Constants
// ============================================================================

/// Preview page HTML template (embedded at compile time)
const PREVIEW_TEMPLATE: &str = include_str!("embed/preview.html");

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the preview server.
///
/// Binds to the configured interface and port (with auto-retry on port
/// conflict), sets up a Ctrl+C handler for graceful shutdown, then handles
/// requests until interrupted.
pub fn serve_site(config: &SiteConfig) -> Result<()> {
    let interface: std::net::IpAddr = config.serve.interface.parse()?;
    let base_port = config.serve.port;

    let (server, addr) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    // Set up Ctrl+C handler for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    // Handle requests in main thread (blocks until Ctrl+C)
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, config) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: std::net::IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < max_retries => {
                // Will retry silently
                continue;
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    max_retries,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

// ============================================================================
// Request Handling
// ============================================================================

/// Handle a single HTTP request.
fn handle_request(request: Request, config: &SiteConfig) -> Result<()> {
    // Decode URL-encoded characters (e.g., %20 → space)
    let url_path = urlencoding::decode(request.url())
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    // Strip query string before resolving the route
    let path = url_path.split('?').next().unwrap_or(&url_path);
    let path = path.trim_matches('/');

    // Per-request settings snapshot through a fresh store instance
    let store = JsonStore::new(&config.data.settings);
    let settings = Settings::load(&store, &config.site);

    match path {
        "sitemap.xml" => serve_sitemap(request, config, &settings),
        "robots.txt" => {
            let upstream = default_robots(&config.site);
            let body = filter_robots(&settings.robots_txt, &upstream).to_string();
            serve_text(request, "text/plain; charset=utf-8", body)
        }
        "" => serve_preview(request, config, &settings, None),
        _ => match path.parse::<u64>() {
            Ok(id) => serve_preview(request, config, &settings, Some(id)),
            Err(_) => serve_not_found(request),
        },
    }
}

/// Serve the generated sitemap, or the disabled/failure responses.
fn serve_sitemap(request: Request, config: &SiteConfig, settings: &Settings) -> Result<()> {
    let source = match ExportSource::from_path(&config.data.content) {
        Ok(source) => source,
        Err(err) => {
            log!("error"; "content source unavailable: {err}");
            return serve_status(request, 500, "sitemap generation failed");
        }
    };

    match build_sitemap(settings, &config.site, &source) {
        Ok(xml) => serve_text(request, "application/xml; charset=utf-8", xml),
        Err(SitemapError::Disabled) => serve_status(request, 404, "Sitemap is disabled"),
        Err(err @ SitemapError::Content(_)) => {
            log!("error"; "{err}");
            serve_status(request, 500, "sitemap generation failed")
        }
    }
}

/// Serve a preview page with the resolved head block injected.
fn serve_preview(
    request: Request,
    config: &SiteConfig,
    settings: &Settings,
    id: Option<u64>,
) -> Result<()> {
    let source = match ExportSource::from_path(&config.data.content) {
        Ok(source) => source,
        Err(err) => {
            log!("error"; "content source unavailable: {err}");
            return serve_status(request, 500, "content source unavailable");
        }
    };

    let html = match id {
        None => {
            let items = source.published_items();
            let meta = resolve(&RenderContext::Home, settings, &config.site);
            render_preview(
                &config.site.language,
                &config.site.title,
                &home_body(&items),
                &head_block(&meta),
            )?
        }
        Some(id) => {
            let item = match source.item(id)? {
                Some(item) if !item.draft => item,
                _ => return serve_not_found(request),
            };
            let meta = resolve(&RenderContext::Item(&item), settings, &config.site);
            render_preview(
                &config.site.language,
                &item.title,
                &item_body(&item),
                &head_block(&meta),
            )?
        }
    };

    serve_text(request, "text/html; charset=utf-8", html)
}

// ============================================================================
// Preview Rendering
// ============================================================================

/// Fill the preview template and inject the head block after `<head>`.
fn render_preview(lang: &str, title: &str, body: &str, block: &str) -> Result<String> {
    #[allow(clippy::literal_string_with_formatting_args)]
    // These are template placeholders, not format args
    let html = PREVIEW_TEMPLATE
        .replace("{lang}", &html_escape(lang))
        .replace("{title}", &html_escape(title))
        .replace("{body}", body)
        .replace("{version}", env!("CARGO_PKG_VERSION"));

    let injected = inject_head(html.as_bytes(), block)?;
    String::from_utf8(injected).context("preview page is not valid UTF-8")
}

/// Home page body: a listing of published items.
fn home_body(items: &[ContentItem]) -> String {
    if items.is_empty() {
        return "<p class=\"meta\">No published content yet.</p>".into();
    }

    let entries: Vec<String> = items
        .iter()
        .map(|item| {
            format!(
                r#"<li><a href="/{}">{}</a> <span class="meta">({})</span></li>"#,
                item.id,
                html_escape(&item.title),
                html_escape(&item.kind),
            )
        })
        .collect();

    format!("<ul class=\"items\">\n{}\n</ul>", entries.join("\n"))
}

/// Item page body: byline and description text.
fn item_body(item: &ContentItem) -> String {
    let byline = format!(
        r#"<p class="meta">{} &middot; {} &middot; {}</p>"#,
        html_escape(&item.kind),
        html_escape(&item.author),
        item.published.format("%Y-%m-%d"),
    );
    let text = item.excerpt.as_deref().unwrap_or(&item.body);
    format!("{byline}\n<p>{}</p>", html_escape(text))
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Serve a 200 response with the given content type.
fn serve_text(request: Request, content_type: &str, body: String) -> Result<()> {
    let response = Response::from_string(body)
        .with_header(Header::from_bytes("Content-Type", content_type).unwrap());
    request.respond(response)?;
    Ok(())
}

/// Serve a plain-text response with a non-200 status code.
fn serve_status(request: Request, status: u16, body: &str) -> Result<()> {
    let response = Response::from_string(body)
        .with_status_code(StatusCode(status))
        .with_header(Header::from_bytes("Content-Type", "text/plain; charset=utf-8").unwrap());
    request.respond(response)?;
    Ok(())
}

/// Serve 404 Not Found response.
fn serve_not_found(request: Request) -> Result<()> {
    serve_status(request, 404, "404 Not Found")
}

// ============================================================================
// Tests
// ============================================================================
