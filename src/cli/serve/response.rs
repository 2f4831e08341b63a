//! HTTP response handlers.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use super::content::maybe_inject_hotreload;
use crate::utils::mime::{self, types};

/// Respond with a static file, injecting the reload client into HTML.
pub fn respond_file(request: Request, path: &Path, live_reload: bool) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let body = maybe_inject_hotreload(body, content_type, live_reload);

    send_body(request, 200, content_type, body)
}

/// 301 to the slash-terminated directory URL.
pub fn respond_redirect(request: Request, location: &str) -> Result<()> {
    let response = Response::empty(StatusCode(301))
        .with_header(header("Location", location.as_bytes())?)
        .with_header(header("Cache-Control", b"no-cache")?);
    request.respond(response)?;
    Ok(())
}

pub fn respond_not_found(request: Request) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 404, types::PLAIN);
    }
    send_body(request, 404, types::PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec())
}

/// Respond with the reload client, bound to the live WebSocket port.
pub fn respond_hotreload_js(request: Request, ws_port: u16) -> Result<()> {
    use crate::embed::serve::{HOTRELOAD_JS, HotreloadVars};

    let body = HOTRELOAD_JS.render(&HotreloadVars { ws_port });
    send_body(request, 200, types::JAVASCRIPT, body.into_bytes())
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = Response::empty(StatusCode(status))
        .with_header(header("Content-Type", content_type.as_bytes())?)
        .with_header(header("Cache-Control", b"no-cache")?);
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", content_type.as_bytes())?)
        .with_header(header("Cache-Control", b"no-cache")?);
    request.respond(response)?;
    Ok(())
}

fn header(key: &str, value: &[u8]) -> Result<Header> {
    Header::from_bytes(key.as_bytes(), value)
        .map_err(|()| anyhow::anyhow!("invalid header value for {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_valid() {
        let h = header("Cache-Control", b"no-cache").unwrap();
        assert_eq!(h.value.as_str(), "no-cache");
    }

    #[test]
    fn test_header_rejects_non_ascii() {
        assert!(header("Location", "/caf\u{e9}/".as_bytes()).is_err());
    }
}
