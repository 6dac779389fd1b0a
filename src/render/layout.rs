//! Full-page markup for a [`Document`]

use super::escape_html;
use crate::config::SiteConfig;
use crate::ui::{Document, ElementId, PageKind};

const STYLE: &str = r#"
:root { --bg: #ffffff; --fg: #1f2328; --muted: #656d76; --card: #f6f8fa; --accent: #0969da; --mark: #fff8c5; }
[data-theme="dark"] { --bg: #0d1117; --fg: #e6edf3; --muted: #8d96a0; --card: #161b22; --accent: #4493f8; --mark: #bb800926; }
body { margin: 0 auto; max-width: 48rem; padding: 1rem; background: var(--bg); color: var(--fg); font-family: system-ui, sans-serif; line-height: 1.6; }
header.site-header { display: flex; justify-content: space-between; align-items: center; }
header.site-header a { color: inherit; text-decoration: none; }
.theme-toggle { background: none; border: 1px solid var(--muted); border-radius: 999px; cursor: pointer; padding: .25rem .6rem; }
.search-box { position: relative; margin: 1rem 0; }
#search-input { width: 100%; box-sizing: border-box; padding: .5rem; font-size: 1rem; }
#search-suggestions { position: absolute; left: 0; right: 0; margin: 0; padding: 0; list-style: none; background: var(--card); z-index: 1; }
.search-suggestion { padding: .25rem .5rem; cursor: pointer; }
.result-count { color: var(--muted); font-size: .875rem; }
.filters span { display: inline-block; margin: .15rem; padding: .1rem .5rem; border-radius: 999px; background: var(--card); cursor: pointer; }
.filters span.active { background: var(--accent); color: #fff; }
.post-card { display: block; margin: 1rem 0; padding: 1rem; border-radius: 8px; background: var(--card); color: inherit; text-decoration: none; }
.post-card h2 { margin: 0 0 .25rem; }
.post-meta, .post-tags { color: var(--muted); font-size: .875rem; }
.post-meta .category, .post-tags .tag { margin-left: .5rem; }
mark.search-highlight { background: var(--mark); color: inherit; }
.load-error { padding: 1rem; border-left: 4px solid #cf222e; }
pre { overflow-x: auto; }
"#;

/// Applies effect patches from the page session and reports DOM events back
const CLIENT_SCRIPT: &str = r#"
(function () {
  var body = document.body;
  var params = new URLSearchParams(location.search);
  var dark = !!(window.matchMedia && window.matchMedia('(prefers-color-scheme: dark)').matches);
  params.set('page', body.getAttribute('data-page') || 'index');
  params.set('dark', dark ? '1' : '0');
  var proto = location.protocol === 'https:' ? 'wss://' : 'ws://';
  var ws = new WebSocket(proto + location.host + '/__events?' + params.toString());

  function send(event) { if (ws.readyState === 1) ws.send(JSON.stringify(event)); }
  function byId(id) { return document.getElementById(id); }

  var ops = {
    'set-html': function (e) { var el = byId(e.id); if (el) el.innerHTML = e.html; },
    'set-text': function (e) { var el = byId(e.id); if (el) el.textContent = e.text; },
    'set-value': function (e) { var el = byId(e.id); if (el && el.value !== e.value) el.value = e.value; },
    'set-visible': function (e) { var el = byId(e.id); if (el) el.style.display = e.visible ? '' : 'none'; },
    'focus': function (e) { var el = byId(e.id); if (el) { el.focus(); if (e.select && el.select) el.select(); } },
    'blur': function (e) { var el = byId(e.id); if (el) el.blur(); },
    'set-chip-active': function (e) {
      var attr = 'data-' + e.kind;
      document.querySelectorAll('.filter-' + e.kind).forEach(function (el) {
        if (el.getAttribute(attr) === e.value) el.classList.toggle('active', e.active);
      });
    },
    'set-theme': function (e) { document.documentElement.setAttribute('data-theme', e.theme); },
    'set-title': function (e) { document.title = e.title; },
    'post-message': function (e) {
      var frame = document.querySelector(e.selector);
      if (frame && frame.contentWindow) frame.contentWindow.postMessage(e.message, e.origin);
    },
    'rescan': function (e) { var el = byId(e.id); if (el && window.Prism) window.Prism.highlightAllUnder(el); },
    'reload': function () { location.reload(); }
  };

  ws.onmessage = function (msg) {
    JSON.parse(msg.data).forEach(function (e) { var op = ops[e.op]; if (op) op(e); });
  };

  var search = byId('search-input');
  if (search) {
    search.addEventListener('input', function (e) { send({ type: 'input', value: e.target.value }); });
    search.addEventListener('focus', function () { send({ type: 'focus', id: 'search-input' }); });
    search.addEventListener('blur', function () { send({ type: 'blur', id: 'search-input' }); });
  }

  function target(el) {
    return { type: 'click', id: el.id || null, classes: Array.prototype.slice.call(el.classList), data: Object.assign({}, el.dataset) };
  }

  document.addEventListener('mousedown', function (e) {
    var el = e.target.closest && e.target.closest('.search-suggestion');
    if (!el || ws.readyState !== 1) return;
    e.preventDefault();
    send(target(el));
  });

  document.addEventListener('click', function (e) {
    var el = e.target.closest && e.target.closest('.filter-tag, .filter-category, #theme-toggle');
    if (!el || ws.readyState !== 1) return;
    e.preventDefault();
    send(target(el));
  });

  document.addEventListener('keydown', function (e) {
    var k = e.key;
    var shortcut = ((e.ctrlKey || e.metaKey) && k === 'k') || (e.altKey && k === 't');
    if (!shortcut && k !== 'Escape') return;
    if (shortcut) e.preventDefault();
    var active = document.activeElement;
    send({ type: 'key-down', key: k, ctrl: e.ctrlKey, meta: e.metaKey, alt: e.altKey, target: active && active.id ? active.id : null });
  });

  if (window.matchMedia) {
    window.matchMedia('(prefers-color-scheme: dark)').addEventListener('change', function (e) {
      send({ type: 'os-theme', dark: e.matches });
    });
  }
})();
"#;

/// Render a whole HTML page from the document state
///
/// With `live` set the page carries the client script that connects back to
/// the server's event socket.
pub fn render_page(doc: &Document, config: &SiteConfig, live: bool) -> String {
    let page = match doc.kind() {
        PageKind::Post => "post",
        _ => "index",
    };

    let mut html = String::with_capacity(8 * 1024);
    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html lang="{}" data-theme="{}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{}</title>
<style>{}</style>
</head>
<body data-page="{}">
"#,
        escape_html(&config.language),
        doc.theme(),
        escape_html(doc.title()),
        STYLE,
        page
    ));

    html.push_str(&render_header(doc, config));
    html.push_str("<main>\n");
    match doc.kind() {
        PageKind::Post => html.push_str(&render_post_body(doc)),
        _ => html.push_str(&render_index_body(doc, config)),
    }
    html.push_str("</main>\n");

    if live {
        html.push_str("<script>");
        html.push_str(CLIENT_SCRIPT);
        html.push_str("</script>\n");
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn render_header(doc: &Document, config: &SiteConfig) -> String {
    let mut html = format!(
        r#"<header class="site-header"><a href="index.html"><strong>{}</strong></a>"#,
        escape_html(&config.title)
    );
    if doc.has(ElementId::ThemeToggle) {
        let icon = doc.html(ElementId::ThemeIcon).unwrap_or_default();
        html.push_str(&format!(
            r#"<form method="post" action="/theme/toggle"><button type="submit" id="{}" class="theme-toggle" aria-label="Toggle theme"><span id="{}" class="theme-icon">{}</span></button></form>"#,
            ElementId::ThemeToggle.dom_id(),
            ElementId::ThemeIcon.dom_id(),
            icon
        ));
    }
    html.push_str("</header>\n");
    html
}

fn render_index_body(doc: &Document, config: &SiteConfig) -> String {
    let mut html = String::new();

    if let Some(input) = doc.element(ElementId::SearchInput) {
        html.push_str(&format!(
            r#"<form class="search-box" action="index.html" method="get"><input type="search" id="{}" name="q" value="{}" placeholder="Search (Ctrl+K)" autocomplete="off">"#,
            ElementId::SearchInput.dom_id(),
            escape_html(&input.value)
        ));
        html.push_str(&element(doc, ElementId::SearchSuggestions, "ul", "search-suggestions"));
        html.push_str("</form>\n");
    }

    html.push_str(&element(doc, ElementId::ResultCount, "p", "result-count"));

    if doc.has(ElementId::TagsList) || doc.has(ElementId::CategoriesList) {
        html.push_str(r#"<section class="filters">"#);
        html.push_str(&element(doc, ElementId::CategoriesList, "div", "categories-list"));
        html.push_str(&element(doc, ElementId::TagsList, "div", "tags-list"));
        html.push_str("</section>\n");
    }

    html.push_str(&element(doc, ElementId::PostsContainer, "section", "posts"));

    if let Some(no_results) = doc.element(ElementId::NoResults) {
        html.push_str(&format!(
            r#"<div id="{}" class="no-results"{}><p>{}</p></div>"#,
            ElementId::NoResults.dom_id(),
            hidden(no_results.visible),
            escape_html(&config.no_results_message)
        ));
    }

    html.push_str(&element(doc, ElementId::MainComments, "section", "main-comments"));
    html
}

fn render_post_body(doc: &Document) -> String {
    let mut html = element(doc, ElementId::PostContent, "div", "post-content");
    html.push_str(&element(doc, ElementId::PostComments, "section", "post-comments"));
    html
}

/// A present element with its inner markup, or nothing
fn element(doc: &Document, id: ElementId, tag: &str, class: &str) -> String {
    match doc.element(id) {
        Some(el) => format!(
            "<{tag} id=\"{}\" class=\"{class}\"{}>{}</{tag}>\n",
            id.dom_id(),
            hidden(el.visible),
            el.html
        ),
        None => String::new(),
    }
}

fn hidden(visible: bool) -> &'static str {
    if visible {
        ""
    } else {
        r#" style="display:none""#
    }
}
