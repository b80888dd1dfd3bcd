//! Markdown → HTML conversion.
//!
//! Built on `pulldown-cmark` with two event transforms:
//!
//! ```text
//! Parser ──▶ highlight_code_blocks ──▶ rewrite_text ──▶ push_html
//!            fenced code → Html        [[wikilinks]], bare URLs → InlineHtml
//! ```
//!
//! Which transforms run is decided once, from [`RenderConfig`], when the
//! renderer is constructed.

use super::highlight::highlight;
use crate::{
    config::RenderConfig,
    content::AliasMap,
    utils::{
        html::{escape_attr, escape_text},
        slug::slugify_target,
    },
};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};
use regex::Regex;
use std::{
    ops::Range,
    sync::{Arc, LazyLock},
};

/// Bare URLs for autolinking.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:https?://|www\.)[^\s<>"]+"#).unwrap());

/// Trailing characters that end a sentence rather than a URL.
const URL_TRAILING: &[char] = &['.', ',', ';', ':', '!', '?', '\'', ')', ']'];

/// An event with its byte range in the source.
type Spanned<'a> = (Event<'a>, Range<usize>);

// ============================================================================
// Link Style
// ============================================================================

/// How internal links are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkStyle {
    /// `/guide/setup`, resolved by the live server.
    #[default]
    Served,
    /// `/guide/setup.html`, for a static export.
    Exported,
}

impl LinkStyle {
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Served => "",
            Self::Exported => ".html",
        }
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Markdown renderer bound to one alias map.
#[derive(Debug, Clone)]
pub struct Renderer {
    options: Options,
    wikilinks: bool,
    autolink: bool,
    style: LinkStyle,
    aliases: Arc<AliasMap>,
}

impl Renderer {
    pub fn new(aliases: Arc<AliasMap>, caps: &RenderConfig, style: LinkStyle) -> Self {
        let mut options = Options::empty();
        if caps.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if caps.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if caps.smart_punctuation {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }

        Self {
            options,
            wikilinks: caps.wikilinks,
            autolink: caps.autolink,
            style,
            aliases,
        }
    }

    pub const fn style(&self) -> LinkStyle {
        self.style
    }

    pub const fn aliases(&self) -> &Arc<AliasMap> {
        &self.aliases
    }

    /// Convert a markdown body to HTML.
    pub fn render(&self, markdown: &str) -> String {
        let events: Vec<Spanned<'_>> =
            Parser::new_ext(markdown, self.options).into_offset_iter().collect();
        let events = highlight_code_blocks(events);
        let events = if self.wikilinks || self.autolink {
            self.rewrite_text(markdown, events)
        } else {
            events.into_iter().map(|(event, _)| event).collect()
        };

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }

    /// Link target for a wikilink-style reference.
    ///
    /// Known names resolve through the alias map; anything else falls back
    /// to a slugified form of the text, producing a dangling link.
    pub fn resolve_href(&self, target: &str) -> String {
        let slug = self
            .aliases
            .resolve(target)
            .map_or_else(|| slugify_target(target), str::to_owned);
        format!("/{slug}{}", self.style.suffix())
    }

    /// Parse the inside of `[[...]]` into an anchor.
    pub fn wikilink_html(&self, inner: &str, class: &str) -> String {
        let (target, label) = match inner.split_once('|') {
            Some((target, label)) if !label.trim().is_empty() => (target.trim(), label.trim()),
            Some((target, _)) => (target.trim(), target.trim()),
            None => (inner.trim(), inner.trim()),
        };

        format!(
            r#"<a href="{}" class="{class}">{}</a>"#,
            escape_attr(&self.resolve_href(target)),
            escape_text(label)
        )
    }

    /// Merge runs of text outside code and links, then expand them.
    fn rewrite_text<'a>(&self, source: &str, events: Vec<Spanned<'a>>) -> Vec<Event<'a>> {
        let mut result = Vec::with_capacity(events.len());
        let mut run: Vec<(CowStr<'a>, Range<usize>)> = Vec::new();
        let mut opaque = 0usize;

        for (event, range) in events {
            let event = match event {
                Event::Text(text) if opaque == 0 => {
                    run.push((text, range));
                    continue;
                }
                other => other,
            };

            self.expand(source, &mut run, &mut result);

            match &event {
                Event::Start(Tag::CodeBlock(_) | Tag::Link { .. } | Tag::Image { .. }) => {
                    opaque += 1;
                }
                Event::End(TagEnd::CodeBlock | TagEnd::Link | TagEnd::Image) => {
                    opaque = opaque.saturating_sub(1);
                }
                Event::InlineHtml(tag) if is_anchor_open(tag) => opaque += 1,
                Event::InlineHtml(tag) if tag.trim().eq_ignore_ascii_case("</a>") => {
                    opaque = opaque.saturating_sub(1);
                }
                _ => {}
            }
            result.push(event);
        }

        self.expand(source, &mut run, &mut result);
        result
    }

    /// Replace wikilinks in a merged text run, then drain the run.
    ///
    /// Wikilinks are located in the source text the run came from, so
    /// targets and labels are read before smart punctuation rewrites them.
    fn expand<'a>(
        &self,
        source: &str,
        run: &mut Vec<(CowStr<'a>, Range<usize>)>,
        out: &mut Vec<Event<'a>>,
    ) {
        let (Some((_, first)), Some((_, last))) = (run.first(), run.last()) else {
            return;
        };
        let span = first.start..last.end;
        let mut plain_start = span.start;

        if self.wikilinks {
            for link in find_wikilinks(source, span.clone()) {
                self.push_plain(&run_text(source, run, plain_start..link.start), out);
                let anchor = self.wikilink_html(&source[link.start + 2..link.end - 2], "wikilink");
                out.push(Event::InlineHtml(CowStr::from(anchor)));
                plain_start = link.end;
            }
        }

        self.push_plain(&run_text(source, run, plain_start..span.end), out);
        run.clear();
    }

    /// Emit plain text, autolinking bare URLs if enabled.
    fn push_plain<'a>(&self, text: &str, out: &mut Vec<Event<'a>>) {
        if text.is_empty() {
            return;
        }
        if !self.autolink {
            out.push(Event::Text(CowStr::from(text.to_owned())));
            return;
        }

        let mut last = 0;
        for found in URL_RE.find_iter(text) {
            let url = found.as_str().trim_end_matches(URL_TRAILING);
            if url.ends_with("://") || url.len() <= "www.".len() {
                continue;
            }

            if found.start() > last {
                out.push(Event::Text(CowStr::from(text[last..found.start()].to_owned())));
            }
            let href = if url.starts_with("www.") {
                format!("http://{url}")
            } else {
                url.to_owned()
            };
            out.push(Event::InlineHtml(CowStr::from(format!(
                r#"<a href="{}">{}</a>"#,
                escape_attr(&href),
                escape_text(url)
            ))));
            last = found.start() + url.len();
        }

        if last < text.len() {
            out.push(Event::Text(CowStr::from(text[last..].to_owned())));
        }
    }
}

fn is_anchor_open(tag: &str) -> bool {
    let tag = tag.trim_start().to_ascii_lowercase();
    tag.starts_with("<a ") || tag.starts_with("<a>")
}

fn is_wikilink_inner(inner: &str) -> bool {
    !inner.trim().is_empty() && !inner.contains(['[', ']', '\n'])
}

/// `[[...]]` spans of `source` inside `span`. An escaped `\[[` is not a link.
fn find_wikilinks(source: &str, span: Range<usize>) -> Vec<Range<usize>> {
    let mut links = Vec::new();
    let mut pos = span.start;

    while let Some(offset) = source[pos..span.end].find("[[") {
        let start = pos + offset;
        let inner_start = start + 2;

        match source[inner_start..span.end].find("]]") {
            Some(len)
                if !source[..start].ends_with('\\')
                    && is_wikilink_inner(&source[inner_start..inner_start + len]) =>
            {
                pos = inner_start + len + 2;
                links.push(start..pos);
            }
            Some(_) => pos = start + 1,
            None => break,
        }
    }

    links
}

/// Rendered text of the run pieces that fall inside `window` of the source.
///
/// Whole pieces keep their rendered form. A piece cut by the window is
/// sliced when it is unchanged from its source, and read from the source
/// otherwise.
fn run_text(source: &str, run: &[(CowStr<'_>, Range<usize>)], window: Range<usize>) -> String {
    let mut text = String::new();

    for (piece, range) in run {
        if range.is_empty() {
            if window.contains(&range.start) {
                text.push_str(piece);
            }
            continue;
        }

        let start = range.start.max(window.start);
        let end = range.end.min(window.end);
        if start >= end {
            continue;
        }

        if start == range.start && end == range.end {
            text.push_str(piece);
        } else if **piece == source[range.clone()] {
            text.push_str(&piece[start - range.start..end - range.start]);
        } else {
            text.push_str(&source[start..end]);
        }
    }

    text
}

/// Replace fenced code blocks with highlighted HTML.
fn highlight_code_blocks(events: Vec<Spanned<'_>>) -> Vec<Spanned<'_>> {
    let mut result = Vec::with_capacity(events.len());
    let mut fence: Option<String> = None;
    let mut code = String::new();

    for (event, range) in events {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                fence = Some(info.split_whitespace().next().unwrap_or_default().to_owned());
                code.clear();
            }
            Event::Text(text) if fence.is_some() => code.push_str(&text),
            Event::End(TagEnd::CodeBlock) if fence.is_some() => {
                let lang = fence.take().unwrap_or_default();
                result.push((Event::Html(CowStr::from(code_block_html(&code, &lang))), range));
            }
            other => result.push((other, range)),
        }
    }

    result
}

fn code_block_html(code: &str, lang: &str) -> String {
    if lang.is_empty() {
        return format!("<pre><code>{}</code></pre>\n", highlight(code, None));
    }
    format!(
        "<pre><code class=\"language-{}\">{}</code></pre>\n",
        escape_attr(lang),
        highlight(code, Some(lang))
    )
}
