//! DOM extraction for forum listing and thread pages.
//!
//! The forum has shipped at least two DOM shapes; every extraction here
//! runs a selector list and takes the first shape that yields anything.
//! Items that fail to parse meaningfully (no title or URL) are skipped
//! rather than failing the crawl.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// A thread row parsed off a listing page.
#[derive(Debug, Clone)]
pub struct ParsedThread {
    pub title: String,
    pub description: String,
    pub url: String,
}

/// A comment parsed off a thread page.
#[derive(Debug, Clone)]
pub struct ParsedComment {
    pub body: String,
    pub url: String,
    pub created_at: Option<DateTime<Utc>>,
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn absolute_url(href: &str, base_url: &str) -> String {
    match url::Url::parse(href) {
        Ok(absolute) => absolute.to_string(),
        Err(_) => format!("{}{}", base_url, href),
    }
}

/// Strip the site base from an absolute URL, leaving a fetchable path.
pub fn to_relative(url: &str, base_url: &str) -> String {
    url.strip_prefix(base_url).unwrap_or(url).to_string()
}

/// Parse thread rows from a listing page.
pub fn parse_threads(html: &str, base_url: &str) -> Vec<ParsedThread> {
    let document = Html::parse_document(html);
    let mut rows = Vec::new();

    let row_selector = match Selector::parse(".suggestions li, .feedback li, .uvIdea") {
        Ok(s) => s,
        Err(_) => return rows,
    };
    let title_selector = Selector::parse("a, h3 a").ok();
    let desc_selector = Selector::parse(".description, .body, .uvIdeaDescription").ok();

    for row in document.select(&row_selector) {
        let title_el = title_selector
            .as_ref()
            .and_then(|s| row.select(s).next());
        let title = title_el.map(text_of).unwrap_or_default();
        let href = title_el.and_then(|el| el.value().attr("href"));

        let description = desc_selector
            .as_ref()
            .and_then(|s| row.select(s).next())
            .map(text_of)
            .unwrap_or_default();

        match (href, title.is_empty()) {
            (Some(href), false) => rows.push(ParsedThread {
                title,
                description,
                url: absolute_url(href, base_url),
            }),
            _ => continue,
        }
    }
    rows
}

/// Find the next listing page, as a site-relative path.
pub fn next_page_path(html: &str, base_url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a.next_page, a[rel=\"next\"]").ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(|href| to_relative(href, base_url))
}

/// Discover the page count of a thread from its pagination controls.
/// Defaults to 1 when nothing parseable is found.
pub fn total_thread_pages(html: &str) -> usize {
    let document = Html::parse_document(html);
    let mut total = 1;
    if let Ok(selector) = Selector::parse("a.page, .pagination a") {
        for link in document.select(&selector) {
            if let Ok(n) = text_of(link).parse::<usize>() {
                total = total.max(n);
            }
        }
    }
    total
}

/// Path for page `n` of a thread.
pub fn thread_page_path(rel: &str, page: usize) -> String {
    if page <= 1 {
        rel.to_string()
    } else if rel.contains('?') {
        format!("{}&page={}", rel, page)
    } else {
        format!("{}?page={}", rel, page)
    }
}

/// Parse comments from a thread page.
///
/// Primary strategy targets the current comment markup; the fallback
/// sweeps broader comment-like containers from the older shape. Within
/// one page, duplicates are collapsed by `(url, body)`.
pub fn parse_comments(html: &str, current_path: &str, base_url: &str) -> Vec<ParsedComment> {
    let document = Html::parse_document(html);
    let mut comments = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    let permalink_selector = Selector::parse("a.permalink, .permalink a").ok();
    let anchor_selector = Selector::parse("a[href*=\"#\"]").ok();
    let time_selector = Selector::parse("time[datetime]").ok();

    let mut push_unique = |body: String, href: Option<String>, el: ElementRef<'_>| {
        if body.is_empty() {
            return;
        }
        // Permalink recovery chain: explicit href, any fragment link,
        // element id on the current path, the page itself.
        let href = href
            .or_else(|| {
                anchor_selector.as_ref().and_then(|s| {
                    el.select(s)
                        .next()
                        .and_then(|a| a.value().attr("href"))
                        .map(str::to_string)
                })
            })
            .or_else(|| {
                el.value()
                    .attr("id")
                    .map(|id| format!("{}#{}", current_path, id))
            })
            .unwrap_or_else(|| current_path.to_string());
        let url = absolute_url(&href, base_url);

        let created_at = time_selector.as_ref().and_then(|s| {
            el.select(s)
                .next()
                .and_then(|t| t.value().attr("datetime"))
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|dt| dt.with_timezone(&Utc))
        });

        if seen.insert((url.clone(), body.clone())) {
            comments.push(ParsedComment {
                body,
                url,
                created_at,
            });
        }
    };

    // Preferred specific structure
    if let (Ok(article_selector), Ok(body_selector)) = (
        Selector::parse("article.uvUserAction.uvUserAction-comment"),
        Selector::parse(".uvUserActionBody"),
    ) {
        for el in document.select(&article_selector) {
            let body = el.select(&body_selector).next().map(text_of).unwrap_or_default();
            let href = permalink_selector
                .as_ref()
                .and_then(|s| el.select(s).next())
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string);
            push_unique(body, href, el);
        }
    }

    // Fallback broader selectors
    if let (Ok(container_selector), Ok(body_selector)) = (
        Selector::parse(
            ".comment, .uvComment, .comment_item, [class*=\"comment\"], .idea-comment",
        ),
        Selector::parse(".body, .content, .uvCommentBody"),
    ) {
        for el in document.select(&container_selector) {
            let body = el.select(&body_selector).next().map(text_of).unwrap_or_default();
            push_unique(body, None, el);
        }
    }

    comments
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://acme.uservoice.com";

    #[test]
    fn parses_current_listing_shape() {
        let html = r#"
            <ul class="suggestions">
                <li><a href="/suggestions/1-export">Export please</a>
                    <div class="description">Let me export designs</div></li>
                <li><a href="/suggestions/2-fonts">More fonts</a></li>
                <li><span>no link, skipped</span></li>
            </ul>
        "#;
        let rows = parse_threads(html, BASE);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "Export please");
        assert_eq!(rows[0].description, "Let me export designs");
        assert_eq!(rows[0].url, format!("{BASE}/suggestions/1-export"));
        assert_eq!(rows[1].description, "");
    }

    #[test]
    fn parses_legacy_listing_shape() {
        let html = r#"
            <div class="uvIdea">
                <h3><a href="/ideas/9">Old idea</a></h3>
                <div class="uvIdeaDescription">Legacy body</div>
            </div>
        "#;
        let rows = parse_threads(html, BASE);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Old idea");
        assert_eq!(rows[0].description, "Legacy body");
    }

    #[test]
    fn finds_next_page_link() {
        let html = r#"<a class="next_page" href="/forums/1?page=2">Next</a>"#;
        assert_eq!(
            next_page_path(html, BASE),
            Some("/forums/1?page=2".to_string())
        );

        let rel_next = format!(r#"<a rel="next" href="{BASE}/forums/1?page=3">Next</a>"#);
        assert_eq!(
            next_page_path(&rel_next, BASE),
            Some("/forums/1?page=3".to_string())
        );

        assert_eq!(next_page_path("<p>last page</p>", BASE), None);
    }

    #[test]
    fn pagination_count_defaults_to_one() {
        assert_eq!(total_thread_pages("<p>no pager</p>"), 1);

        let html = r#"
            <div class="pagination">
                <a href="?page=1">1</a><a href="?page=2">2</a>
                <a href="?page=7">7</a><a href="?page=2">Next</a>
            </div>
        "#;
        assert_eq!(total_thread_pages(html), 7);
    }

    #[test]
    fn thread_page_paths() {
        assert_eq!(thread_page_path("/suggestions/1", 1), "/suggestions/1");
        assert_eq!(
            thread_page_path("/suggestions/1", 2),
            "/suggestions/1?page=2"
        );
        assert_eq!(
            thread_page_path("/suggestions/1?filter=new", 3),
            "/suggestions/1?filter=new&page=3"
        );
    }

    #[test]
    fn parses_comments_with_primary_selectors() {
        let html = r#"
            <article class="uvUserAction uvUserAction-comment" id="c1">
                <div class="uvUserActionBody">First comment body</div>
                <a class="permalink" href="/suggestions/1#comment-1">link</a>
                <time datetime="2024-03-01T12:00:00Z">March</time>
            </article>
        "#;
        let comments = parse_comments(html, "/suggestions/1", BASE);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].body, "First comment body");
        assert_eq!(comments[0].url, format!("{BASE}/suggestions/1#comment-1"));
        assert!(comments[0].created_at.is_some());
    }

    #[test]
    fn falls_back_to_broader_selectors() {
        let html = r#"
            <div class="idea-comment" id="c42">
                <div class="content">Fallback comment</div>
            </div>
        "#;
        let comments = parse_comments(html, "/suggestions/2", BASE);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].body, "Fallback comment");
        assert_eq!(comments[0].url, format!("{BASE}/suggestions/2#c42"));
        assert!(comments[0].created_at.is_none());
    }

    #[test]
    fn dedupes_same_comment_across_strategies() {
        // Matches both the primary article selector and the broad
        // [class*="comment"] fallback, but with different body selectors;
        // the duplicate only appears when bodies collide.
        let html = r#"
            <article class="uvUserAction uvUserAction-comment">
                <div class="uvUserActionBody body">Same body</div>
                <a class="permalink" href="/suggestions/3#c1">link</a>
            </article>
        "#;
        let comments = parse_comments(html, "/suggestions/3", BASE);
        assert_eq!(comments.len(), 1);
    }
}
