//! sitemap.xml and robots.txt

use axum::http::HeaderMap;
use chrono::NaiveDate;
use url::form_urlencoded;

use crate::domain::catalog::KNOWN_CATEGORIES;
use crate::domain::product::Product;

/// Public base URL as seen by the client, honoring reverse proxy headers
pub fn base_url(headers: &HeaderMap, host: &str) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    };
    let scheme = header("x-forwarded-proto").unwrap_or("https");
    let host = header("x-forwarded-host").unwrap_or(host);
    format!("{scheme}://{host}")
}

pub fn render_sitemap(base: &str, products: &[Product], today: NaiveDate) -> String {
    let today = today.format("%Y-%m-%d");
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");

    push_url(&mut xml, &format!("{base}/"), Some(&today.to_string()), "daily", "1.0");

    for product in products {
        let lastmod = product.added_at.format("%Y-%m-%d").to_string();
        push_url(&mut xml, &format!("{base}/product/{}", product.id), Some(&lastmod), "weekly", "0.8");
    }

    for category in KNOWN_CATEGORIES {
        if products.iter().any(|p| p.category == category) {
            let query: String = form_urlencoded::byte_serialize(category.as_bytes()).collect();
            push_url(&mut xml, &format!("{base}/search?q={query}"), None, "weekly", "0.6");
        }
    }

    xml.push_str("</urlset>");
    xml
}

fn push_url(xml: &mut String, loc: &str, lastmod: Option<&str>, changefreq: &str, priority: &str) {
    xml.push_str(&format!("  <url>\n    <loc>{}</loc>\n", escape_xml(loc)));
    if let Some(lastmod) = lastmod {
        xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
    }
    xml.push_str(&format!(
        "    <changefreq>{changefreq}</changefreq>\n    <priority>{priority}</priority>\n  </url>\n"
    ));
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub fn render_robots(base: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /admin\nDisallow: /api/\nDisallow: /img\n\nSitemap: {base}/sitemap.xml\n"
    )
}
