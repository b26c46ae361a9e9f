//! HTML rendering
//!
//! Pages are plain functions from typed page data to a `String`. Every value
//! that comes from the database or the request goes through [`escape`].

pub mod admin;
pub mod storefront;

use crate::domain::catalog::{discount_pct, format_price, image_src, truncate};
use crate::domain::product::Product;

pub const STORE_NAME: &str = "Showcase";

const CARD_TITLE_CHARS: usize = 60;

/// Escape text for use in HTML element content and quoted attributes
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a value for a query string
pub fn query_encode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Storefront page chrome around `body`
pub fn layout(title: &str, description: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width,initial-scale=1.0">
<title>{title}</title>
<meta name="description" content="{description}">
<meta property="og:title" content="{title}">
<meta property="og:description" content="{description}">
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<header class="site-header">
  <a href="/" class="logo">{store}</a>
  <form action="/search" method="GET" class="search">
    <input type="search" name="q" placeholder="Search products" aria-label="Search products">
  </form>
</header>
<main>
{body}
</main>
<footer class="site-footer">
  <p>&copy; {store}</p>
</footer>
<script src="/static/app.js" defer></script>
</body>
</html>"#,
        title = escape(title),
        description = escape(description),
        store = STORE_NAME,
        body = body,
    )
}

/// Price line with strike-through original price and discount badge
pub fn price_block(product: &Product) -> String {
    let mut html = format!(r#"<span class="price">{}</span>"#, escape(&format_price(&product.price)));
    let discount = discount_pct(&product.price, &product.original_price);
    if discount > 0 {
        html.push_str(&format!(
            r#" <span class="original-price">{}</span> <span class="discount">{}% off</span>"#,
            escape(&format_price(&product.original_price)),
            discount
        ));
    }
    html
}

pub fn badges(product: &Product) -> String {
    let mut html = String::new();
    if product.is_bestseller {
        html.push_str(r#"<span class="badge bestseller">Bestseller</span>"#);
    }
    if product.is_new {
        html.push_str(r#"<span class="badge new">New</span>"#);
    }
    html
}

pub fn product_card(product: &Product) -> String {
    let rating = if product.rating.is_empty() {
        String::new()
    } else {
        format!(r#"<span class="rating">★ {}</span>"#, escape(&product.rating))
    };
    format!(
        r#"<a class="card" href="/product/{id}">
  <div class="card-image"><img src="{img}" alt="{alt}" loading="lazy">{badges}</div>
  <div class="card-body">
    <h3>{title}</h3>
    <div class="card-price">{price}</div>
    {rating}
  </div>
</a>"#,
        id = product.id,
        img = escape(&image_src(&product.image_url)),
        alt = escape(&product.title),
        badges = badges(product),
        title = escape(&truncate(&product.title, CARD_TITLE_CHARS)),
        price = price_block(product),
        rating = rating,
    )
}

pub fn product_grid(products: &[Product]) -> String {
    if products.is_empty() {
        return r#"<p class="empty">No products found.</p>"#.to_string();
    }
    let cards: String = products.iter().map(product_card).collect();
    format!(r#"<div class="grid">{cards}</div>"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_and_quotes() {
        assert_eq!(escape(r#"<b>"Tom" & 'Jerry'</b>"#), "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
    }

    #[test]
    fn layout_escapes_title() {
        let html = layout("<script>", "desc", "<p>body</p>");
        assert!(html.contains("<title>&lt;script&gt;</title>"));
        assert!(html.contains("<p>body</p>"));
    }
}
