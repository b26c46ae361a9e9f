use crate::domain::analytics::AnalyticsSummary;
use crate::domain::catalog::{KNOWN_CATEGORIES, format_price, image_src, truncate};
use crate::domain::product::Product;

use super::{STORE_NAME, escape};

fn admin_layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width,initial-scale=1.0">
<meta name="robots" content="noindex">
<title>{title} | {STORE_NAME} Admin</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body class="admin">
<header class="site-header">
  <a href="/admin" class="logo">{STORE_NAME} Admin</a>
  <nav><a href="/admin">Products</a> <a href="/admin/analytics">Analytics</a> <a href="/">Store</a> <a href="/admin/logout">Logout</a></nav>
</header>
<main>
{body}
</main>
<script src="/static/admin.js" defer></script>
</body>
</html>"#,
        title = escape(title),
    )
}

fn category_options(selected: &str) -> String {
    let mut html = String::from(r#"<option value="">Auto</option>"#);
    for category in KNOWN_CATEGORIES {
        let attr = if category == selected { " selected" } else { "" };
        html.push_str(&format!(r#"<option value="{0}"{attr}>{0}</option>"#, escape(category)));
    }
    html
}

pub fn products(products: &[Product]) -> String {
    let mut body = String::new();

    body.push_str(&format!(
        r#"<section class="panel">
<h2>Add product</h2>
<form id="add-by-url" class="admin-form">
  <input type="url" name="url" placeholder="Product URL (Meesho, Amazon, Flipkart...)" required>
  <button class="btn">Fetch &amp; add</button>
</form>
<details>
<summary>Add manually</summary>
<form id="add-manual" class="admin-form grid-form">
  <input type="hidden" name="mode" value="manual">
  <input name="title" placeholder="Title" required>
  <input name="url" placeholder="Source URL">
  <input name="price" placeholder="Price">
  <input name="original_price" placeholder="Original price">
  <input name="image_url" placeholder="Image URL">
  <input type="file" accept="image/*" data-upload-target="image_url">
  <input name="images" placeholder='Gallery, e.g. ["a.jpg", "b.jpg"]'>
  <input name="rating" placeholder="Rating">
  <select name="category">{options}</select>
  <textarea name="description" placeholder="Short description"></textarea>
  <textarea name="long_description" placeholder="Long description"></textarea>
  <button class="btn">Save</button>
</form>
</details>
</section>
<section class="panel">
<h2>Bulk import</h2>
<form id="bulk-import" class="admin-form">
  <input name="store_url" placeholder="Store URL or name (leave empty for the default store)">
  <button class="btn">Start import</button>
</form>
<pre id="bulk-status" class="status"></pre>
<details>
<summary>Paste scraped JSON</summary>
<form id="bulk-json" class="admin-form">
  <textarea name="payload" rows="6" placeholder='[{{"name": "...", "price": 199, "images": []}}]'></textarea>
  <button class="btn">Import JSON</button>
</form>
</details>
</section>"#,
        options = category_options(""),
    ));

    body.push_str(&format!(
        r#"<section class="panel"><h2>Products ({})</h2><table class="products"><thead><tr><th></th><th>Title</th><th>Price</th><th>Category</th><th>New</th><th>Bestseller</th><th></th></tr></thead><tbody>"#,
        products.len()
    ));
    for product in products {
        let checked = |flag: bool| if flag { " checked" } else { "" };
        body.push_str(&format!(
            r#"<tr data-id="{id}">
<td><img src="{img}" alt="" width="48" height="48"></td>
<td><a href="/product/{id}">{title}</a><br><small>{platform}</small></td>
<td><input name="price" value="{price}" size="8"></td>
<td><select name="category">{options}</select></td>
<td><input type="checkbox" name="is_new"{new}></td>
<td><input type="checkbox" name="is_bestseller"{best}></td>
<td><button class="btn small" data-action="save">Save</button> <button class="btn small danger" data-action="delete">Delete</button></td>
</tr>"#,
            id = product.id,
            img = escape(&image_src(&product.image_url)),
            title = escape(&truncate(&product.title, 80)),
            platform = escape(&product.platform),
            price = escape(&format_price(&product.price)),
            options = category_options(&product.category),
            new = checked(product.is_new),
            best = checked(product.is_bestseller),
        ));
    }
    body.push_str("</tbody></table></section>");

    admin_layout("Products", &body)
}

pub fn analytics(summary: &AnalyticsSummary) -> String {
    let mut body = format!(
        r#"<section class="cards">
<div class="stat"><strong>{}</strong><span>Products</span></div>
<div class="stat"><strong>{}</strong><span>Total views</span></div>
<div class="stat"><strong>{}</strong><span>Views today</span></div>
<div class="stat"><strong>{}</strong><span>Unique visitors</span></div>
<div class="stat"><strong>{}</strong><span>Order clicks</span></div>
<div class="stat"><strong>{}</strong><span>Clicks today</span></div>
</section>"#,
        summary.product_count,
        summary.total_views,
        summary.today_views,
        summary.unique_visitors,
        summary.total_clicks,
        summary.today_clicks,
    );

    body.push_str(r#"<section class="panel"><h2>Views, last 30 days</h2><div class="bars">"#);
    let peak = summary.peak_daily_views().max(1);
    for day in &summary.views_per_day {
        let height = day.views * 100 / peak;
        body.push_str(&format!(
            r#"<div class="bar" style="height:{height}%" title="{}: {}"></div>"#,
            escape(&day.day),
            day.views
        ));
    }
    body.push_str("</div></section>");

    body.push_str(r#"<section class="panel"><h2>Top products</h2><table><thead><tr><th>Product</th><th>Views</th></tr></thead><tbody>"#);
    for top in &summary.top_products {
        body.push_str(&format!(
            r#"<tr><td><a href="/product/{}">{}</a></td><td>{}</td></tr>"#,
            top.product_id,
            escape(&top.title),
            top.views
        ));
    }
    body.push_str("</tbody></table></section>");

    body.push_str(r#"<section class="panel"><h2>Clicks by type</h2><table><tbody>"#);
    for clicks in &summary.clicks_by_type {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            escape(&clicks.click_type),
            clicks.clicks
        ));
    }
    body.push_str("</tbody></table></section>");

    admin_layout("Analytics", &body)
}

pub fn login(error: Option<&str>) -> String {
    let error_html = error
        .filter(|e| !e.is_empty())
        .map(|e| format!(r#"<div class="error">❌ {}</div>"#, escape(e)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width,initial-scale=1.0">
<meta name="robots" content="noindex">
<title>Admin Login | {STORE_NAME}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body class="login">
<div class="login-card">
  <div class="lock">🔐</div>
  <div class="logo">{STORE_NAME}</div>
  <div class="sub">Admin Panel</div>
  {error_html}
  <form method="POST" action="/admin/login">
    <input type="password" name="password" placeholder="Enter admin password" autofocus required>
    <button type="submit" class="btn">Login →</button>
  </form>
  <a href="/" class="back">← Back to Store</a>
</div>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_error_is_escaped() {
        let html = login(Some("<img src=x>"));
        assert!(html.contains("&lt;img src=x&gt;"));
        assert!(!html.contains("<img src=x>"));
        assert!(!login(None).contains("class=\"error\""));
    }

    #[test]
    fn category_options_mark_selection() {
        let html = category_options("Home & Decor");
        assert!(html.contains(r#"<option value="Home &amp; Decor" selected>"#));
    }
}
