use crate::application::catalog::{CategoryPage, HomePage, ProductPage};
use crate::domain::catalog::{KNOWN_CATEGORIES, SortOrder, category_emoji, category_gif, format_price, image_src};
use crate::domain::product::Product;

use super::{STORE_NAME, badges, escape, layout, price_block, product_grid, query_encode};

const SORT_OPTIONS: [(SortOrder, &str); 4] = [
    (SortOrder::Newest, "Newest"),
    (SortOrder::PriceAsc, "Price: Low to High"),
    (SortOrder::PriceDesc, "Price: High to Low"),
    (SortOrder::Bestseller, "Bestsellers"),
];

pub fn home(page: &HomePage) -> String {
    let mut body = String::new();

    body.push_str(r#"<section class="hero"><div class="slides">"#);
    body.push_str(&format!(
        r#"<div class="slide welcome"><h1>Welcome to {STORE_NAME}</h1><p>Handpicked products, delivered to your door.</p></div>"#
    ));
    for product in &page.featured {
        body.push_str(&format!(
            r#"<a class="slide" href="/product/{}"><img src="{}" alt="{}"><div class="slide-caption"><h2>{}</h2>{}</div></a>"#,
            product.id,
            escape(&image_src(&product.image_url)),
            escape(&product.title),
            escape(&product.title),
            price_block(product),
        ));
    }
    body.push_str("</div></section>");

    body.push_str(&format!(
        r#"<section class="stats"><div><strong>{}</strong> products</div><div><strong>{}</strong> visits</div><div><strong>{}</strong> happy visitors</div><div><strong>{}</strong> orders started</div></section>"#,
        page.products.len(),
        page.stats.total_views,
        page.stats.unique_visitors,
        page.stats.clicks,
    ));

    if !page.categories.is_empty() {
        body.push_str(r#"<section class="categories"><h2>Shop by category</h2><div class="category-tiles">"#);
        for group in &page.categories {
            body.push_str(&format!(
                r#"<a class="category-tile" href="/category/{}"><img src="{}" alt="{}" width="64" height="64"><span>{} {}</span><small>{} items</small></a>"#,
                query_encode(&group.name).replace('+', "%20"),
                category_gif(&group.name),
                category_emoji(&group.name),
                category_emoji(&group.name),
                escape(&group.name),
                group.products.len(),
            ));
        }
        body.push_str("</div></section>");
    }

    push_shelf(&mut body, "Bestsellers", &page.best_sellers);
    push_shelf(&mut body, "New arrivals", &page.new_arrivals);

    for group in &page.categories {
        body.push_str(&format!(
            r#"<section class="shelf"><h2>{} {}</h2>{}</section>"#,
            category_emoji(&group.name),
            escape(&group.name),
            product_grid(&group.products),
        ));
    }

    layout(
        STORE_NAME,
        "Trending caps, beauty, fashion, home and kitchen finds at great prices.",
        &body,
    )
}

fn push_shelf(body: &mut String, title: &str, products: &[Product]) {
    if products.is_empty() {
        return;
    }
    body.push_str(&format!(r#"<section class="shelf"><h2>{}</h2>{}</section>"#, escape(title), product_grid(products)));
}

/// Product detail page; `base` is the public origin used for the share QR code
pub fn product(page: &ProductPage, base: &str) -> String {
    let product = &page.product;
    let mut body = String::from(r#"<article class="product-detail"><div class="gallery">"#);

    for (index, image) in page.images.iter().enumerate() {
        let class = if index == 0 { "main" } else { "thumb" };
        body.push_str(&format!(
            r#"<img class="{class}" src="{}" alt="{}">"#,
            escape(&image_src(image)),
            escape(&product.title),
        ));
    }
    body.push_str("</div>");

    body.push_str(&format!(
        r#"<div class="info"><p class="breadcrumbs"><a href="/">Home</a> / <a href="/category/{cat_link}">{cat}</a></p><h1>{title}</h1>{badges}<div class="price-line">{price}</div>"#,
        cat_link = query_encode(product.display_category()).replace('+', "%20"),
        cat = escape(product.display_category()),
        title = escape(&product.title),
        badges = badges(product),
        price = price_block(product),
    ));

    if !product.rating.is_empty() {
        body.push_str(&format!(r#"<p class="rating">★ {} / 5</p>"#, escape(&product.rating)));
    }
    if !product.description.is_empty() {
        body.push_str(&format!(r#"<p class="description">{}</p>"#, escape(&product.description)));
    }
    if !product.long_description.is_empty() {
        body.push_str(&format!(
            r#"<div class="long-description">{}</div>"#,
            escape(&product.long_description).replace('\n', "<br>")
        ));
    }

    let order_text = format!(
        "Hi! I'd like to order: {} ({})",
        product.title,
        format_price(&product.price)
    );
    body.push_str(&format!(
        r#"<div class="actions"><a class="btn order" data-track-click="order" data-product-id="{id}" href="https://wa.me/?text={order}" target="_blank" rel="noopener">Order on WhatsApp</a>"#,
        id = product.id,
        order = escape(&query_encode(&order_text)),
    ));
    if !product.url.is_empty() {
        body.push_str(&format!(
            r#"<a class="btn secondary" data-track-click="platform" data-product-id="{}" href="{}" target="_blank" rel="noopener">View on {}</a>"#,
            product.id,
            escape(&product.url),
            escape(&product.platform),
        ));
    }
    body.push_str(&format!(
        r#"<button class="btn share" data-track-click="share" data-product-id="{}" type="button">Share</button></div><img class="qr" src="/api/qr?url={}&amp;size=160" alt="QR code" width="160" height="160"></div></article>"#,
        product.id,
        escape(&query_encode(&format!("{base}/product/{}", product.id))),
    ));

    if !page.related.is_empty() {
        body.push_str(&format!(
            r#"<section class="shelf related"><h2>You may also like</h2>{}</section>"#,
            product_grid(&page.related)
        ));
    }

    let description = if product.description.is_empty() {
        format!("{} at {}", product.title, STORE_NAME)
    } else {
        product.description.clone()
    };
    layout(&format!("{} | {}", product.title, STORE_NAME), &description, &body)
}

pub fn search(query: &str, products: &[Product]) -> String {
    let heading = if query.is_empty() {
        "Search the store".to_string()
    } else {
        format!("{} results for \"{}\"", products.len(), query)
    };
    let mut body = format!(
        r#"<section class="search-page"><h1>{}</h1><form action="/search" method="GET"><input type="search" name="q" value="{}" autofocus><button class="btn">Search</button></form>"#,
        escape(&heading),
        escape(query),
    );
    if !query.is_empty() {
        body.push_str(&product_grid(products));
    } else {
        body.push_str(r#"<div class="suggestions">"#);
        for category in KNOWN_CATEGORIES {
            body.push_str(&format!(
                r#"<a class="chip" href="/search?q={}">{} {}</a>"#,
                query_encode(category),
                category_emoji(category),
                escape(category),
            ));
        }
        body.push_str("</div>");
    }
    body.push_str("</section>");

    layout(&format!("Search | {STORE_NAME}"), "Search the catalog", &body)
}

pub fn category(page: &CategoryPage) -> String {
    let path = format!("/category/{}", query_encode(&page.category).replace('+', "%20"));
    let mut body = format!(
        r#"<section class="category-page"><h1>{} {}</h1><p class="count">{} products</p><nav class="sort">"#,
        category_emoji(&page.category),
        escape(&page.category),
        page.products.len(),
    );

    for (order, label) in SORT_OPTIONS {
        let class = if order == page.sort { "chip active" } else { "chip" };
        body.push_str(&format!(r#"<a class="{class}" href="{path}?sort={}">{label}</a>"#, order.as_str()));
    }
    body.push_str("</nav>");

    if !page.categories.is_empty() {
        body.push_str(r#"<nav class="category-list">"#);
        for name in &page.categories {
            let class = if *name == page.category { "chip active" } else { "chip" };
            body.push_str(&format!(
                r#"<a class="{class}" href="/category/{}">{}</a>"#,
                query_encode(name).replace('+', "%20"),
                escape(name),
            ));
        }
        body.push_str("</nav>");
    }

    body.push_str(&product_grid(&page.products));
    body.push_str("</section>");

    layout(
        &format!("{} | {}", page.category, STORE_NAME),
        &format!("Shop {} at {}", page.category, STORE_NAME),
        &body,
    )
}
