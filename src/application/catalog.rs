//! Catalog use cases behind the storefront and admin pages

use std::collections::HashSet;

use anyhow::Result;

use crate::domain::analytics::{AnalyticsSummary, SiteStats};
use crate::domain::catalog::SortOrder;
use crate::domain::product::Product;
use crate::infrastructure::analytics_repository::AnalyticsRepository;
use crate::infrastructure::product_repository::ProductRepository;

const FEATURED_LIMIT: usize = 5;
const RELATED_LIMIT: usize = 4;

/// Products sharing a display category, in store order
#[derive(Debug, Clone)]
pub struct CategoryGroup {
    pub name: String,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone)]
pub struct HomePage {
    pub products: Vec<Product>,
    pub categories: Vec<CategoryGroup>,
    pub new_arrivals: Vec<Product>,
    pub best_sellers: Vec<Product>,
    pub featured: Vec<Product>,
    pub stats: SiteStats,
}

#[derive(Debug, Clone)]
pub struct ProductPage {
    pub product: Product,
    pub images: Vec<String>,
    pub related: Vec<Product>,
}

#[derive(Debug, Clone)]
pub struct CategoryPage {
    pub category: String,
    pub products: Vec<Product>,
    pub sort: SortOrder,
    pub categories: Vec<String>,
}

#[derive(Clone)]
pub struct CatalogService {
    products: ProductRepository,
    analytics: AnalyticsRepository,
}

impl CatalogService {
    pub fn new(products: ProductRepository, analytics: AnalyticsRepository) -> Self {
        Self { products, analytics }
    }

    pub async fn home_page(&self) -> Result<HomePage> {
        let products = self.products.list().await?;
        let new_arrivals = self.products.new_arrivals().await?;
        let best_sellers = self.products.best_sellers().await?;
        let stats = self.analytics.site_stats().await?;

        Ok(HomePage {
            categories: group_by_category(&products),
            featured: featured_products(&best_sellers, &new_arrivals, &products),
            products,
            new_arrivals,
            best_sellers,
            stats,
        })
    }

    pub async fn product_page(&self, id: i64) -> Result<Option<ProductPage>> {
        let Some(product) = self.products.get(id).await? else {
            return Ok(None);
        };

        let candidates = if product.category.is_empty() {
            Vec::new()
        } else {
            self.products.by_category(&product.category).await?
        };

        Ok(Some(ProductPage {
            images: product.image_list(),
            related: related_products(&product, candidates),
            product,
        }))
    }

    /// Blank queries match nothing
    pub async fn search(&self, query: &str) -> Result<Vec<Product>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.products.search(query).await
    }

    pub async fn category_page(&self, name: &str, sort: SortOrder) -> Result<CategoryPage> {
        let mut products = self.products.by_category(name).await?;
        sort.apply(&mut products);

        Ok(CategoryPage {
            category: name.to_string(),
            products,
            sort,
            categories: self.products.categories().await?,
        })
    }

    pub async fn analytics_summary(&self) -> Result<AnalyticsSummary> {
        let mut summary = self.analytics.summary().await?;
        summary.product_count = self.products.count().await?;
        Ok(summary)
    }
}

/// Group by display category in first-seen order
pub fn group_by_category(products: &[Product]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    for product in products {
        let name = product.display_category();
        match groups.iter_mut().find(|g| g.name == name) {
            Some(group) => group.products.push(product.clone()),
            None => groups.push(CategoryGroup {
                name: name.to_string(),
                products: vec![product.clone()],
            }),
        }
    }
    groups
}

/// Hero carousel: best sellers, then new arrivals, padded with recent products
pub fn featured_products(best_sellers: &[Product], new_arrivals: &[Product], all: &[Product]) -> Vec<Product> {
    let mut seen = HashSet::new();
    let mut featured: Vec<Product> = best_sellers
        .iter()
        .chain(new_arrivals)
        .filter(|p| seen.insert(p.id))
        .cloned()
        .collect();

    for product in all {
        if featured.len() >= FEATURED_LIMIT {
            break;
        }
        if seen.insert(product.id) {
            featured.push(product.clone());
        }
    }

    featured.truncate(FEATURED_LIMIT);
    featured
}

/// Other products of the same category; uncategorized products have none
pub fn related_products(product: &Product, candidates: Vec<Product>) -> Vec<Product> {
    if product.category.is_empty() {
        return Vec::new();
    }
    candidates
        .into_iter()
        .filter(|p| p.id != product.id && p.category == product.category)
        .take(RELATED_LIMIT)
        .collect()
}
