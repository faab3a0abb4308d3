use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use super::cross_sell::ProductCard;
use super::ProductDraft;
use crate::parser::extract::{category, Review, SizeChart, Video};
use crate::parser::text::slugify;
use crate::synth::copy::{DescriptionBlock, SocialProof};

#[derive(Debug, Clone, Serialize)]
pub struct Variations {
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub size_chart: Option<SizeChart>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewSummary {
    pub average_rating: Option<f64>,
    pub count: Option<u32>,
    pub customers_say: Option<String>,
    pub items: Vec<Review>,
}

/// The storefront's product document. Field order is the JSON key order.
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalProductRecord {
    pub id: String,
    pub handle: String,
    pub sku: String,
    pub asin: String,
    pub title: String,
    pub title_original: String,
    pub brand: String,
    pub price: Option<f64>,
    pub social_proof: SocialProof,
    pub images: Vec<String>,
    pub description_images: Vec<String>,
    pub bullets: Vec<String>,
    pub specs: IndexMap<String, String>,
    pub category: String,
    pub category_path: Vec<String>,
    pub category_slug: String,
    pub category_leaf: String,
    pub variations: Variations,
    pub reviews: ReviewSummary,
    pub short_description: String,
    pub long_description: String,
    pub long_description_blocks: Vec<DescriptionBlock>,
    pub videos: Vec<Video>,
    pub color_swatches: IndexMap<String, String>,
    pub color_image_key: IndexMap<String, String>,
    pub color_images: IndexMap<String, Vec<String>>,
    pub related: Vec<ProductCard>,
    pub customer_also_viewed: Vec<ProductCard>,
}

pub fn sku(n: usize) -> String {
    format!("JC{}", 1000 + n)
}

/// Hands out file-safe handles, never the same one twice in a batch.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    taken: HashSet<String>,
}

impl HandleRegistry {
    pub fn claim(&mut self, title: &str, asin: &str) -> String {
        let mut handle = slugify(title);
        if handle == "product" {
            handle = slugify(&format!("{} {}", title, asin));
        }
        if self.taken.contains(&handle) {
            handle = format!("{}-{}", handle, asin.to_lowercase());
        }
        let base = handle.clone();
        let mut n = 2;
        while self.taken.contains(&handle) {
            handle = format!("{}-{}", base, n);
            n += 1;
        }
        self.taken.insert(handle.clone());
        handle
    }
}

impl CanonicalProductRecord {
    pub fn assemble(draft: ProductDraft, sku: String, handle: String) -> Self {
        let ProductDraft { page, copy } = draft;
        let f = page.fields;
        let images = page.resolved.images;

        let category_path = category::path(&f.category);
        let category_slug = category::slug(&category_path);
        let category_leaf = category_path.last().cloned().unwrap_or_default();

        CanonicalProductRecord {
            id: handle.clone(),
            handle,
            sku,
            asin: page.asin,
            title: copy.title,
            title_original: f.title,
            brand: f.brand,
            price: f.price,
            social_proof: copy.social_proof,
            images: images.gallery,
            description_images: images.description,
            bullets: f.bullets,
            specs: f.specs,
            category: f.category,
            category_path,
            category_slug,
            category_leaf,
            variations: Variations {
                sizes: f.sizes,
                colors: f.colors,
                size_chart: f.size_chart,
            },
            reviews: ReviewSummary {
                average_rating: f.review_avg,
                count: f.review_count,
                customers_say: f.customers_say,
                items: f.reviews,
            },
            short_description: copy.short_description,
            long_description: copy.long_description,
            long_description_blocks: copy.long_description_blocks,
            videos: f.videos,
            color_swatches: f.color_swatches,
            color_image_key: page.resolved.color_image_key,
            color_images: f.color_images,
            related: Vec::new(),
            customer_also_viewed: Vec::new(),
        }
    }
}
