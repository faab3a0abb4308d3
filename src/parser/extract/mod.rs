//! Field extractors. Each field is read through an ordered list of pure
//! strategies; the first one that yields a value wins and a field that no
//! strategy finds is left empty.

pub mod category;
pub mod product;
pub mod reviews;
pub mod variations;
pub mod videos;

use indexmap::IndexMap;

use crate::images::gallery;
use crate::lexicon::Lexicon;
use crate::parser::document::SourceDocument;
use crate::parser::text::uniq_keep_order;

pub use reviews::Review;
pub use variations::SizeChart;
pub use videos::Video;

pub type Strategy<T> = fn(&SourceDocument) -> Option<T>;

pub fn first_success<T>(doc: &SourceDocument, strategies: &[Strategy<T>]) -> Option<T> {
    strategies.iter().find_map(|s| s(doc))
}

#[derive(Debug, Default)]
pub struct ExtractedFields {
    pub title: String,
    pub brand: String,
    pub price: Option<f64>,
    pub bullets: Vec<String>,
    pub specs: IndexMap<String, String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub color_swatches: IndexMap<String, String>,
    pub color_images: IndexMap<String, Vec<String>>,
    pub reviews: Vec<Review>,
    pub videos: Vec<Video>,
    pub category: String,
    pub review_avg: Option<f64>,
    pub review_count: Option<u32>,
    pub customers_say: Option<String>,
    pub size_chart: Option<SizeChart>,
}

pub fn extract_all(doc: &SourceDocument, lexicon: &Lexicon) -> ExtractedFields {
    let limits = &lexicon.limits;

    let title = product::title(doc);
    let category = category::extract(doc);

    let (sizes, colors) = variations::extract(doc, lexicon);
    let sizes = variations::correct_sizes(sizes, &title, &category, lexicon);
    let size_chart = variations::size_chart(doc, &sizes, lexicon);

    // Swatches from the colour payload win over the ones in the markup.
    let media = gallery::color_media(doc);
    let mut color_swatches = variations::swatches(doc);
    color_swatches.extend(media.swatches);
    let colors = if color_swatches.is_empty() {
        colors
    } else {
        let mut merged = uniq_keep_order(colors.into_iter().chain(color_swatches.keys().cloned()));
        merged.truncate(limits.color_cap);
        merged
    };

    let (review_avg, review_count) = reviews::summary(doc);

    ExtractedFields {
        brand: product::brand(doc),
        price: product::price(doc),
        bullets: product::bullets(doc, limits.bullet_cap),
        specs: product::specs(doc),
        reviews: reviews::extract(doc, limits.review_cap),
        customers_say: reviews::customers_say(doc),
        videos: videos::extract(&doc.raw, limits.video_cap),
        color_images: media.images,
        title,
        category,
        sizes,
        colors,
        color_swatches,
        review_avg,
        review_count,
        size_chart,
    }
}
