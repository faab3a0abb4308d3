pub mod gallery;
pub mod url;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::lexicon::Lexicon;
use crate::parser::document::SourceDocument;
use crate::parser::extract::ExtractedFields;

/// Gallery and description imagery of one product. The two lists never
/// share a URL.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageSet {
    pub gallery: Vec<String>,
    pub description: Vec<String>,
}

impl ImageSet {
    /// Images used to illustrate long-form copy; the gallery stands in when
    /// the page has no description imagery of its own.
    pub fn illustrations(&self) -> &[String] {
        if self.description.is_empty() {
            &self.gallery
        } else {
            &self.description
        }
    }
}

#[derive(Debug, Default)]
pub struct ResolvedImages {
    pub images: ImageSet,
    pub color_image_key: IndexMap<String, String>,
}

pub fn resolve(doc: &SourceDocument, fields: &ExtractedFields, lexicon: &Lexicon) -> ResolvedImages {
    let limits = &lexicon.limits;

    let base = gallery::extract_gallery(doc, lexicon);
    let gallery =
        gallery::merge_color_images(&base, &fields.color_images, limits.gallery_cap);
    let color_image_key =
        gallery::color_image_keys(&gallery, &fields.color_images, &fields.color_swatches);

    let candidates = gallery::description_candidates(doc, lexicon);
    let description = gallery::separate_from_gallery(candidates, &gallery);
    if description.is_empty() {
        debug!(path = ?doc.path, "no description imagery; long copy will reuse the gallery");
    }

    ResolvedImages {
        images: ImageSet {
            gallery,
            description,
        },
        color_image_key,
    }
}
