pub mod blob;
pub mod document;
pub mod extract;
pub mod text;

use std::path::Path;

use tracing::debug;

use crate::error::PipelineError;
use crate::images::{self, ResolvedImages};
use crate::lexicon::Lexicon;
use document::SourceDocument;
use extract::ExtractedFields;

/// Everything read from one product page before any copy is synthesized.
#[derive(Debug)]
pub struct ParsedPage {
    pub asin: String,
    pub fields: ExtractedFields,
    pub resolved: ResolvedImages,
}

/// Load → identify → extract fields → resolve imagery.
pub fn process_page(path: &Path, lexicon: &Lexicon) -> Result<ParsedPage, PipelineError> {
    let doc = SourceDocument::load(path)?;
    let asin = doc
        .identifier()
        .ok_or_else(|| PipelineError::MissingIdentifier(path.to_path_buf()))?;

    let mut fields = extract::extract_all(&doc, lexicon);
    if fields.title.is_empty() {
        fields.title = format!("Product {}", asin);
    }
    let resolved = images::resolve(&doc, &fields, lexicon);

    debug!(
        %asin,
        gallery = resolved.images.gallery.len(),
        description = resolved.images.description.len(),
        sizes = fields.sizes.len(),
        colors = fields.colors.len(),
        "parsed page"
    );
    Ok(ParsedPage {
        asin,
        fields,
        resolved,
    })
}
