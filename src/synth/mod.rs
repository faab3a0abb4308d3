//! Deterministic content synthesis: every draw comes from a generator seeded
//! by a purpose tag and the product identifier.

pub mod copy;
pub mod rng;
pub mod title;

use crate::lexicon::Lexicon;
use crate::parser::ParsedPage;
use copy::{DescriptionBlock, SocialProof};

#[derive(Debug, Clone)]
pub struct SynthesizedCopy {
    pub title: String,
    pub social_proof: SocialProof,
    pub short_description: String,
    pub long_description: String,
    pub long_description_blocks: Vec<DescriptionBlock>,
}

pub fn synthesize(page: &ParsedPage, lexicon: &Lexicon) -> SynthesizedCopy {
    let f = &page.fields;
    let asin = page.asin.as_str();

    let title = title::rewrite(asin, &f.title, &f.brand, &f.category, lexicon);
    let short_description = copy::short_body(asin, &title, &f.specs, lexicon);
    let long = copy::long_body(&title, &f.bullets, &f.specs, &f.sizes, &f.colors, lexicon);
    let blocks = copy::long_blocks(
        &title,
        &long,
        page.resolved.images.illustrations(),
        lexicon,
    );

    SynthesizedCopy {
        social_proof: copy::social_proof(asin, &lexicon.limits),
        long_description: copy::blocks_text(&blocks),
        long_description_blocks: blocks,
        short_description,
        title,
    }
}
