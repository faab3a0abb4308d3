pub mod cross_sell;
pub mod index;
pub mod record;

use std::collections::HashSet;
use std::path::Path;

use tracing::warn;

use crate::error::PipelineError;
use crate::lexicon::Lexicon;
use crate::parser::{self, ParsedPage};
use crate::synth::{self, SynthesizedCopy};
use record::{CanonicalProductRecord, HandleRegistry};

/// Per-document result of the parallel stage.
#[derive(Debug)]
pub struct ProductDraft {
    pub page: ParsedPage,
    pub copy: SynthesizedCopy,
}

pub fn draft(path: &Path, lexicon: &Lexicon) -> Result<ProductDraft, PipelineError> {
    let page = parser::process_page(path, lexicon)?;
    let copy = synth::synthesize(&page, lexicon);
    Ok(ProductDraft { page, copy })
}

/// Number the drafts in input order, give each a unique handle, then link
/// cross-sells across the finished batch. A later draft repeating an
/// identifier already in the batch is dropped.
pub fn assemble_batch(drafts: Vec<ProductDraft>, lexicon: &Lexicon) -> Vec<CanonicalProductRecord> {
    let mut seen = HashSet::new();
    let mut handles = HandleRegistry::default();
    let mut records: Vec<CanonicalProductRecord> = drafts
        .into_iter()
        .filter(|d| {
            let first = seen.insert(d.page.asin.clone());
            if !first {
                warn!(asin = %d.page.asin, "skipping duplicate identifier");
            }
            first
        })
        .enumerate()
        .map(|(n, d)| {
            let handle = handles.claim(&d.copy.title, &d.page.asin);
            CanonicalProductRecord::assemble(d, record::sku(n), handle)
        })
        .collect();
    cross_sell::attach(&mut records, &lexicon.limits);
    records
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::assemble::index::BatchIndexes;
    use crate::synth::copy::SocialProof;
    use crate::synth::title::VALID_TITLE_RE;
    use indexmap::IndexMap;
    use record::{ReviewSummary, Variations};

    pub(crate) fn sample_record(i: usize) -> CanonicalProductRecord {
        CanonicalProductRecord {
            id: format!("womens-dress-{}", i),
            handle: format!("womens-dress-{}", i),
            sku: record::sku(i),
            asin: format!("B0SAMPLE{:02}", i),
            title: format!("Womens Dress {}", i),
            title_original: format!("Dress {}", i),
            brand: String::new(),
            price: Some(20.0 + i as f64),
            social_proof: SocialProof {
                bought_past_month: 50,
                text: "50+ bought in the past month".into(),
            },
            images: vec![format!("https://m.media-amazon.com/images/I/IMG{}._SL1500_.jpg", i)],
            description_images: Vec::new(),
            bullets: Vec::new(),
            specs: IndexMap::new(),
            category: "Women > Dresses".into(),
            category_path: vec!["Women".into(), "Dresses".into()],
            category_slug: "women/dresses".into(),
            category_leaf: "Dresses".into(),
            variations: Variations {
                sizes: Vec::new(),
                colors: Vec::new(),
                size_chart: None,
            },
            reviews: ReviewSummary {
                average_rating: None,
                count: None,
                customers_say: None,
                items: Vec::new(),
            },
            short_description: String::new(),
            long_description: String::new(),
            long_description_blocks: Vec::new(),
            videos: Vec::new(),
            color_swatches: IndexMap::new(),
            color_image_key: IndexMap::new(),
            color_images: IndexMap::new(),
            related: Vec::new(),
            customer_also_viewed: Vec::new(),
        }
    }

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
    }

    fn fixture_drafts(lex: &Lexicon) -> Vec<ProductDraft> {
        [
            "B0DRESS001 - Blue Maxi Dress.html",
            "no-identifier.html",
            "B0SANDAL02 - Platform Sandals.html",
        ]
        .iter()
        .filter_map(|name| draft(&fixture(name), lex).ok())
        .collect()
    }

    #[test]
    fn missing_identifier_is_rejected() {
        let lex = Lexicon::default();
        let err = draft(&fixture("no-identifier.html"), &lex).unwrap_err();
        assert!(matches!(err, PipelineError::MissingIdentifier(_)));
        let err = draft(&fixture("does-not-exist.html"), &lex).unwrap_err();
        assert!(matches!(err, PipelineError::Read { .. }));
    }

    #[test]
    fn fixture_batch() {
        let lex = Lexicon::default();
        let records = assemble_batch(fixture_drafts(&lex), &lex);
        assert_eq!(records.len(), 2);

        let dress = &records[0];
        assert_eq!(dress.asin, "B0DRESS001");
        assert_eq!(dress.sku, "JC1000");
        assert!(dress.title.starts_with("Womens Maxi Dress"));
        assert!(VALID_TITLE_RE.is_match(&dress.title));
        assert_eq!(dress.handle, crate::parser::text::slugify(&dress.title));
        assert_eq!(dress.category_leaf, "Dresses");
        assert_eq!(dress.category_slug, "clothing-shoes-jewelry/women/clothing/dresses");
        assert!(dress
            .description_images
            .iter()
            .all(|u| !dress.images.contains(u)));
        assert!(dress
            .color_image_key
            .values()
            .all(|k| dress.images.iter().any(|u| u.contains(k.as_str()))));
        let n = crate::parser::text::word_count(&dress.short_description);
        assert!((180..=220).contains(&n));

        let sandals = &records[1];
        assert_eq!(sandals.sku, "JC1001");
        assert_eq!(sandals.title, "Womens Heeled Sandals Platform");
        assert!(sandals.description_images.is_empty());
        // gallery stands in for missing description imagery
        assert!(sandals
            .long_description_blocks
            .iter()
            .any(|b| matches!(b, crate::synth::copy::DescriptionBlock::Image { .. })));

        assert_eq!(dress.related.len(), 1);
        assert_eq!(dress.related[0].id, sandals.id);

        let idx = BatchIndexes::build(&records);
        assert_eq!(idx.products.len(), 2);
        assert!(idx.asin_map.keys().all(|a| a.starts_with("B0")));
        let listed: usize = idx.categories.values().map(|c| c.count).sum();
        assert_eq!(listed, 2);
    }

    #[test]
    fn repeated_identifier_keeps_first_draft() {
        let lex = Lexicon::default();
        let tmp = tempfile::tempdir().unwrap();
        let copies = [
            ("B0DRESS001 - Blue Maxi Dress.html", "B0DUPE0001 - Blue Maxi Dress.html"),
            ("B0SANDAL02 - Platform Sandals.html", "B0DUPE0001 - Platform Sandals.html"),
            ("B0SANDAL02 - Platform Sandals.html", "B0SANDAL02 - Platform Sandals.html"),
        ];
        let drafts: Vec<ProductDraft> = copies
            .iter()
            .map(|(src, dst)| {
                let path = tmp.path().join(dst);
                std::fs::copy(fixture(src), &path).unwrap();
                draft(&path, &lex).unwrap()
            })
            .collect();

        let records = assemble_batch(drafts, &lex);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].asin, "B0DUPE0001");
        assert!(records[0].title.starts_with("Womens Maxi Dress"));
        assert_eq!(records[1].asin, "B0SANDAL02");
        assert_eq!(records[1].sku, "JC1001");

        for r in &records {
            assert!(r.related.iter().all(|c| c.id != r.id));
            assert_eq!(r.related.len(), 1);
        }

        let idx = BatchIndexes::build(&records);
        assert_eq!(idx.asin_map.len(), 2);
        assert_eq!(idx.asin_map["B0DUPE0001"], records[0].id);
    }

    #[test]
    fn drafts_are_reproducible() {
        let lex = Lexicon::default();
        let a = assemble_batch(fixture_drafts(&lex), &lex);
        let b = assemble_batch(fixture_drafts(&lex), &lex);
        let a = serde_json::to_string(&a).unwrap();
        let b = serde_json::to_string(&b).unwrap();
        assert_eq!(a, b);
    }
}
