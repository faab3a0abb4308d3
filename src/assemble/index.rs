use indexmap::IndexMap;
use serde::Serialize;

use super::record::CanonicalProductRecord;

pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexEntry {
    pub id: String,
    pub asin: String,
    pub sku: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryProduct {
    pub id: String,
    pub asin: String,
    pub sku: String,
    pub title: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBucket {
    pub slug: String,
    pub leaf: String,
    pub path: Vec<String>,
    pub count: usize,
    pub products: Vec<CategoryProduct>,
}

/// Batch-level lookups persisted next to the records.
#[derive(Debug, Default, Serialize)]
pub struct BatchIndexes {
    pub products: Vec<IndexEntry>,
    pub asin_map: IndexMap<String, String>,
    pub categories: IndexMap<String, CategoryBucket>,
}

impl BatchIndexes {
    pub fn build(records: &[CanonicalProductRecord]) -> Self {
        let mut idx = BatchIndexes::default();
        for r in records {
            idx.products.push(IndexEntry {
                id: r.id.clone(),
                asin: r.asin.clone(),
                sku: r.sku.clone(),
                title: r.title.clone(),
            });
            idx.asin_map.insert(r.asin.clone(), r.id.clone());

            let slug = match r.category_slug.trim() {
                "" => UNCATEGORIZED.to_string(),
                s => s.to_string(),
            };
            let bucket = idx
                .categories
                .entry(slug.clone())
                .or_insert_with(|| CategoryBucket {
                    slug,
                    leaf: r.category_leaf.clone(),
                    path: r.category_path.clone(),
                    count: 0,
                    products: Vec::new(),
                });
            bucket.products.push(CategoryProduct {
                id: r.id.clone(),
                asin: r.asin.clone(),
                sku: r.sku.clone(),
                title: r.title.clone(),
                image: r.images.first().cloned(),
            });
            bucket.count += 1;
        }
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::tests::sample_record;

    #[test]
    fn groups_by_category_slug() {
        let mut records: Vec<_> = (0..4).map(sample_record).collect();
        records[3].category_slug.clear();
        records[3].category_path.clear();
        records[3].category_leaf.clear();
        records[2].images.clear();

        let idx = BatchIndexes::build(&records);
        assert_eq!(idx.products.len(), 4);
        assert_eq!(idx.asin_map.get(&records[1].asin), Some(&records[1].id));

        let dresses = &idx.categories["women/dresses"];
        assert_eq!(dresses.count, 3);
        assert_eq!(dresses.leaf, "Dresses");
        assert_eq!(dresses.products[2].image, None);

        let other = &idx.categories[UNCATEGORIZED];
        assert_eq!(other.count, 1);
        assert!(other.path.is_empty());
        assert_eq!(other.products[0].sku, records[3].sku);
    }
}
