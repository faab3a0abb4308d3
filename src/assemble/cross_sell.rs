use serde::Serialize;

use super::record::CanonicalProductRecord;
use crate::lexicon::Limits;
use crate::synth::rng;

/// Compact product reference used in cross-sell lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCard {
    pub id: String,
    pub title: String,
    pub price: Option<f64>,
    pub category: String,
    pub images: Vec<String>,
}

impl ProductCard {
    /// Only records with at least one gallery image can be shown as a card.
    pub fn from_record(r: &CanonicalProductRecord) -> Option<Self> {
        let hero = r.images.first()?;
        Some(ProductCard {
            id: r.id.clone(),
            title: r.title.clone(),
            price: r.price,
            category: r.category.clone(),
            images: vec![hero.clone()],
        })
    }
}

fn pick(tag: &str, asin: &str, pool: &[ProductCard], n: usize) -> Vec<ProductCard> {
    let mut cards = pool.to_vec();
    rng::shuffle(&mut rng::seeded(tag, asin), &mut cards);
    cards.truncate(n);
    cards
}

/// Fill `related` and `customer_also_viewed` from the finished batch. Runs
/// after every record exists; a record never lists itself.
pub fn attach(records: &mut [CanonicalProductRecord], limits: &Limits) {
    let cards: Vec<ProductCard> = records.iter().filter_map(ProductCard::from_record).collect();

    for r in records.iter_mut() {
        let pool: Vec<ProductCard> = cards.iter().filter(|c| c.id != r.id).cloned().collect();
        r.related = pick("related:", &r.asin, &pool, limits.related_count);
        r.customer_also_viewed = pick("viewed:", &r.asin, &pool, limits.also_viewed_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::tests::sample_record;

    #[test]
    fn ten_record_batch() {
        let mut records: Vec<_> = (0..10).map(sample_record).collect();
        attach(&mut records, &Limits::default());

        for r in &records {
            assert_eq!(r.related.len(), 5);
            assert_eq!(r.customer_also_viewed.len(), 8);
            assert!(r.related.iter().all(|c| c.id != r.id));
            assert!(r.customer_also_viewed.iter().all(|c| c.id != r.id));
            assert!(r.related.iter().all(|c| c.images.len() == 1));
        }
    }

    #[test]
    fn imageless_records_are_not_cards() {
        let mut records: Vec<_> = (0..3).map(sample_record).collect();
        records[1].images.clear();
        attach(&mut records, &Limits::default());

        assert_eq!(records[0].related.len(), 1);
        assert_eq!(records[1].related.len(), 2);
        assert!(records[0].related.iter().all(|c| c.id != records[1].id));
    }

    #[test]
    fn linkage_is_deterministic() {
        let mut a: Vec<_> = (0..10).map(sample_record).collect();
        let mut b: Vec<_> = (0..10).map(sample_record).collect();
        attach(&mut a, &Limits::default());
        attach(&mut b, &Limits::default());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.related, y.related);
            assert_eq!(x.customer_also_viewed, y.customer_also_viewed);
        }
    }
}
