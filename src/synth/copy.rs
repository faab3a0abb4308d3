use std::collections::HashSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use super::{rng, title};
use crate::images::url::force_hd;
use crate::lexicon::{Lexicon, Limits};
use crate::parser::text::{clean_ws, uniq_keep_order, word_count};

static PARA_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());
static KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

const FABRIC_KEYS: &[&str] = &["Fabric type", "Material", "Fabric"];
const CARE_KEYS: &[&str] = &["Care instructions", "Care"];

/// Word count past which a lone paragraph is re-split for readability.
const RESPLIT_MIN_WORDS: usize = 90;
const RESPLIT_CHUNK: usize = 70;

const SIZE_NOTE_CAP: usize = 12;
const HIGHLIGHT_CAP: usize = 12;
const COLOR_NOTE_CAP: usize = 14;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DescriptionBlock {
    #[serde(rename = "p")]
    Paragraph { text: String },
    #[serde(rename = "img")]
    Image { src: String, alt: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialProof {
    pub bought_past_month: u32,
    pub text: String,
}

fn spec_value(specs: &IndexMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| specs.get(*k))
        .map(|v| clean_ws(v))
        .find(|v| !v.is_empty())
}

fn paragraphs(text: &str) -> Vec<String> {
    PARA_BREAK_RE
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keep whole paragraphs while they fit in `max` words; the paragraph that
/// crosses the limit is cut at a word boundary.
fn truncate_paragraphs(paras: Vec<String>, max: usize) -> Vec<String> {
    let mut remaining = max;
    let mut kept = Vec::new();
    for p in paras {
        let n = word_count(&p);
        if n <= remaining {
            remaining -= n;
            kept.push(p);
            continue;
        }
        if remaining > 0 {
            kept.push(p.split_whitespace().take(remaining).collect::<Vec<_>>().join(" "));
        }
        break;
    }
    kept
}

fn resplit(paragraph: &str) -> Vec<String> {
    let words: Vec<&str> = paragraph.split_whitespace().collect();
    words
        .chunks(RESPLIT_CHUNK)
        .enumerate()
        .fold(Vec::<Vec<&str>>::new(), |mut acc, (i, chunk)| {
            // two leading chunks, everything else in the third
            if i < 3 {
                acc.push(chunk.to_vec());
            } else if let Some(last) = acc.last_mut() {
                last.extend_from_slice(chunk);
            }
            acc
        })
        .into_iter()
        .map(|w| w.join(" "))
        .collect()
}

/// Pad with seeded filler paragraphs up to `short_min_words`, then cut back
/// to `short_max_words`.
fn fit_word_range(asin: &str, text: &str, lexicon: &Lexicon) -> String {
    let limits = &lexicon.limits;
    let mut rng = rng::seeded("wr:", asin);
    let mut paras = paragraphs(text);

    while word_count(&paras.join("\n\n")) < limits.short_min_words {
        let pick = rng::below(&mut rng, lexicon.fillers.len());
        paras.push(lexicon.fillers[pick].to_string());
        if paras.len() >= limits.short_max_paragraphs {
            break;
        }
    }

    if word_count(&paras.join("\n\n")) > limits.short_max_words {
        paras = truncate_paragraphs(paras, limits.short_max_words);
        if paras.len() == 1 && word_count(&paras[0]) > RESPLIT_MIN_WORDS {
            paras = resplit(&paras[0]);
        }
    }
    paras.join("\n\n")
}

/// About-this-item copy of 180–220 words.
pub fn short_body(
    asin: &str,
    title: &str,
    specs: &IndexMap<String, String>,
    lexicon: &Lexicon,
) -> String {
    let name = title::sanitize(title, lexicon.limits.title_max_words);
    let fabric = spec_value(specs, FABRIC_KEYS);
    let care = spec_value(specs, CARE_KEYS);

    let opening = format!(
        "{} is made for a polished look that still feels comfortable to wear. It sits cleanly on \
         the body with a flattering shape that works for day plans and dressier moments without \
         feeling overdone.",
        name
    );
    let fit = "The fit aims for balance rather than extremes, so you can move naturally while \
        still getting a defined silhouette. Choose your usual size for a closer look, or size up \
        if you prefer a little more ease through the waist and hips.";
    let styling = "Styling is simple: keep accessories minimal for a clean finish, or add a \
        jacket and statement shoes when you want a sharper outfit. The piece photographs well \
        thanks to smooth lines and a structured feel that stays put once adjusted.";

    let mut details = Vec::new();
    if let Some(fabric) = &fabric {
        details.push(format!(
            "The listed fabric is {}, which helps the garment keep its shape while staying wearable.",
            fabric.to_lowercase()
        ));
    }
    if let Some(care) = &care {
        details.push(format!(
            "Care guidance: {}. Follow the label first to help it stay looking new.",
            care
        ));
    }
    let closing = if details.is_empty() {
        "With the right fit and simple styling, this item becomes an easy go-to when you want \
         something that looks intentional without extra effort."
            .to_string()
    } else {
        details.join(" ")
    };

    let text = [opening.as_str(), fit, styling, closing.as_str()].join("\n\n");
    fit_word_range(asin, &text, lexicon)
}

/// Long-form copy of at most `long_max_words` words. Sections whose text
/// normalizes to an earlier section's are dropped.
pub fn long_body(
    title: &str,
    bullets: &[String],
    specs: &IndexMap<String, String>,
    sizes: &[String],
    colors: &[String],
    lexicon: &Lexicon,
) -> String {
    let name = title::sanitize(title, lexicon.limits.title_max_words);

    let intro = format!(
        "{} is a versatile piece for when you want a put-together look that still feels \
         comfortable. The silhouette reads polished, photographs well, and stays wearable for a \
         full day or a long night.",
        name
    );

    let mut fit = String::from(
        "Fit is where most outfits win or lose. This design aims for a balanced shape with a \
         defined line through the torso, a clean waist, and a smooth finish through the hips and \
         legs. If you prefer a more relaxed feel, size up; if you like a closer fit, stay true to size.",
    );
    if !sizes.is_empty() {
        let listed: Vec<&str> = sizes.iter().take(SIZE_NOTE_CAP).map(String::as_str).collect();
        fit.push_str(&format!(" Sizes may include: {}.", listed.join(", ")));
    }

    let mut feel = String::from(
        "Comfort is not just about softness. It is also about movement and how the fabric behaves \
         as you walk, sit, and stand. A blend with a bit of give helps it keep its shape while \
         still feeling wearable.",
    );
    if let Some(fabric) = spec_value(specs, FABRIC_KEYS) {
        feel.push_str(&format!(" The listed fabric is {}.", fabric.to_lowercase()));
    }

    let highlights = bullets
        .iter()
        .take(HIGHLIGHT_CAP)
        .map(|b| clean_ws(b))
        .filter(|b| !b.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let highlights = if highlights.is_empty() {
        "A clean neckline and a refined silhouette for an elevated look. Designed to layer easily \
         with jackets, wraps, or sweaters. Works well with both minimal accessories and statement \
         pieces."
            .to_string()
    } else {
        highlights
    };

    let styling = "Styling ideas: keep it minimal with neutral shoes and one standout accessory. \
        For a relaxed daytime look, add a denim jacket or cardigan. For events, switch to a bolder \
        shoe and a small clutch for a sharper finish.";

    let color_note = if colors.is_empty() {
        "Color options depend on the listing. Pick the shade that matches your wardrobe for the \
         most repeat wear."
            .to_string()
    } else {
        let listed: Vec<&str> = colors.iter().take(COLOR_NOTE_CAP).map(String::as_str).collect();
        format!(
            "Available colors may include: {}. If a shade is sold out, check back as availability \
             can change.",
            listed.join(", ")
        )
    };

    let care = match spec_value(specs, CARE_KEYS) {
        Some(care) => format!(
            "Care instructions listed: {}. Follow the label first, and avoid high heat if you want \
             the fabric to stay smooth.",
            care
        ),
        None => "Care guidance matters if you want it to keep its shape and finish. Follow the \
                 label first."
            .to_string(),
    };

    let sections = [
        intro,
        format!("Fit and sizing\n{}", fit),
        format!("Fabric and comfort\n{}", feel),
        format!("Highlights\n{}", highlights),
        format!("How to style\n{}", styling),
        format!("Color notes\n{}", color_note),
        format!("Care\n{}", care),
    ];

    let mut seen = HashSet::new();
    let kept: Vec<String> = paragraphs(&sections.join("\n\n"))
        .into_iter()
        .filter(|p| {
            let key = clean_ws(&KEY_RE.replace_all(&p.to_lowercase(), " "));
            !key.is_empty() && seen.insert(key)
        })
        .collect();
    truncate_paragraphs(kept, lexicon.limits.long_max_words).join("\n\n")
}

/// Paragraph blocks with illustrations spread at an even stride, never before
/// the second paragraph and never after the last.
pub fn long_blocks(
    title: &str,
    long_body: &str,
    illustrations: &[String],
    lexicon: &Lexicon,
) -> Vec<DescriptionBlock> {
    let paras: Vec<String> = PARA_BREAK_RE
        .split(long_body)
        .map(clean_ws)
        .filter(|p| !p.is_empty())
        .collect();
    let mut imgs = uniq_keep_order(illustrations.iter().map(|u| force_hd(u)));
    imgs.truncate(lexicon.limits.block_image_cap);

    let name = title::sanitize(title, lexicon.limits.title_max_words);
    let slots = paras.len().saturating_sub(1).max(1);
    let step = (slots / imgs.len().max(1)).max(1);
    let last = paras.len().saturating_sub(1);

    let mut imgs = imgs.into_iter().enumerate();
    let mut blocks = Vec::with_capacity(paras.len() + lexicon.limits.block_image_cap);
    for (i, text) in paras.into_iter().enumerate() {
        blocks.push(DescriptionBlock::Paragraph { text });
        if i >= 1 && i < last && (i - 1) % step == 0 {
            if let Some((n, src)) = imgs.next() {
                blocks.push(DescriptionBlock::Image {
                    src,
                    alt: format!("{} details image {}", name, n + 1),
                });
            }
        }
    }
    blocks
}

/// Paragraph text of the blocks, joined the way long copy is stored.
pub fn blocks_text(blocks: &[DescriptionBlock]) -> String {
    blocks
        .iter()
        .filter_map(|b| match b {
            DescriptionBlock::Paragraph { text } => Some(text.as_str()),
            DescriptionBlock::Image { .. } => None,
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Skewed-low "bought in the past month" counter.
pub fn social_proof(asin: &str, limits: &Limits) -> SocialProof {
    let mut rng = rng::seeded("proof:", asin);
    let x = rng::unit_f64(&mut rng).powf(limits.proof_exponent);
    let span = f64::from(limits.proof_max - limits.proof_min);
    let n = (f64::from(limits.proof_min) + x * span) as u32;
    let n = n.clamp(limits.proof_min, limits.proof_max);
    SocialProof {
        bought_past_month: n,
        text: format!("{}+ bought in the past month", n),
    }
}
