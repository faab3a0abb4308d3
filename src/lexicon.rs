//! Fixed vocabularies, filler copy and numeric limits used by extraction and
//! synthesis. Built once at startup and shared read-only.

pub struct Limits {
    pub gallery_cap: usize,
    pub description_image_cap: usize,
    pub block_image_cap: usize,
    pub bullet_cap: usize,
    pub size_cap: usize,
    pub color_cap: usize,
    pub review_cap: usize,
    pub video_cap: usize,
    pub title_max_words: usize,
    pub title_token_cap: usize,
    pub short_min_words: usize,
    pub short_max_words: usize,
    pub short_max_paragraphs: usize,
    pub long_max_words: usize,
    pub proof_min: u32,
    pub proof_max: u32,
    pub proof_exponent: f64,
    pub related_count: usize,
    pub also_viewed_count: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            gallery_cap: 80,
            description_image_cap: 80,
            block_image_cap: 12,
            bullet_cap: 24,
            size_cap: 40,
            color_cap: 60,
            review_cap: 12,
            video_cap: 12,
            title_max_words: 18,
            title_token_cap: 6,
            short_min_words: 180,
            short_max_words: 220,
            short_max_paragraphs: 10,
            long_max_words: 2000,
            proof_min: 50,
            proof_max: 2000,
            proof_exponent: 2.4,
            related_count: 5,
            also_viewed_count: 8,
        }
    }
}

pub struct Lexicon {
    pub limits: Limits,
    /// Title keywords that mark a garment.
    pub apparel_keywords: &'static [&'static str],
    /// Title keywords that mark footwear.
    pub footwear_keywords: &'static [&'static str],
    /// Title keywords that make a rewritten title a heel style.
    pub heel_keywords: &'static [&'static str],
    pub apparel_sizes: &'static [&'static str],
    pub footwear_sizes: &'static [&'static str],
    pub generic_size: &'static str,
    /// Descriptor keywords searched in the source title, in scan order.
    pub descriptors: &'static [&'static str],
    /// Display form for multi-word descriptors; anything else is title-cased.
    pub descriptor_display: &'static [(&'static str, &'static str)],
    pub fillers: &'static [&'static str],
    /// URL substrings that mark non-product imagery.
    pub image_blocklist: &'static [&'static str],
    pub fallback_size_chart: &'static str,
}

impl Default for Lexicon {
    fn default() -> Self {
        Lexicon {
            limits: Limits::default(),
            apparel_keywords: &[
                "dress", "gown", "jumpsuit", "skirt", "top", "shirt", "blouse", "pants", "legging",
                "coat", "jacket",
            ],
            footwear_keywords: &[
                "sandal", "sandals", "heel", "heels", "pump", "pumps", "stiletto", "platform",
                "shoe", "shoes",
            ],
            heel_keywords: &[
                "sandal", "sandals", "heel", "heels", "pump", "pumps", "stiletto", "platform",
            ],
            apparel_sizes: &["XS", "S", "M", "L", "XL"],
            footwear_sizes: &[
                "5", "5.5", "6", "6.5", "7", "7.5", "8", "8.5", "9", "9.5", "10", "11",
            ],
            generic_size: "One Size",
            descriptors: &[
                "maxi",
                "formal",
                "evening",
                "cocktail",
                "boat neck",
                "v neck",
                "off shoulder",
                "off-shoulder",
                "one shoulder",
                "sleeveless",
                "short sleeve",
                "long sleeve",
                "ruched",
                "high split",
                "split",
                "bodycon",
                "mermaid",
                "wide leg",
                "wide-leg",
                "open toe",
                "cross strap",
                "cross-strap",
                "platform",
                "stiletto",
                "suede",
            ],
            descriptor_display: &[
                ("off shoulder", "Off Shoulder"),
                ("off-shoulder", "Off Shoulder"),
                ("boat neck", "Boat Neck"),
                ("v neck", "V Neck"),
                ("one shoulder", "One Shoulder"),
                ("short sleeve", "Short Sleeve"),
                ("long sleeve", "Long Sleeve"),
                ("wide leg", "Wide Leg"),
                ("wide-leg", "Wide Leg"),
                ("high split", "High Split"),
                ("cross strap", "Cross Strap"),
                ("cross-strap", "Cross Strap"),
                ("open toe", "Open Toe"),
            ],
            fillers: &[
                "The design is easy to style with simple accessories and works well in photos thanks to clean lines and a balanced silhouette.",
                "If you are between sizes, choose based on how close you like the fit through the waist and hips, then adjust with your usual layering choices.",
                "For the best look, smooth the fabric, check the neckline placement, and pair it with shoes that match the occasion and the hem length.",
                "Comfort comes from both the cut and the fabric, so selecting your preferred fit makes a noticeable difference over a full day of wear.",
                "This piece transitions well from daytime plans to evening events with a quick change of shoes and a small bag or clutch.",
                "To keep it looking sharp, follow the care label first and avoid high heat when drying or steaming if the material is sensitive.",
            ],
            image_blocklist: &[
                "sprite", "icon", "logo", "badge", "prime", "nav", "button", "star", "rating",
                "cm_cr", "coupon", "banner", "ads", "promo", "promotion",
            ],
            fallback_size_chart: FALLBACK_SIZE_CHART,
        }
    }
}

impl Lexicon {
    pub fn has_apparel_keyword(&self, lowered: &str) -> bool {
        self.apparel_keywords.iter().any(|k| lowered.contains(k))
    }

    pub fn has_footwear_keyword(&self, lowered: &str) -> bool {
        self.footwear_keywords.iter().any(|k| lowered.contains(k))
    }

    pub fn descriptor_display(&self, keyword: &str) -> String {
        self.descriptor_display
            .iter()
            .find(|(k, _)| *k == keyword)
            .map(|(_, v)| v.to_string())
            .unwrap_or_else(|| title_case(keyword))
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

const FALLBACK_SIZE_CHART: &str = r#"<table class="size-chart">
  <thead>
    <tr><th>Size</th><th>Bust (in)</th><th>Waist (in)</th><th>Hips (in)</th></tr>
  </thead>
  <tbody>
    <tr><td>XS</td><td>31-32</td><td>23-24</td><td>33-34</td></tr>
    <tr><td>S</td><td>33-34</td><td>25-26</td><td>35-36</td></tr>
    <tr><td>M</td><td>35-36</td><td>27-28</td><td>37-38</td></tr>
    <tr><td>L</td><td>37-39</td><td>29-31</td><td>39-41</td></tr>
    <tr><td>XL</td><td>40-42</td><td>32-34</td><td>42-44</td></tr>
  </tbody>
</table>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        let lex = Lexicon::default();
        assert_eq!(lex.descriptor_display("off-shoulder"), "Off Shoulder");
        assert_eq!(lex.descriptor_display("bodycon"), "Bodycon");
        assert_eq!(lex.descriptor_display("maxi"), "Maxi");
    }

    #[test]
    fn title_case_hyphenated() {
        assert_eq!(title_case("wide-leg"), "Wide-Leg");
    }

    #[test]
    fn keyword_signals() {
        let lex = Lexicon::default();
        assert!(lex.has_apparel_keyword("blue maxi dress"));
        assert!(lex.has_footwear_keyword("strappy platform sandals"));
        assert!(!lex.has_footwear_keyword("blue maxi dress"));
    }
}
