//! Static site catalog and the content-API post shape.

use serde::Deserialize;

#[derive(Clone, Copy, PartialEq)]
pub struct Project {
    pub title: &'static str,
    pub category: &'static str,
    pub summary: &'static str,
    pub image: &'static str,
    pub url: &'static str,
}

pub const PROJECT_CATEGORIES: &[&str] = &["Branding", "Web", "Motion"];

pub const PROJECTS: &[Project] = &[
    Project {
        title: "Meridian Coffee",
        category: "Branding",
        summary: "Identity system and packaging for a roastery collective.",
        image: "/assets/work/meridian.webp",
        url: "https://example.com/work/meridian",
    },
    Project {
        title: "Field Notes Quarterly",
        category: "Web",
        summary: "Editorial platform with a reading-first layout.",
        image: "/assets/work/field-notes.webp",
        url: "https://example.com/work/field-notes",
    },
    Project {
        title: "Tidal",
        category: "Motion",
        summary: "Launch film and motion language for a sailing app.",
        image: "/assets/work/tidal.webp",
        url: "https://example.com/work/tidal",
    },
    Project {
        title: "Harbor & Pine",
        category: "Branding",
        summary: "Naming and identity for a coastal furniture maker.",
        image: "/assets/work/harbor-pine.webp",
        url: "https://example.com/work/harbor-pine",
    },
    Project {
        title: "Softserve",
        category: "Web",
        summary: "Commerce build for a dessert studio, heavy on play.",
        image: "/assets/work/softserve.webp",
        url: "https://example.com/work/softserve",
    },
    Project {
        title: "Waypoint",
        category: "Motion",
        summary: "Animated wayfinding spots for a transit pilot.",
        image: "/assets/work/waypoint.webp",
        url: "https://example.com/work/waypoint",
    },
];

#[derive(Clone, Copy, PartialEq)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub price_cents: u32,
    pub image: &'static str,
}

pub const PRODUCT_CATEGORIES: &[&str] = &["Prints", "Apparel", "Objects"];

pub const PRODUCTS: &[Product] = &[
    Product {
        id: "print-tidal",
        name: "Tidal — A2 print",
        category: "Prints",
        price_cents: 4_200,
        image: "/assets/shop/print-tidal.webp",
    },
    Product {
        id: "print-grid",
        name: "Grid studies — A3 print",
        category: "Prints",
        price_cents: 2_800,
        image: "/assets/shop/print-grid.webp",
    },
    Product {
        id: "tee-atelier",
        name: "Atelier tee",
        category: "Apparel",
        price_cents: 3_600,
        image: "/assets/shop/tee.webp",
    },
    Product {
        id: "tote-canvas",
        name: "Canvas tote",
        category: "Apparel",
        price_cents: 2_400,
        image: "/assets/shop/tote.webp",
    },
    Product {
        id: "mug-meridian",
        name: "Meridian mug",
        category: "Objects",
        price_cents: 1_900,
        image: "/assets/shop/mug.webp",
    },
    Product {
        id: "notebook-field",
        name: "Field notebook",
        category: "Objects",
        price_cents: 1_400,
        image: "/assets/shop/notebook.webp",
    },
];

#[derive(Clone, Copy, PartialEq)]
pub struct Highlight {
    pub quote: &'static str,
    pub author: &'static str,
}

pub const HIGHLIGHTS: &[Highlight] = &[
    Highlight {
        quote: "They treated our tiny roastery like a flagship account.",
        author: "Meridian Coffee",
    },
    Highlight {
        quote: "The rare studio that sweats the reading experience.",
        author: "Field Notes Quarterly",
    },
    Highlight {
        quote: "Motion work that made the product feel inevitable.",
        author: "Tidal",
    },
];

pub fn format_price(cents: u32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

#[derive(Clone, PartialEq, Deserialize)]
pub struct PostField {
    pub rendered: String,
}

#[derive(Clone, PartialEq, Debug, Deserialize, Default)]
pub struct PostExtras {
    #[serde(default)]
    pub reading_minutes: Option<u32>,
}

/// Journal post as the headless CMS returns it.
#[derive(Clone, PartialEq, Deserialize)]
pub struct Post {
    pub id: u64,
    pub date: String,
    pub title: PostField,
    pub excerpt: PostField,
    #[serde(default)]
    pub jetpack_featured_media_url: Option<String>,
    #[serde(default)]
    pub acf: Option<PostExtras>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_project_category_is_listed() {
        for project in PROJECTS {
            assert!(
                PROJECT_CATEGORIES.contains(&project.category),
                "unknown category {} on {}",
                project.category,
                project.title
            );
        }
    }

    #[test]
    fn every_product_category_is_listed() {
        for product in PRODUCTS {
            assert!(PRODUCT_CATEGORIES.contains(&product.category));
        }
    }

    #[test]
    fn product_ids_are_unique() {
        let mut ids: Vec<_> = PRODUCTS.iter().map(|product| product.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), PRODUCTS.len());
    }

    #[test]
    fn price_formatting_pads_cents() {
        assert_eq!(format_price(4_200), "$42.00");
        assert_eq!(format_price(1_905), "$19.05");
        assert_eq!(format_price(99), "$0.99");
    }

    #[test]
    fn post_deserializes_from_cms_payload() {
        let raw = r#"{
            "id": 7,
            "date": "2026-05-12T09:30:00",
            "title": { "rendered": "Notes on slow launches" },
            "excerpt": { "rendered": "<p>Why we stopped shipping on Fridays.</p>" },
            "jetpack_featured_media_url": "https://cms.example.com/media/slow.webp",
            "acf": { "reading_minutes": 4 }
        }"#;

        let post: Post = serde_json::from_str(raw).expect("post should parse");
        assert_eq!(post.id, 7);
        assert_eq!(post.title.rendered, "Notes on slow launches");
        assert_eq!(post.acf.and_then(|extras| extras.reading_minutes), Some(4));
    }

    #[test]
    fn post_tolerates_missing_optional_fields() {
        let raw = r#"{
            "id": 8,
            "date": "2026-06-01T08:00:00",
            "title": { "rendered": "Untitled" },
            "excerpt": { "rendered": "" }
        }"#;

        let post: Post = serde_json::from_str(raw).expect("post should parse");
        assert_eq!(post.jetpack_featured_media_url, None);
        assert_eq!(post.acf, None);
    }
}
