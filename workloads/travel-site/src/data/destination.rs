//! Destination catalog.

use serde::{Deserialize, Serialize};

/// A destination we publish a guide for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub slug: String,
    pub name: String,
    pub country: String,
    pub summary: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    pub best_season: String,
    /// Cheapest nightly rate we list, in euros.
    pub nightly_from: u32,
}

impl Destination {
    fn new(
        slug: &str,
        name: &str,
        country: &str,
        summary: &str,
        highlights: &[&str],
        best_season: &str,
        nightly_from: u32,
    ) -> Self {
        Self {
            slug: slug.to_string(),
            name: name.to_string(),
            country: country.to_string(),
            summary: summary.to_string(),
            highlights: highlights.iter().map(|h| h.to_string()).collect(),
            best_season: best_season.to_string(),
            nightly_from,
        }
    }

    /// Page title.
    pub fn title(&self) -> String {
        format!("{}, {} | Voyage", self.name, self.country)
    }

    /// Format the nightly rate.
    pub fn format_price(&self) -> String {
        format!("From €{} a night", self.nightly_from)
    }

    /// Canonical URL of the destination guide.
    pub fn href(&self) -> String {
        format!("/destinations/{}", self.slug)
    }
}

/// Every destination, in display order.
pub fn catalog() -> Vec<Destination> {
    vec![
        Destination::new(
            "lisbon",
            "Lisbon",
            "Portugal",
            "Seven hills, yellow trams & custard tarts by the river.",
            &["Alfama at dusk", "Tram 28", "Day trip to Sintra"],
            "April to June",
            85,
        ),
        Destination::new(
            "kyoto",
            "Kyoto",
            "Japan",
            "Temples, tea houses and quiet lanes in the old capital.",
            &["Fushimi Inari at sunrise", "Arashiyama bamboo grove", "Gion by lantern light"],
            "October to November",
            120,
        ),
        Destination::new(
            "oaxaca",
            "Oaxaca",
            "Mexico",
            "Markets, mezcal and some of the best food in the Americas.",
            &["Mercado 20 de Noviembre", "Monte Albán", "Hierve el Agua"],
            "November to March",
            60,
        ),
    ]
}

/// Look up a destination by slug.
pub fn find_destination(slug: &str) -> Option<Destination> {
    catalog().into_iter().find(|d| d.slug == slug)
}
