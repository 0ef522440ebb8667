//! Restaurant menu catalog.
//!
//! The catalog is a read-only, ordered list of [`CatalogItem`]s loaded from a
//! JSON array. Catalog order matters: it breaks ties between equally similar
//! items during matching.

use std::fmt::Write as _;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TazabotError};

/// A menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u64,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "descripcion", default)]
    pub description: String,
    #[serde(alias = "precio")]
    pub price: f64,
    #[serde(alias = "disponible", default = "default_available")]
    pub available: bool,
    #[serde(alias = "oferta", default)]
    pub on_sale: bool,
    /// Discount percentage, shown when the item is on sale.
    #[serde(alias = "descuento", default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(alias = "mas_vendido", default)]
    pub best_seller: bool,
    #[serde(default)]
    pub popular: bool,
}

fn default_available() -> bool {
    true
}

impl CatalogItem {
    pub fn new<S: Into<String>, D: Into<String>>(
        id: u64,
        name: S,
        description: D,
        price: f64,
    ) -> Self {
        CatalogItem {
            id,
            name: name.into(),
            description: description.into(),
            price,
            available: true,
            on_sale: false,
            discount: None,
            best_seller: false,
            popular: false,
        }
    }

    /// Human-readable detail card for this item.
    pub fn detail_card(&self) -> String {
        format_item_card(self)
    }
}

/// Format an item's detail card.
///
/// The card lists name, description, price and availability, followed by
/// the sale, best-seller and popular badges that apply.
pub fn format_item_card(item: &CatalogItem) -> String {
    let availability = if item.available {
        "✓ Disponible"
    } else {
        "✗ No disponible"
    };

    let mut card = String::new();
    let _ = write!(card, "\n🍽️ **{}**\n", item.name);
    let _ = writeln!(card, "{}", item.description);
    let _ = writeln!(card, "💰 Precio: ${} pesos", format_number(item.price));
    let _ = write!(card, "📦 Estado: {availability}");

    if item.on_sale {
        let discount = item.discount.map(format_number).unwrap_or_else(|| "0".into());
        let _ = write!(card, "\n🎉 ¡EN OFERTA! Descuento: {discount}%");
    }
    if item.best_seller {
        card.push_str("\n⭐ ¡Más vendido!");
    }
    if item.popular {
        card.push_str("\n🔥 ¡Popular!");
    }
    card
}

/// Whole numbers print without a fractional part.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Counts over a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total: usize,
    pub available: usize,
    pub unavailable: usize,
    pub best_sellers: Vec<u64>,
    pub popular: Vec<u64>,
}

/// An ordered menu.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Catalog { items }
    }

    /// Load a catalog from a JSON array file.
    ///
    /// A missing file yields an empty catalog. An unreadable or malformed
    /// file is a configuration error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Menu file {} not found, using an empty menu", path.display());
            return Ok(Catalog::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            TazabotError::configuration(format!("cannot read menu {}: {e}", path.display()))
        })?;
        let items: Vec<CatalogItem> = serde_json::from_str(&content).map_err(|e| {
            TazabotError::configuration(format!("malformed menu {}: {e}", path.display()))
        })?;
        let catalog = Catalog { items };
        info!("Loaded {} menu items from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let items: Vec<CatalogItem> = serde_json::from_str(json)
            .map_err(|e| TazabotError::configuration(format!("malformed menu: {e}")))?;
        Ok(Catalog { items })
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look an item up by id.
    pub fn get(&self, id: u64) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items currently available, in catalog order.
    pub fn available(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter().filter(|item| item.available)
    }

    pub fn stats(&self) -> CatalogStats {
        let available = self.available().count();
        CatalogStats {
            total: self.items.len(),
            available,
            unavailable: self.items.len() - available,
            best_sellers: self
                .items
                .iter()
                .filter(|i| i.best_seller)
                .map(|i| i.id)
                .collect(),
            popular: self
                .items
                .iter()
                .filter(|i| i.popular)
                .map(|i| i.id)
                .collect(),
        }
    }
}

impl From<Vec<CatalogItem>> for Catalog {
    fn from(items: Vec<CatalogItem>) -> Self {
        Catalog::new(items)
    }
}
