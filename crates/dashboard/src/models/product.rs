//! Products and the category display helper.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use comanda_core::ProductId;

/// Categories whose display form title-casing cannot recover (accents are
/// lost in the backend's constant names).
const SPECIAL_FORMATS: &[(&str, &str)] = &[("BEBIDAS_ALCOHOLICAS", "Bebidas Alcohólicas")];

/// A product as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "precio")]
    pub price: Decimal,
    #[serde(rename = "imagenUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "stockDisponible")]
    pub stock: u32,
    #[serde(rename = "estaActivo")]
    pub active: bool,
}

/// Payload for creating or updating a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "precio")]
    pub price: Decimal,
    #[serde(rename = "imagenUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "stockDisponible")]
    pub stock: u32,
    #[serde(rename = "estaActivo")]
    pub active: bool,
}

/// Render a backend category constant for display.
///
/// `BEBIDAS_ALCOHOLICAS` becomes `Bebidas Alcohólicas`, `PIZZAS` becomes
/// `Pizzas`. Unknown constants are title-cased word by word.
#[must_use]
pub fn format_category_name(category: &str) -> String {
    if category.is_empty() {
        return String::new();
    }

    if let Some((_, display)) = SPECIAL_FORMATS
        .iter()
        .find(|(raw, _)| *raw == category)
    {
        return (*display).to_string();
    }

    category
        .split('_')
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
    })
}
