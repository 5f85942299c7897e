//! Validation utilities for catalog and ledger input

use std::borrow::Cow;

use serde_json::Number;
use uuid::Uuid;
use validator::ValidationError;

pub const MAX_CODE_LEN: usize = 50;
pub const MAX_NAME_LEN: usize = 200;

// ============================================================================
// Catalog Validations
// ============================================================================

/// Build a field error carrying its message in English and Spanish
fn field_error(code: &'static str, message: &'static str, message_es: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error.add_param(Cow::Borrowed("message_es"), &message_es);
    error
}

/// Product code: non-blank after trimming, at most 50 characters
pub fn validate_product_code(code: &str) -> Result<(), ValidationError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(field_error("required", "Code is required", "El código es obligatorio"));
    }
    if code.chars().count() > MAX_CODE_LEN {
        return Err(field_error(
            "length",
            "Code must be at most 50 characters",
            "El código admite como máximo 50 caracteres",
        ));
    }
    Ok(())
}

/// Product or category name: non-blank after trimming, at most 200 characters
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(field_error("required", "Name is required", "El nombre es obligatorio"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(field_error(
            "length",
            "Name must be at most 200 characters",
            "El nombre admite como máximo 200 caracteres",
        ));
    }
    Ok(())
}

/// Minimum stock threshold
pub fn validate_min_stock(min_stock: &i32) -> Result<(), ValidationError> {
    if *min_stock < 0 {
        return Err(field_error(
            "range",
            "Minimum stock cannot be negative",
            "El stock mínimo no puede ser negativo",
        ));
    }
    Ok(())
}

/// Drop duplicate category ids, keeping first occurrence order
pub fn normalize_category_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

/// A category may only be deleted once no product links to it
pub fn check_category_deletable(linked_products: i64) -> Result<(), &'static str> {
    if linked_products > 0 {
        return Err("Cannot delete a category that has products assigned");
    }
    Ok(())
}

// ============================================================================
// Ledger Validations
// ============================================================================

/// Parse a JSON quantity into a positive integer
pub fn parse_quantity(value: &Number) -> Result<i32, &'static str> {
    if let Some(n) = value.as_i64() {
        if n <= 0 {
            return Err("Quantity must be positive");
        }
        return i32::try_from(n).map_err(|_| "Quantity is too large");
    }
    if value.as_u64().is_some() {
        return Err("Quantity is too large");
    }
    match value.as_f64() {
        Some(f) if f <= 0.0 => Err("Quantity must be positive"),
        _ => Err("Quantity must be a whole number"),
    }
}
