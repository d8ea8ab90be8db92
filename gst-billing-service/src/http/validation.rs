//! Inbound payload format checks.
//!
//! GSTIN and IFSC formats follow the Indian registry rules; failures are
//! reported as `ValidationError` before any store access.

use crate::models::{CreateClient, CreateItem, UpdateClient, UpdateCompany, UpdateItem};
use crate::services::tax;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use service_core::error::AppError;
use validator::ValidateEmail;

static GST_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").expect("valid GSTIN regex")
});

static IFSC_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").expect("valid IFSC regex"));

pub fn validate_gst_number(value: &str) -> Result<(), AppError> {
    if !GST_NUMBER.is_match(value) {
        return Err(AppError::Validation("Invalid GST number format".to_string()));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), AppError> {
    if !value.validate_email() {
        return Err(AppError::Validation("Invalid email format".to_string()));
    }
    Ok(())
}

pub fn validate_ifsc(value: &str) -> Result<(), AppError> {
    if !IFSC_CODE.is_match(value) {
        return Err(AppError::Validation("Invalid IFSC code format".to_string()));
    }
    Ok(())
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required field: {}",
            field
        )));
    }
    Ok(())
}

pub fn validate_company(input: &UpdateCompany) -> Result<(), AppError> {
    require("company_name", &input.company_name)?;
    require("company_address", &input.company_address)?;
    require("company_state", &input.company_state)?;
    validate_gst_number(&input.company_gst_number)?;
    if let Some(email) = input.company_email.as_deref().filter(|s| !s.is_empty()) {
        validate_email(email)?;
    }
    if let Some(ifsc) = input.bank_ifsc_code.as_deref().filter(|s| !s.is_empty()) {
        validate_ifsc(ifsc)?;
    }
    Ok(())
}

pub fn validate_create_client(input: &CreateClient) -> Result<(), AppError> {
    require("client_name", &input.client_name)?;
    require("client_address", &input.client_address)?;
    require("client_state", &input.client_state)?;
    validate_gst_number(&input.client_gst_number)?;
    if let Some(email) = input.client_email.as_deref().filter(|s| !s.is_empty()) {
        validate_email(email)?;
    }
    if let Some(ifsc) = input.bank_ifsc_code.as_deref().filter(|s| !s.is_empty()) {
        validate_ifsc(ifsc)?;
    }
    Ok(())
}

pub fn validate_update_client(input: &UpdateClient) -> Result<(), AppError> {
    if let Some(email) = input.client_email.as_deref().filter(|s| !s.is_empty()) {
        validate_email(email)?;
    }
    if let Some(ifsc) = input.bank_ifsc_code.as_deref().filter(|s| !s.is_empty()) {
        validate_ifsc(ifsc)?;
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<(), AppError> {
    if price < Decimal::ZERO {
        return Err(AppError::Validation(format!(
            "price must not be negative, got {}",
            price
        )));
    }
    Ok(())
}

pub fn validate_create_item(input: &CreateItem) -> Result<(), AppError> {
    require("item_name", &input.item_name)?;
    tax::validate_rate("cgst_rate", input.cgst_rate)?;
    tax::validate_rate("sgst_rate", input.sgst_rate)?;
    tax::validate_rate("igst_rate", input.igst_rate)?;
    validate_price(input.price)
}

pub fn validate_update_item(input: &UpdateItem) -> Result<(), AppError> {
    if let Some(rate) = input.cgst_rate {
        tax::validate_rate("cgst_rate", rate)?;
    }
    if let Some(rate) = input.sgst_rate {
        tax::validate_rate("sgst_rate", rate)?;
    }
    if let Some(rate) = input.igst_rate {
        tax::validate_rate("igst_rate", rate)?;
    }
    if let Some(price) = input.price {
        validate_price(price)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gst_number_format() {
        assert!(validate_gst_number("29ABCDE1234F1Z5").is_ok());
        assert!(validate_gst_number("29abcde1234f1z5").is_err());
        assert!(validate_gst_number("29ABCDE1234F0Z5").is_err());
        assert!(validate_gst_number("too-short").is_err());
    }

    #[test]
    fn ifsc_code_format() {
        assert!(validate_ifsc("HDFC0001234").is_ok());
        assert!(validate_ifsc("HDFC1001234").is_err());
        assert!(validate_ifsc("hd0001234").is_err());
    }

    #[test]
    fn email_format() {
        assert!(validate_email("billing@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }
}
