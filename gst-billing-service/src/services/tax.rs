//! GST split calculator.
//!
//! Pure: no I/O, deterministic. Given the buyer and seller states and the
//! priced lines, produces each line's CGST/SGST/IGST split and the invoice
//! aggregates. A sale within the seller's own state is split into CGST +
//! SGST at the item's two co-located rates; a sale crossing states carries
//! IGST only.

use rust_decimal::{Decimal, RoundingStrategy};
use service_core::error::AppError;

/// Upper bound for each GST rate field, in percent (inclusive).
pub const MAX_GST_RATE: Decimal = Decimal::from_parts(28, 0, 0, false, 0);

/// Which split applies to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GstType {
    CgstSgst,
    Igst,
}

impl GstType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GstType::CgstSgst => "cgst_sgst",
            GstType::Igst => "igst",
        }
    }
}

/// Priced input line, rates in percent as configured on the catalog item.
#[derive(Debug, Clone)]
pub struct TaxLineInput {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub cgst_rate: Decimal,
    pub sgst_rate: Decimal,
    pub igst_rate: Decimal,
}

/// A fully computed line. Amounts are rounded to two decimals; the line tax
/// is the sum of the already-rounded components, deliberately not re-rounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedLine {
    pub taxable_value: Decimal,
    pub cgst_rate: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_rate: Decimal,
    pub sgst_amount: Decimal,
    pub igst_rate: Decimal,
    pub igst_amount: Decimal,
    pub tax_amount: Decimal,
    pub line_total: Decimal,
    pub gst_type: GstType,
}

/// Invoice-level aggregates: sums of per-line rounded components, each
/// re-rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub total_cgst: Decimal,
    pub total_sgst: Decimal,
    pub total_igst: Decimal,
    pub total_tax: Decimal,
    pub grand_total: Decimal,
}

/// Round half-up to two decimal places.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Reject a rate outside [0, 28] percent before any calculation.
pub fn validate_rate(field: &str, rate: Decimal) -> Result<(), AppError> {
    if rate < Decimal::ZERO || rate > MAX_GST_RATE {
        return Err(AppError::Validation(format!(
            "{} must be between 0 and {} percent, got {}",
            field, MAX_GST_RATE, rate
        )));
    }
    Ok(())
}

/// Whether the buyer and seller are in the same state. Comparison is a
/// case-insensitive exact match.
pub fn is_local_sale(buyer_state: &str, seller_state: &str) -> bool {
    buyer_state.trim().eq_ignore_ascii_case(seller_state.trim())
}

fn compute_line(input: &TaxLineInput, local: bool) -> Result<ComputedLine, AppError> {
    validate_rate("cgst_rate", input.cgst_rate)?;
    validate_rate("sgst_rate", input.sgst_rate)?;
    validate_rate("igst_rate", input.igst_rate)?;
    if input.quantity <= Decimal::ZERO {
        return Err(AppError::Validation(format!(
            "quantity must be positive, got {}",
            input.quantity
        )));
    }
    if input.unit_price < Decimal::ZERO {
        return Err(AppError::Validation(format!(
            "unit_price must not be negative, got {}",
            input.unit_price
        )));
    }

    let hundred = Decimal::ONE_HUNDRED;
    let taxable_value = round2(input.quantity * input.unit_price);

    let (cgst_rate, sgst_rate, igst_rate) = if local {
        (input.cgst_rate, input.sgst_rate, Decimal::ZERO)
    } else {
        (Decimal::ZERO, Decimal::ZERO, input.igst_rate)
    };

    let cgst_amount = round2(taxable_value * cgst_rate / hundred);
    let sgst_amount = round2(taxable_value * sgst_rate / hundred);
    let igst_amount = round2(taxable_value * igst_rate / hundred);

    // Sum of already-rounded components; the contract re-rounds only at the
    // line-total and invoice levels.
    let tax_amount = cgst_amount + sgst_amount + igst_amount;
    let line_total = round2(taxable_value + tax_amount);

    Ok(ComputedLine {
        taxable_value,
        cgst_rate,
        cgst_amount,
        sgst_rate,
        sgst_amount,
        igst_rate,
        igst_amount,
        tax_amount,
        line_total,
        gst_type: if local { GstType::CgstSgst } else { GstType::Igst },
    })
}

/// Compute per-line splits and invoice aggregates.
pub fn compute(
    buyer_state: &str,
    seller_state: &str,
    lines: &[TaxLineInput],
) -> Result<(Vec<ComputedLine>, InvoiceTotals), AppError> {
    if lines.is_empty() {
        return Err(AppError::Validation(
            "Invoice must contain at least one line item".to_string(),
        ));
    }

    let local = is_local_sale(buyer_state, seller_state);
    let computed: Vec<ComputedLine> = lines
        .iter()
        .map(|line| compute_line(line, local))
        .collect::<Result<_, _>>()?;

    let mut subtotal = Decimal::ZERO;
    let mut total_cgst = Decimal::ZERO;
    let mut total_sgst = Decimal::ZERO;
    let mut total_igst = Decimal::ZERO;
    for line in &computed {
        subtotal += line.taxable_value;
        total_cgst += line.cgst_amount;
        total_sgst += line.sgst_amount;
        total_igst += line.igst_amount;
    }
    let subtotal = round2(subtotal);
    let total_cgst = round2(total_cgst);
    let total_sgst = round2(total_sgst);
    let total_igst = round2(total_igst);
    let total_tax = round2(total_cgst + total_sgst + total_igst);
    let grand_total = round2(subtotal + total_tax);

    Ok((
        computed,
        InvoiceTotals {
            subtotal,
            total_cgst,
            total_sgst,
            total_igst,
            total_tax,
            grand_total,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(
        quantity: Decimal,
        unit_price: Decimal,
        cgst: Decimal,
        sgst: Decimal,
        igst: Decimal,
    ) -> TaxLineInput {
        TaxLineInput {
            quantity,
            unit_price,
            cgst_rate: cgst,
            sgst_rate: sgst,
            igst_rate: igst,
        }
    }

    #[test]
    fn local_sale_splits_into_cgst_and_sgst() {
        let (lines, totals) = compute(
            "Karnataka",
            "Karnataka",
            &[line(dec!(2), dec!(100.00), dec!(9), dec!(9), dec!(18))],
        )
        .unwrap();

        let l = &lines[0];
        assert_eq!(l.taxable_value, dec!(200.00));
        assert_eq!(l.cgst_amount, dec!(18.00));
        assert_eq!(l.sgst_amount, dec!(18.00));
        assert_eq!(l.igst_amount, Decimal::ZERO);
        assert_eq!(l.igst_rate, Decimal::ZERO);
        assert_eq!(l.gst_type, GstType::CgstSgst);
        assert_eq!(l.line_total, dec!(236.00));
        assert_eq!(totals.grand_total, dec!(236.00));
    }

    #[test]
    fn interstate_sale_carries_igst_only() {
        let (lines, totals) = compute(
            "Delhi",
            "Karnataka",
            &[line(dec!(1), dec!(1000.00), dec!(9), dec!(9), dec!(18))],
        )
        .unwrap();

        let l = &lines[0];
        assert_eq!(l.igst_amount, dec!(180.00));
        assert_eq!(l.cgst_amount, Decimal::ZERO);
        assert_eq!(l.sgst_amount, Decimal::ZERO);
        assert_eq!(l.cgst_rate, Decimal::ZERO);
        assert_eq!(l.sgst_rate, Decimal::ZERO);
        assert_eq!(l.gst_type, GstType::Igst);
        assert_eq!(l.line_total, dec!(1180.00));
        assert_eq!(totals.total_igst, dec!(180.00));
        assert_eq!(totals.grand_total, dec!(1180.00));
    }

    #[test]
    fn state_comparison_is_case_insensitive() {
        assert!(is_local_sale("Maharashtra", "MAHARASHTRA"));
        assert!(!is_local_sale("Maharashtra", "Gujarat"));
    }

    #[test]
    fn line_tax_is_sum_of_rounded_components() {
        // 3 x 33.33 = 99.99; 9% of 99.99 = 8.9991 -> 9.00 per component.
        let (lines, _) = compute(
            "Karnataka",
            "Karnataka",
            &[line(dec!(3), dec!(33.33), dec!(9), dec!(9), dec!(18))],
        )
        .unwrap();

        let l = &lines[0];
        assert_eq!(l.taxable_value, dec!(99.99));
        assert_eq!(l.cgst_amount, dec!(9.00));
        assert_eq!(l.sgst_amount, dec!(9.00));
        assert_eq!(l.tax_amount, dec!(18.00));
        assert_eq!(l.line_total, dec!(117.99));
        assert_eq!(l.line_total, l.taxable_value + l.tax_amount);
    }

    #[test]
    fn rate_bounds_are_inclusive() {
        let ok_zero = compute(
            "Karnataka",
            "Karnataka",
            &[line(dec!(1), dec!(10), dec!(0), dec!(0), dec!(0))],
        );
        assert!(ok_zero.is_ok());

        let ok_max = compute(
            "Delhi",
            "Karnataka",
            &[line(dec!(1), dec!(10), dec!(14), dec!(14), dec!(28))],
        );
        assert!(ok_max.is_ok());

        let over = compute(
            "Delhi",
            "Karnataka",
            &[line(dec!(1), dec!(10), dec!(14), dec!(14), dec!(29))],
        );
        assert!(matches!(over, Err(AppError::Validation(_))));
    }

    #[test]
    fn negative_rate_is_rejected() {
        let result = compute(
            "Karnataka",
            "Karnataka",
            &[line(dec!(1), dec!(10), dec!(-1), dec!(9), dec!(18))],
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn empty_line_list_is_rejected() {
        let result = compute("Karnataka", "Karnataka", &[]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let result = compute(
            "Karnataka",
            "Karnataka",
            &[line(dec!(0), dec!(10), dec!(9), dec!(9), dec!(18))],
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn totals_sum_rounded_components_across_lines() {
        // Per line: 99.99 taxable, 9.00 CGST + 9.00 SGST (rounded up from
        // 8.9991). Rounding the true totals once would give 17.9982*2 ->
        // 36.00, identical here, but per-line rounding is the contract.
        let (_, totals) = compute(
            "Karnataka",
            "Karnataka",
            &[
                line(dec!(3), dec!(33.33), dec!(9), dec!(9), dec!(18)),
                line(dec!(3), dec!(33.33), dec!(9), dec!(9), dec!(18)),
            ],
        )
        .unwrap();

        assert_eq!(totals.subtotal, dec!(199.98));
        assert_eq!(totals.total_cgst, dec!(18.00));
        assert_eq!(totals.total_sgst, dec!(18.00));
        assert_eq!(totals.total_tax, dec!(36.00));
        assert_eq!(totals.grand_total, dec!(235.98));
        assert_eq!(
            totals.grand_total,
            totals.subtotal + totals.total_tax
        );
    }

    #[test]
    fn mixed_regime_never_occurs_per_line() {
        let (lines, _) = compute(
            "Tamil Nadu",
            "Karnataka",
            &[
                line(dec!(1), dec!(50), dec!(6), dec!(6), dec!(12)),
                line(dec!(2), dec!(75), dec!(9), dec!(9), dec!(18)),
            ],
        )
        .unwrap();

        for l in &lines {
            let local = l.cgst_amount > Decimal::ZERO || l.sgst_amount > Decimal::ZERO;
            let interstate = l.igst_amount > Decimal::ZERO;
            assert!(!(local && interstate));
        }
    }
}
