//! Deterministic price computation, no side effects. All money is
//! fixed-point `Decimal` with 2-digit scale; binary floats never touch a
//! stored total.

use rust_decimal::Decimal;

use crate::errors::{DomainError, DomainResult};
use crate::models::{Availability, ExtraItem, Service};

/// What multiplies the unit price: booked quantity for slot services,
/// number of nights for hotel stays (quantity is not a price multiplier
/// there).
#[derive(Debug, Clone, Copy)]
pub enum PriceBasis {
    Quantity(i32),
    Nights(i32),
}

#[derive(Debug, Clone)]
pub struct PriceQuote {
    pub total: Decimal,
    pub lines: Vec<QuoteLine>,
}

/// Priced extra line; `price_at_booking` is the snapshot persisted with the
/// booking so later item price edits never touch history.
#[derive(Debug, Clone)]
pub struct QuoteLine {
    pub extra_item_id: String,
    pub quantity: i32,
    pub price_at_booking: Decimal,
}

pub fn unit_price(service: &Service, availability: &Availability) -> Decimal {
    availability.price.unwrap_or(service.base_price)
}

pub fn quote(
    service: &Service,
    availability: &Availability,
    basis: PriceBasis,
    extras: &[(ExtraItem, i32)],
) -> DomainResult<PriceQuote> {
    let unit = unit_price(service, availability);
    let mut total = match basis {
        PriceBasis::Quantity(quantity) => unit * Decimal::from(quantity),
        PriceBasis::Nights(nights) => unit * Decimal::from(nights),
    };

    let mut lines = Vec::with_capacity(extras.len());
    for (item, quantity) in extras {
        if *quantity < 1 {
            return Err(DomainError::Validation(format!(
                "extra item {}: quantity must be at least 1",
                item.name
            )));
        }
        if !item.active {
            return Err(DomainError::conflict(format!(
                "extra item {} is not active",
                item.name
            )));
        }
        if item.service_id != service.id {
            return Err(DomainError::conflict(format!(
                "extra item {} does not belong to this service",
                item.name
            )));
        }
        if *quantity > item.max_quantity {
            return Err(DomainError::conflict(format!(
                "extra item {}: quantity {} exceeds maximum {}",
                item.name, quantity, item.max_quantity
            )));
        }

        total += item.price * Decimal::from(*quantity);
        lines.push(QuoteLine {
            extra_item_id: item.id.clone(),
            quantity: *quantity,
            price_at_booking: item.price,
        });
    }

    total.rescale(2);
    Ok(PriceQuote { total, lines })
}
