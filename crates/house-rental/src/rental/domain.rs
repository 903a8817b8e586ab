use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Validation failures raised while constructing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("House ID cannot be negative.")]
    NegativeId,
    #[error("House price cannot be negative.")]
    NegativePrice,
    #[error("Number of bedrooms cannot be negative.")]
    NegativeBedrooms,
    #[error("Tenant name cannot be empty.")]
    EmptyName,
    #[error("Contact information cannot be empty.")]
    EmptyContact,
}

/// Plain decimal text with at least one fractional digit and no exponent:
/// `500.0`, `1250.75`, `100000000000000000000.0`, `0.0000001`.
pub fn format_price(price: f64) -> String {
    let text = price.to_string();
    if text.contains('.') || !price.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

/// A rentable house listing. Everything except the booked flag is fixed at
/// construction.
#[derive(Debug)]
pub struct House {
    id: u32,
    location: String,
    price: f64,
    bedrooms: u32,
    owner: String,
    booked: AtomicBool,
}

impl House {
    /// Builds an unbooked house, rejecting negative id, price, or bedroom
    /// count in that order.
    pub fn new(
        id: i32,
        location: impl Into<String>,
        price: f64,
        bedrooms: i32,
        owner: impl Into<String>,
    ) -> Result<Self, RecordError> {
        let id = u32::try_from(id).map_err(|_| RecordError::NegativeId)?;
        if price < 0.0 {
            return Err(RecordError::NegativePrice);
        }
        let bedrooms = u32::try_from(bedrooms).map_err(|_| RecordError::NegativeBedrooms)?;

        Ok(Self {
            id,
            location: location.into(),
            price,
            bedrooms,
            owner: owner.into(),
            booked: AtomicBool::new(false),
        })
    }

    pub(crate) fn with_booked(self, booked: bool) -> Self {
        self.booked.store(booked, Ordering::Release);
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn bedrooms(&self) -> u32 {
        self.bedrooms
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_booked(&self) -> bool {
        self.booked.load(Ordering::Acquire)
    }

    /// Flips the booked flag if it is still clear. Returns `true` only for the
    /// caller that performed the flip.
    pub fn book(&self) -> bool {
        self.booked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Search predicate: same location ignoring case, within budget, free.
    pub fn is_available_in(&self, location: &str, max_price: f64) -> bool {
        self.location.to_lowercase() == location.to_lowercase()
            && self.price <= max_price
            && !self.is_booked()
    }
}

impl Clone for House {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            location: self.location.clone(),
            price: self.price,
            bedrooms: self.bedrooms,
            owner: self.owner.clone(),
            booked: AtomicBool::new(self.is_booked()),
        }
    }
}

impl PartialEq for House {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.location == other.location
            && self.price == other.price
            && self.bedrooms == other.bedrooms
            && self.owner == other.owner
            && self.is_booked() == other.is_booked()
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "House ID: {}, Location: {}, Price: {}, Bedrooms: {}, Owner: {}, Booked: {}",
            self.id,
            self.location,
            format_price(self.price),
            self.bedrooms,
            self.owner,
            if self.is_booked() { "yes" } else { "no" }
        )
    }
}

/// A prospective tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    name: String,
    contact: String,
    preferred_location: String,
}

impl Tenant {
    pub fn new(
        name: impl Into<String>,
        contact: impl Into<String>,
        preferred_location: impl Into<String>,
    ) -> Result<Self, RecordError> {
        let name = name.into();
        let contact = contact.into();
        if name.trim().is_empty() {
            return Err(RecordError::EmptyName);
        }
        if contact.trim().is_empty() {
            return Err(RecordError::EmptyContact);
        }

        Ok(Self {
            name,
            contact,
            preferred_location: preferred_location.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &str {
        &self.contact
    }

    pub fn preferred_location(&self) -> &str {
        &self.preferred_location
    }
}
