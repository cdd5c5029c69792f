//! Quote draft aggregate and the extractor patch that fills it.
//!
//! The draft is conversation-scoped and rebuilt from the client-supplied
//! history on every request. Fields are independently nullable until filled;
//! a filled field is only ever overwritten when a later extraction pass
//! returns a non-null value for that exact field (last-writer-wins on
//! explicit mention). A change to any pricing input invalidates a previously
//! computed price so a stale quote is never re-presented.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Broad category of freight being shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageKind {
    Parcel,
    Pallet,
    Container,
    FullTruckload,
}

impl PackageKind {
    /// Wire token for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageKind::Parcel => "parcel",
            PackageKind::Pallet => "pallet",
            PackageKind::Container => "container",
            PackageKind::FullTruckload => "full_truckload",
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parcel" | "package" | "box" => Ok(PackageKind::Parcel),
            "pallet" | "pallets" => Ok(PackageKind::Pallet),
            "container" => Ok(PackageKind::Container),
            "full_truckload" | "ftl" | "truckload" => Ok(PackageKind::FullTruckload),
            other => Err(ValidationError::invalid_format(
                "package.kind",
                format!("unknown package kind '{other}'"),
            )),
        }
    }
}

/// Service level multiplying the base price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceLevel {
    Economy,
    Standard,
    Express,
}

impl ServiceLevel {
    /// Price multiplier for this level.
    pub fn multiplier(&self) -> f64 {
        match self {
            ServiceLevel::Economy => 0.8,
            ServiceLevel::Standard => 1.0,
            ServiceLevel::Express => 1.6,
        }
    }

    /// Transit days used for the delivery estimate.
    pub fn transit_days(&self) -> i64 {
        match self {
            ServiceLevel::Economy => 7,
            ServiceLevel::Standard => 4,
            ServiceLevel::Express => 2,
        }
    }
}

impl FromStr for ServiceLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "economy" => Ok(ServiceLevel::Economy),
            "standard" => Ok(ServiceLevel::Standard),
            "express" | "expedited" => Ok(ServiceLevel::Express),
            other => Err(ValidationError::invalid_format(
                "service.level",
                format!("unknown service level '{other}'"),
            )),
        }
    }
}

/// Geographic coordinates resolved by the geocoding collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// What is being shipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageSlot {
    pub kind: Option<PackageKind>,
    /// Weight in metric tons.
    pub weight_tons: Option<f64>,
    /// Volume in cubic meters.
    pub volume_m3: Option<f64>,
    pub hazardous: Option<bool>,
    pub pallet_count: Option<u32>,
}

/// Where it goes and when it is picked up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSlot {
    pub origin_address: Option<String>,
    pub origin_coords: Option<Coordinates>,
    pub destination_address: Option<String>,
    pub destination_coords: Option<Coordinates>,
    pub pickup_date: Option<NaiveDate>,
    pub pickup_window: Option<String>,
}

/// Service selection and the computed quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceSlot {
    pub level: Option<ServiceLevel>,
    pub estimated_price: Option<f64>,
    pub estimated_delivery: Option<NaiveDate>,
    /// Set when geocoding failed and the quote was priced on the default
    /// distance instead of resolved coordinates.
    #[serde(default)]
    pub unverified_address: bool,
}

/// The accumulating, conversation-scoped quote record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteDraft {
    pub package: PackageSlot,
    pub route: RouteSlot,
    pub service: ServiceSlot,
}

/// A field required before a price can be computed, in clarification
/// priority order: package fields first, then route, then schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    PackageKind,
    Weight,
    Origin,
    Destination,
    PickupDate,
}

impl MissingField {
    /// The clarifying question the quote agent asks for this field.
    pub fn clarifying_question(&self) -> &'static str {
        match self {
            MissingField::PackageKind => {
                "What kind of shipment is this - a parcel, a pallet, a container, or a full truckload?"
            }
            MissingField::Weight => "Roughly how much does the shipment weigh?",
            MissingField::Origin => "Where should we pick the shipment up?",
            MissingField::Destination => "Where is the shipment going?",
            MissingField::PickupDate => "What date would you like the pickup to happen?",
        }
    }
}

impl QuoteDraft {
    /// Creates an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// The first required field that is still null, in the fixed priority
    /// order package -> route -> schedule. `None` means the draft is ready
    /// for pricing.
    pub fn first_missing_field(&self) -> Option<MissingField> {
        if self.package.kind.is_none() {
            return Some(MissingField::PackageKind);
        }
        if self.package.weight_tons.is_none() {
            return Some(MissingField::Weight);
        }
        if self.route.origin_address.is_none() {
            return Some(MissingField::Origin);
        }
        if self.route.destination_address.is_none() {
            return Some(MissingField::Destination);
        }
        if self.route.pickup_date.is_none() {
            return Some(MissingField::PickupDate);
        }
        None
    }

    /// True once a price has been computed and the draft awaits confirmation.
    pub fn is_quoted(&self) -> bool {
        self.service.estimated_price.is_some()
    }

    /// Applies an extraction patch using last-writer-wins on explicit
    /// mention: only non-null patch fields overwrite; everything else is
    /// preserved. Returns true if any pricing input changed, in which case
    /// any previously computed price has been invalidated.
    pub fn merge(&mut self, patch: &DraftPatch) -> bool {
        let mut pricing_changed = false;

        if let Some(kind) = patch.kind {
            pricing_changed |= self.package.kind != Some(kind);
            self.package.kind = Some(kind);
        }
        if let Some(weight) = patch.weight_tons {
            pricing_changed |= self.package.weight_tons != Some(weight);
            self.package.weight_tons = Some(weight);
        }
        if let Some(volume) = patch.volume_m3 {
            self.package.volume_m3 = Some(volume);
        }
        if let Some(hazardous) = patch.hazardous {
            pricing_changed |= self.package.hazardous != Some(hazardous);
            self.package.hazardous = Some(hazardous);
        }
        if let Some(count) = patch.pallet_count {
            self.package.pallet_count = Some(count);
        }

        if let Some(origin) = &patch.origin_address {
            if self.route.origin_address.as_deref() != Some(origin.as_str()) {
                pricing_changed = true;
                // A corrected address invalidates the old geocode result.
                self.route.origin_coords = None;
            }
            self.route.origin_address = Some(origin.clone());
        }
        if let Some(destination) = &patch.destination_address {
            if self.route.destination_address.as_deref() != Some(destination.as_str()) {
                pricing_changed = true;
                self.route.destination_coords = None;
            }
            self.route.destination_address = Some(destination.clone());
        }
        if let Some(date) = patch.pickup_date {
            self.route.pickup_date = Some(date);
        }
        if let Some(window) = &patch.pickup_window {
            self.route.pickup_window = Some(window.clone());
        }

        if let Some(level) = patch.service_level {
            pricing_changed |= self.service.level != Some(level);
            self.service.level = Some(level);
        }

        if pricing_changed {
            self.service.estimated_price = None;
            self.service.estimated_delivery = None;
        }

        pricing_changed
    }
}

/// Partial draft produced by one extraction pass.
///
/// Only fields the extractor is confident about are non-null. When a single
/// message mentions conflicting values for one field, the most recent
/// textual occurrence wins; that tie-break is applied by the extractor
/// before the patch is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PackageKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_tons: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_m3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazardous: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pallet_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_window: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_level: Option<ServiceLevel>,
}

impl DraftPatch {
    /// True when the pass extracted nothing.
    pub fn is_empty(&self) -> bool {
        *self == DraftPatch::default()
    }
}
