//! Records served by the freight platform API.
//!
//! Field names follow the wire format so that records round-trip through the
//! persisted snapshot without a separate DTO layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unique, immutable identifier shared by every record type.
pub type RecordId = u64;

// ============================================================================
// Shipments
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
  Pending,
  Accepted,
  PickedUp,
  InTransit,
  Delivered,
  Cancelled,
}

impl ShipmentStatus {
  pub const ALL: [ShipmentStatus; 6] = [
    ShipmentStatus::Pending,
    ShipmentStatus::Accepted,
    ShipmentStatus::PickedUp,
    ShipmentStatus::InTransit,
    ShipmentStatus::Delivered,
    ShipmentStatus::Cancelled,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      ShipmentStatus::Pending => "pending",
      ShipmentStatus::Accepted => "accepted",
      ShipmentStatus::PickedUp => "picked_up",
      ShipmentStatus::InTransit => "in_transit",
      ShipmentStatus::Delivered => "delivered",
      ShipmentStatus::Cancelled => "cancelled",
    }
  }
}

impl std::str::FromStr for ShipmentStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
    ShipmentStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == wanted)
      .ok_or_else(|| format!("unknown shipment status '{}'", s))
  }
}

impl std::fmt::Display for ShipmentStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.pad(self.as_str())
  }
}

/// A shipment as listed by the admin console.
///
/// Everything besides `id` and `status` (pickup/dropoff locations, cargo,
/// assigned broker and driver, customer) lives in `details` and is treated
/// opaquely: a patch replaces a top-level detail key wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
  pub id: RecordId,
  pub status: ShipmentStatus,
  #[serde(flatten)]
  pub details: Map<String, Value>,
}

impl Shipment {
  pub fn new(id: RecordId, status: ShipmentStatus) -> Self {
    Self {
      id,
      status,
      details: Map::new(),
    }
  }

  /// String-ish view of a detail field, used for search and display.
  pub fn detail_text(&self, key: &str) -> Option<String> {
    match self.details.get(key)? {
      Value::Null => None,
      Value::String(s) => Some(s.clone()),
      other => Some(other.to_string()),
    }
  }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
  Admin,
  Customer,
  /// Truckers double as brokers on the platform
  #[serde(alias = "broker")]
  Trucker,
  Driver,
}

impl UserRole {
  pub fn as_str(&self) -> &'static str {
    match self {
      UserRole::Admin => "admin",
      UserRole::Customer => "customer",
      UserRole::Trucker => "trucker",
      UserRole::Driver => "driver",
    }
  }
}

impl std::str::FromStr for UserRole {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "admin" => Ok(UserRole::Admin),
      "customer" => Ok(UserRole::Customer),
      "trucker" | "broker" => Ok(UserRole::Trucker),
      "driver" => Ok(UserRole::Driver),
      _ => Err(format!("unknown user role '{}'", s)),
    }
  }
}

impl std::fmt::Display for UserRole {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.pad(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id: RecordId,
  pub role: UserRole,
  #[serde(rename = "isApproved", default)]
  pub is_approved: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone: Option<String>,
  // Remaining contact/company fields
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl User {
  pub fn new(id: RecordId, role: UserRole) -> Self {
    Self {
      id,
      role,
      is_approved: false,
      name: None,
      email: None,
      phone: None,
      extra: Map::new(),
    }
  }
}

// ============================================================================
// Filters
// ============================================================================

/// Filter for the shipments table. Also forwarded to the API as query parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentFilter {
  #[serde(default)]
  pub status: Option<ShipmentStatus>,
  #[serde(default)]
  pub search: Option<String>,
}

impl ShipmentFilter {
  pub fn is_empty(&self) -> bool {
    self.status.is_none() && self.search.as_deref().map_or(true, str::is_empty)
  }

  pub fn matches(&self, shipment: &Shipment) -> bool {
    if let Some(status) = self.status {
      if shipment.status != status {
        return false;
      }
    }
    match normalized_search(&self.search) {
      Some(needle) => {
        shipment.id.to_string() == needle
          || shipment
            .details
            .values()
            .any(|v| value_contains(v, &needle))
      }
      None => true,
    }
  }
}

/// Filter for the users table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserFilter {
  #[serde(default)]
  pub role: Option<UserRole>,
  #[serde(default)]
  pub approved: Option<bool>,
  #[serde(default)]
  pub search: Option<String>,
}

impl UserFilter {
  pub fn is_empty(&self) -> bool {
    self.role.is_none()
      && self.approved.is_none()
      && self.search.as_deref().map_or(true, str::is_empty)
  }

  pub fn matches(&self, user: &User) -> bool {
    if self.role.is_some_and(|role| user.role != role) {
      return false;
    }
    if self.approved.is_some_and(|approved| user.is_approved != approved) {
      return false;
    }
    match normalized_search(&self.search) {
      Some(needle) => [&user.name, &user.email, &user.phone]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle)),
      None => true,
    }
  }
}

fn normalized_search(search: &Option<String>) -> Option<String> {
  search
    .as_deref()
    .map(|s| s.trim().to_lowercase())
    .filter(|s| !s.is_empty())
}

/// Case-insensitive substring match over string leaves of a JSON value.
fn value_contains(value: &Value, needle: &str) -> bool {
  match value {
    Value::String(s) => s.to_lowercase().contains(needle),
    Value::Array(items) => items.iter().any(|v| value_contains(v, needle)),
    Value::Object(map) => map.values().any(|v| value_contains(v, needle)),
    _ => false,
  }
}
