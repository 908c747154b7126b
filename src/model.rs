//! Wire and domain types shared by the pager, the cache and the restorer.
use serde::{Deserialize, Serialize};

/// One accommodation as it appears in a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingItem {
    /// Unique within a category.
    pub id: u64,
    /// Display title.
    pub title: String,
    /// Lowest nightly price.
    pub min_price: u64,
    /// Region label.
    pub region: String,
    /// Thumbnail image URI.
    pub thumbnail_url: String,
}

/// One page of listings, exactly as returned by a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Items in server order.
    #[serde(rename = "accommodationSimpleResponseList")]
    pub items: Vec<ListingItem>,
    /// Whether another page follows this one.
    #[serde(rename = "nextData")]
    pub has_more: bool,
    /// Id half of the next cursor.
    #[serde(rename = "nextCursorId")]
    pub next_cursor_id: u64,
    /// Price half of the next cursor.
    #[serde(rename = "nextCursorMinPrice")]
    pub next_cursor_min_price: u64,
}

/// Compound pagination token. `(0, 0)` is the first page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Cursor {
    /// Last-seen price.
    pub min_price: u64,
    /// Last-seen id.
    pub id: u64,
}

impl Cursor {
    /// The cursor of the first page.
    pub const FIRST: Cursor = Cursor { min_price: 0, id: 0 };

    /// True for `(0, 0)`.
    pub fn is_first(&self) -> bool {
        *self == Self::FIRST
    }
}

/// The fixed set of price floors offered by the listing view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PriceFilter {
    /// No floor, sorted by lowest price.
    #[default]
    Lowest,
    /// 30000 and up.
    From30000,
    /// 50000 and up.
    From50000,
    /// 80000 and up.
    From80000,
}

impl PriceFilter {
    /// Every option, in display order.
    pub const ALL: [PriceFilter; 4] = [
        PriceFilter::Lowest,
        PriceFilter::From30000,
        PriceFilter::From50000,
        PriceFilter::From80000,
    ];

    /// Price floor sent to the server.
    pub fn min_price(self) -> u64 {
        match self {
            Self::Lowest => 0,
            Self::From30000 => 30_000,
            Self::From50000 => 50_000,
            Self::From80000 => 80_000,
        }
    }

    /// Label shown in the option list.
    pub fn label(self) -> &'static str {
        match self {
            Self::Lowest => "lowest price",
            Self::From30000 => "30000~",
            Self::From50000 => "50000~",
            Self::From80000 => "80000~",
        }
    }
}

impl TryFrom<u64> for PriceFilter {
    type Error = anyhow::Error;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|f| f.min_price() == value)
            .ok_or_else(|| anyhow::anyhow!("unknown price filter {value}"))
    }
}

impl std::fmt::Display for PriceFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.min_price())
    }
}

/// Detail object for a single accommodation.
///
/// The server owns its shape, so the fields are kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccommodationDetail {
    /// All top-level fields of the response object.
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl AccommodationDetail {
    /// The accommodation id, if the server included one.
    pub fn id(&self) -> Option<u64> {
        self.fields.get("id").and_then(|v| v.as_u64())
    }
}

/// Check-in / check-out pair for a detail lookup (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StayDates {
    /// First night.
    pub check_in: String,
    /// Departure day.
    pub check_out: String,
}

impl StayDates {
    /// Build a date pair.
    pub fn new(check_in: impl Into<String>, check_out: impl Into<String>) -> Self {
        Self {
            check_in: check_in.into(),
            check_out: check_out.into(),
        }
    }
}
