//! Book copy (physical or digital) model and related types

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

/// Kind of copy. Stored in the database as its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CopyType {
    Printed,
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "eBook")]
    Ebook,
}

impl CopyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyType::Printed => "Printed",
            CopyType::Pdf => "PDF",
            CopyType::Ebook => "eBook",
        }
    }
}

impl std::fmt::Display for CopyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CopyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Printed" => Ok(CopyType::Printed),
            "PDF" => Ok(CopyType::Pdf),
            "eBook" => Ok(CopyType::Ebook),
            _ => Err(format!(
                "invalid copy type: {} (expected Printed, PDF or eBook)",
                s
            )),
        }
    }
}

impl sqlx::Type<Postgres> for CopyType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for CopyType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for CopyType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Availability of a copy. Stored in the database as its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AvailabilityStatus {
    Available,
    #[serde(rename = "Reference Only")]
    ReferenceOnly,
    Unavailable,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "Available",
            AvailabilityStatus::ReferenceOnly => "Reference Only",
            AvailabilityStatus::Unavailable => "Unavailable",
        }
    }
}

impl Default for AvailabilityStatus {
    fn default() -> Self {
        AvailabilityStatus::Available
    }
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AvailabilityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(AvailabilityStatus::Available),
            "Reference Only" => Ok(AvailabilityStatus::ReferenceOnly),
            "Unavailable" => Ok(AvailabilityStatus::Unavailable),
            _ => Err(format!(
                "invalid availability status: {} (expected Available, Reference Only or Unavailable)",
                s
            )),
        }
    }
}

impl sqlx::Type<Postgres> for AvailabilityStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for AvailabilityStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for AvailabilityStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Copy of a book. (book_id, copy_number) pairs are unique; copies are
/// listed in copy_number order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookCopy {
    pub id: i32,
    pub book_id: i32,
    pub copy_number: i32,
    pub copy_type: CopyType,
    pub availability_status: AvailabilityStatus,
}
