//! Domain logic for the Hack The World curriculum backend.
//!
//! Pure code only: identifiers, validation rules, enrollment analytics,
//! display formatting and the fixed-window rate limiter. Nothing here
//! touches the network or the database pool.

/// Store a string-backed enum in a Postgres TEXT column.
///
/// The enum must provide `as_str()` and implement `FromStr` with an error
/// that is `std::error::Error + Send + Sync + 'static`.
macro_rules! impl_text_column {
    ($ty:ty) => {
        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
                Ok(s.parse::<$ty>()?)
            }
        }
    };
}

pub mod curriculum;
pub mod enrollment_stats;
pub mod error;
pub mod formatting;
pub mod pagination;
pub mod rate_limit;
pub mod types;
