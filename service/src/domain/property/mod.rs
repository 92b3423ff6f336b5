//! [`Property`] definitions.

mod ownership;
mod patch;

use std::str::FromStr;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;

pub use self::{
    ownership::{authorize, Access},
    patch::{Field, Fields, Patch, ValidationError},
};

/// Property listed on the marketplace.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// ID of the [`User`] owning this [`Property`].
    ///
    /// [`User`]: crate::domain::User
    pub owner_id: user::Id,

    /// [`Location`] of this [`Property`].
    pub location: Location,

    /// [`NumRooms`] in this [`Property`].
    pub num_rooms: NumRooms,

    /// [`Price`] of this [`Property`].
    pub price: Price,

    /// [`Status`] of this [`Property`].
    pub status: Status,

    /// [`DateTime`] when this [`Property`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Property`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    derive_more::FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Location of a [`Property`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(str)]
pub struct Location(String);

impl Location {
    /// Creates a new [`Location`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `location` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// Creates a new [`Location`] if the given `location` is valid.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        Self::check(&location).then_some(Self(location))
    }

    /// Indicates whether this [`Location`] contains the provided `needle`,
    /// ignoring case.
    #[must_use]
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        self.0.to_lowercase().contains(&needle.to_lowercase())
    }

    /// Checks whether the given `location` is a valid [`Location`].
    fn check(location: impl AsRef<str>) -> bool {
        let location = location.as_ref();
        location.trim() == location
            && !location.is_empty()
            && location.len() <= 512
    }
}

impl FromStr for Location {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Location`")
    }
}

/// Number of rooms in a [`Property`].
///
/// Always positive.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd)]
pub struct NumRooms(u16);

impl NumRooms {
    /// Creates a new [`NumRooms`] if the given `num` is positive and fits
    /// into [`u16`].
    #[must_use]
    pub fn new(num: impl TryInto<u16>) -> Option<Self> {
        num.try_into().ok().filter(|n| *n > 0).map(Self)
    }

    /// Returns the number of rooms.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl FromStr for NumRooms {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u16>()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `NumRooms`")
    }
}

/// Price of a [`Property`].
///
/// Always non-negative.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Price(Decimal);

impl Price {
    /// Creates a new [`Price`] if the given `amount` is non-negative.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (!amount.is_sign_negative() || amount.is_zero())
            .then(|| Self(amount.normalize()))
    }

    /// Returns the amount of this [`Price`].
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim())
            .or_else(|_| Decimal::from_scientific(s.trim()))
            .map_err(|_| "invalid `Price`: not a decimal number")?;
        Self::new(amount).ok_or("invalid `Price`: must not be negative")
    }
}

define_kind! {
    #[doc = "Status of a [`Property`] listing."]
    enum Status {
        #[doc = "[`Property`] is available for sale."]
        Available = 1,

        #[doc = "[`Property`] has been sold."]
        Sold = 2,

        #[doc = "[`Property`] sale is pending."]
        Pending = 3,
    }
}

/// [`DateTime`] when a [`Property`] was created.
pub type CreationDateTime = DateTimeOf<(Property, unit::Creation)>;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{Location, NumRooms, Price, Status};

    #[test]
    fn location_must_be_trimmed_and_non_empty() {
        assert!(Location::new("Downtown").is_some());
        assert!(Location::new("").is_none());
        assert!(Location::new(" Downtown").is_none());
        assert!(Location::new("x".repeat(513)).is_none());
    }

    #[test]
    fn location_contains_ignores_case() {
        let location = Location::new("Downtown").unwrap();
        assert!(location.contains_ignore_case("town"));
        assert!(location.contains_ignore_case("DOWN"));
        assert!(location.contains_ignore_case(""));
        assert!(!location.contains_ignore_case("Uptown"));
    }

    #[test]
    fn num_rooms_must_be_positive() {
        assert_eq!(NumRooms::new(3).unwrap().get(), 3);
        assert!(NumRooms::new(0).is_none());
        assert!(NumRooms::new(-2).is_none());
        assert!(NumRooms::new(70_000).is_none());
        assert!("4".parse::<NumRooms>().is_ok());
        assert!("four".parse::<NumRooms>().is_err());
    }

    #[test]
    fn price_must_not_be_negative() {
        assert_eq!(
            "150.50".parse::<Price>().unwrap().amount(),
            Decimal::new(15050, 2),
        );
        assert_eq!("0".parse::<Price>().unwrap().amount(), Decimal::ZERO);
        assert!("-0.01".parse::<Price>().is_err());
        assert!("cheap".parse::<Price>().is_err());
        assert!(Price::new(Decimal::NEGATIVE_ONE).is_none());
    }

    #[test]
    fn equal_prices_compare_equal_regardless_of_scale() {
        assert_eq!(
            "100".parse::<Price>().unwrap(),
            "100.00".parse::<Price>().unwrap(),
        );
    }

    #[test]
    fn status_parses_from_screaming_snake_case() {
        assert_eq!("AVAILABLE".parse::<Status>().unwrap(), Status::Available);
        assert_eq!(Status::Pending.to_string(), "PENDING");
        assert!("RENTED".parse::<Status>().is_err());
    }
}
