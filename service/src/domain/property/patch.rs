//! [`Patch`] of a [`Property`] and its validation.

use common::DateTime;
use derive_more::{Display, Error};

use crate::domain::user;

use super::{Id, Location, NumRooms, Price, Property, Status};

/// Raw [`Property`] attributes supplied by a caller.
///
/// Nothing is validated yet, see [`Patch::try_from()`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Fields {
    /// Raw [`Location`].
    pub location: Option<String>,

    /// Raw [`NumRooms`].
    pub num_rooms: Option<i64>,

    /// Raw [`Price`], as a decimal string.
    pub price: Option<String>,

    /// Raw [`Status`], as a `SCREAMING_SNAKE_CASE` name.
    pub status: Option<String>,
}

/// Validated set of [`Property`] attributes to be changed.
///
/// Absent attributes are left untouched.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Patch {
    /// New [`Location`], if any.
    pub location: Option<Location>,

    /// New [`NumRooms`], if any.
    pub num_rooms: Option<NumRooms>,

    /// New [`Price`], if any.
    pub price: Option<Price>,

    /// New [`Status`], if any.
    pub status: Option<Status>,
}

impl Patch {
    /// Indicates whether this [`Patch`] changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.num_rooms.is_none()
            && self.price.is_none()
            && self.status.is_none()
    }

    /// Applies this [`Patch`] to the provided [`Property`], changing only the
    /// supplied attributes.
    pub fn apply_to(self, property: &mut Property) {
        let Self {
            location,
            num_rooms,
            price,
            status,
        } = self;

        if let Some(location) = location {
            property.location = location;
        }
        if let Some(num_rooms) = num_rooms {
            property.num_rooms = num_rooms;
        }
        if let Some(price) = price {
            property.price = price;
        }
        if let Some(status) = status {
            property.status = status;
        }
    }

    /// Builds a new [`Property`] owned by the provided [`user::Id`] out of
    /// this [`Patch`].
    ///
    /// # Errors
    ///
    /// With [`ValidationError::Missing`] if any attribute is absent.
    pub fn into_property(
        self,
        owner_id: user::Id,
    ) -> Result<Property, ValidationError> {
        use ValidationError as E;

        let Self {
            location,
            num_rooms,
            price,
            status,
        } = self;

        Ok(Property {
            id: Id::new(),
            owner_id,
            location: location.ok_or(E::Missing(Field::Location))?,
            num_rooms: num_rooms.ok_or(E::Missing(Field::NumRooms))?,
            price: price.ok_or(E::Missing(Field::Price))?,
            status: status.ok_or(E::Missing(Field::Status))?,
            created_at: DateTime::now().coerce(),
        })
    }
}

impl TryFrom<Fields> for Patch {
    type Error = ValidationError;

    fn try_from(fields: Fields) -> Result<Self, Self::Error> {
        let Fields {
            location,
            num_rooms,
            price,
            status,
        } = fields;

        Ok(Self {
            location: location
                .map(|l| {
                    Location::new(l).ok_or_else(|| {
                        ValidationError::invalid(
                            Field::Location,
                            "must be a non-empty trimmed string of at most \
                             512 bytes",
                        )
                    })
                })
                .transpose()?,
            num_rooms: num_rooms
                .map(|n| {
                    NumRooms::new(n).ok_or_else(|| {
                        ValidationError::invalid(
                            Field::NumRooms,
                            format!(
                                "must be an integer between 1 and {}",
                                u16::MAX,
                            ),
                        )
                    })
                })
                .transpose()?,
            price: price
                .map(|p| parse_price(Field::Price, &p))
                .transpose()?,
            status: status
                .map(|s| {
                    s.parse::<Status>().map_err(|_| {
                        ValidationError::invalid(
                            Field::Status,
                            format!(
                                "must be one of: {}",
                                Status::ALL
                                    .iter()
                                    .map(ToString::to_string)
                                    .collect::<Vec<_>>()
                                    .join(", "),
                            ),
                        )
                    })
                })
                .transpose()?,
        })
    }
}

/// Parses the provided raw `input` as a [`Price`] of the provided [`Field`].
///
/// # Errors
///
/// With [`ValidationError::Invalid`] if the `input` is not a non-negative
/// decimal number.
fn parse_price(
    field: Field,
    input: &str,
) -> Result<Price, ValidationError> {
    input
        .parse()
        .map_err(|e: &str| ValidationError::invalid(field, e))
}

/// Attribute a [`ValidationError`] relates to.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Field {
    /// [`Property::location`].
    #[display("location")]
    Location,

    /// [`Property::num_rooms`].
    #[display("num_rooms")]
    NumRooms,

    /// [`Property::price`].
    #[display("price")]
    Price,

    /// [`Property::status`].
    #[display("status")]
    Status,

    /// Lower [`Price`] bound of a search.
    #[display("min_price")]
    MinPrice,

    /// Upper [`Price`] bound of a search.
    #[display("max_price")]
    MaxPrice,
}

/// Error of validating raw [`Property`] attributes.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum ValidationError {
    /// Required attribute is absent.
    #[display("`{_0}` is required")]
    Missing(#[error(not(source))] Field),

    /// Attribute has a malformed value.
    #[display("`{field}` is invalid: {reason}")]
    Invalid {
        /// Malformed attribute.
        field: Field,

        /// Human-readable explanation.
        reason: String,
    },
}

impl ValidationError {
    /// Creates a new [`ValidationError::Invalid`].
    fn invalid(field: Field, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::domain::{
        property::{self, Location, NumRooms, Price, Status},
        user, Property,
    };

    use super::{Field, Fields, Patch, ValidationError};

    fn full_fields() -> Fields {
        Fields {
            location: Some("Downtown".into()),
            num_rooms: Some(3),
            price: Some("150".into()),
            status: Some("AVAILABLE".into()),
        }
    }

    #[test]
    fn validates_every_supplied_field() {
        let patch = Patch::try_from(full_fields()).unwrap();

        assert_eq!(patch.location, Location::new("Downtown"));
        assert_eq!(patch.num_rooms, NumRooms::new(3));
        assert_eq!(patch.price, Price::new(Decimal::from(150)));
        assert_eq!(patch.status, Some(Status::Available));
    }

    #[test]
    fn absent_fields_stay_absent() {
        let patch = Patch::try_from(Fields {
            price: Some("99.90".into()),
            ..Fields::default()
        })
        .unwrap();

        assert!(patch.location.is_none());
        assert!(patch.num_rooms.is_none());
        assert!(patch.status.is_none());
        assert!(!patch.is_empty());
        assert!(Patch::try_from(Fields::default()).unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_fields() {
        let cases = [
            (
                Fields {
                    location: Some("  ".into()),
                    ..Fields::default()
                },
                Field::Location,
            ),
            (
                Fields {
                    num_rooms: Some(0),
                    ..Fields::default()
                },
                Field::NumRooms,
            ),
            (
                Fields {
                    price: Some("-5".into()),
                    ..Fields::default()
                },
                Field::Price,
            ),
            (
                Fields {
                    price: Some("a lot".into()),
                    ..Fields::default()
                },
                Field::Price,
            ),
            (
                Fields {
                    status: Some("RENTED".into()),
                    ..Fields::default()
                },
                Field::Status,
            ),
        ];

        for (fields, expected) in cases {
            match Patch::try_from(fields) {
                Err(ValidationError::Invalid { field, .. }) => {
                    assert_eq!(field, expected);
                }
                other => panic!("expected invalid `{expected}`: {other:?}"),
            }
        }
    }

    #[test]
    fn invalid_status_lists_allowed_values() {
        let err = Patch::try_from(Fields {
            status: Some("RENTED".into()),
            ..Fields::default()
        })
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "`status` is invalid: must be one of: AVAILABLE, SOLD, PENDING",
        );
    }

    #[test]
    fn builds_property_from_complete_patch() {
        let owner = user::Id::new();
        let property = Patch::try_from(full_fields())
            .unwrap()
            .into_property(owner)
            .unwrap();

        assert_eq!(property.owner_id, owner);
        assert_eq!(property.location.as_ref(), "Downtown");
        assert_eq!(property.num_rooms.get(), 3);
        assert_eq!(property.status, Status::Available);
    }

    #[test]
    fn requires_every_field_for_new_property() {
        let err = Patch::try_from(Fields {
            status: None,
            ..full_fields()
        })
        .unwrap()
        .into_property(user::Id::new())
        .unwrap_err();

        assert_eq!(err, ValidationError::Missing(Field::Status));
        assert_eq!(err.to_string(), "`status` is required");
    }

    #[test]
    fn applies_only_supplied_fields() {
        let mut property = Property {
            id: property::Id::new(),
            owner_id: user::Id::new(),
            location: Location::new("Downtown").unwrap(),
            num_rooms: NumRooms::new(2).unwrap(),
            price: "150".parse().unwrap(),
            status: Status::Available,
            created_at: property::CreationDateTime::now(),
        };
        let before = property.clone();

        Patch {
            price: Some("175".parse().unwrap()),
            ..Patch::default()
        }
        .apply_to(&mut property);

        assert_eq!(property.price, "175".parse().unwrap());
        assert_eq!(property.location, before.location);
        assert_eq!(property.num_rooms, before.num_rooms);
        assert_eq!(property.status, before.status);
        assert_eq!(property.id, before.id);
    }
}
