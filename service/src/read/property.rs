//! [`Property`] read model definitions.
//!
//! [`Property`]: crate::domain::Property

pub mod search {
    //! [`Property`] search definitions.

    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    #[cfg(doc)]
    use crate::domain::property::{Location, NumRooms, Price};
    use crate::domain::{
        property::{Field, ValidationError},
        Property,
    };

    /// Conjunctive filter of [`Property`] search.
    ///
    /// Every set criterion must hold for a [`Property`] to match, while unset
    /// ones impose no constraint, so the [`Default`] [`Filter`] matches
    /// everything.
    ///
    /// Criteria are plain numbers rather than [`NumRooms`] and [`Price`], so
    /// out-of-domain bounds are fine: a negative `min_price` matches every
    /// [`Price`] and zero `num_rooms` matches nothing.
    #[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
    pub struct Filter {
        /// Part of [`Location`] to search for, case-insensitively.
        pub location: Option<String>,

        /// Exact number of rooms to search for.
        pub num_rooms: Option<i64>,

        /// Inclusive lower [`Price`] bound.
        pub min_price: Option<Decimal>,

        /// Inclusive upper [`Price`] bound.
        pub max_price: Option<Decimal>,
    }

    impl Filter {
        /// Restricts this [`Filter`] to [`Property`]s whose
        /// [`Location`] contains the provided `part`.
        #[must_use]
        pub fn location(mut self, part: impl Into<String>) -> Self {
            self.location = Some(part.into());
            self
        }

        /// Restricts this [`Filter`] to [`Property`]s with exactly `num`
        /// rooms.
        #[must_use]
        pub fn num_rooms(mut self, num: i64) -> Self {
            self.num_rooms = Some(num);
            self
        }

        /// Restricts this [`Filter`] to [`Property`]s priced at least at the
        /// provided `amount`.
        #[must_use]
        pub fn min_price(mut self, amount: Decimal) -> Self {
            self.min_price = Some(amount.normalize());
            self
        }

        /// Restricts this [`Filter`] to [`Property`]s priced at most at the
        /// provided `amount`.
        #[must_use]
        pub fn max_price(mut self, amount: Decimal) -> Self {
            self.max_price = Some(amount.normalize());
            self
        }

        /// Indicates whether no [`Property`] can ever match this [`Filter`].
        #[must_use]
        pub fn is_unsatisfiable(&self) -> bool {
            matches!(
                (self.min_price, self.max_price),
                (Some(min), Some(max)) if min > max,
            )
        }

        /// Checks whether the provided [`Property`] matches this [`Filter`].
        #[must_use]
        pub fn matches(&self, property: &Property) -> bool {
            let Self {
                location,
                num_rooms,
                min_price,
                max_price,
            } = self;

            location
                .as_deref()
                .map_or(true, |l| property.location.contains_ignore_case(l))
                && num_rooms
                    .map_or(true, |n| i64::from(property.num_rooms.get()) == n)
                && min_price.map_or(true, |p| property.price.amount() >= p)
                && max_price.map_or(true, |p| property.price.amount() <= p)
        }
    }

    /// Raw search criteria supplied by a caller.
    ///
    /// Validated into a [`Filter`] with [`Filter::try_from()`].
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub struct Criteria {
        /// Part of [`Location`] to search for.
        pub location: Option<String>,

        /// Exact number of rooms.
        pub num_rooms: Option<i64>,

        /// Raw inclusive lower [`Price`] bound, as a decimal number.
        pub min_price: Option<String>,

        /// Raw inclusive upper [`Price`] bound, as a decimal number.
        pub max_price: Option<String>,
    }

    impl TryFrom<Criteria> for Filter {
        type Error = ValidationError;

        fn try_from(criteria: Criteria) -> Result<Self, Self::Error> {
            let Criteria {
                location,
                num_rooms,
                min_price,
                max_price,
            } = criteria;

            Ok(Self {
                location,
                num_rooms,
                min_price: min_price
                    .map(|p| parse_bound(Field::MinPrice, &p))
                    .transpose()?,
                max_price: max_price
                    .map(|p| parse_bound(Field::MaxPrice, &p))
                    .transpose()?,
            })
        }
    }

    /// Parses the provided raw `input` as a price bound of the provided
    /// [`Field`].
    ///
    /// Any decimal number is accepted, including a negative one.
    fn parse_bound(
        field: Field,
        input: &str,
    ) -> Result<Decimal, ValidationError> {
        let input = input.trim();
        Decimal::from_str(input)
            .or_else(|_| Decimal::from_scientific(input))
            .map(|d| d.normalize())
            .map_err(|_| ValidationError::Invalid {
                field,
                reason: "not a decimal number".into(),
            })
    }

    #[cfg(test)]
    mod spec {
        use rust_decimal::Decimal;

        use crate::domain::{
            property::{
                self, Field, Location, NumRooms, Status, ValidationError,
            },
            user, Property,
        };

        use super::{Criteria, Filter};

        fn property(location: &str, num_rooms: u16, price: &str) -> Property {
            Property {
                id: property::Id::new(),
                owner_id: user::Id::new(),
                location: Location::new(location).unwrap(),
                num_rooms: NumRooms::new(num_rooms).unwrap(),
                price: price.parse().unwrap(),
                status: Status::Available,
                created_at: property::CreationDateTime::now(),
            }
        }

        #[test]
        fn default_matches_everything() {
            let filter = Filter::default();

            assert!(filter.matches(&property("Downtown", 2, "150")));
            assert!(filter.matches(&property("Uptown", 5, "0")));
        }

        #[test]
        fn location_is_case_insensitive_substring() {
            let filter = Filter::default().location("TOWN");

            assert!(filter.matches(&property("Downtown", 2, "150")));
            assert!(!filter.matches(&property("Riverside", 2, "150")));
        }

        #[test]
        fn empty_location_matches_everything() {
            assert!(Filter::default()
                .location("")
                .matches(&property("Riverside", 1, "1")));
        }

        #[test]
        fn num_rooms_is_exact() {
            let filter = Filter::default().num_rooms(3);

            assert!(filter.matches(&property("Downtown", 3, "150")));
            assert!(!filter.matches(&property("Downtown", 4, "150")));
        }

        #[test]
        fn price_bounds_are_inclusive() {
            let filter = Filter::default()
                .min_price("100".parse().unwrap())
                .max_price("200".parse().unwrap());

            assert!(filter.matches(&property("A", 1, "100")));
            assert!(filter.matches(&property("A", 1, "200.00")));
            assert!(!filter.matches(&property("A", 1, "99.99")));
            assert!(!filter.matches(&property("A", 1, "200.01")));
        }

        #[test]
        fn conjoins_all_criteria() {
            let filter = Filter::default()
                .location("town")
                .max_price("200".parse().unwrap());

            assert!(filter.matches(&property("Downtown", 2, "150")));
            assert!(!filter.matches(&property("Uptown", 2, "300")));
            assert!(!filter.matches(&property("Riverside", 2, "150")));
        }

        #[test]
        fn out_of_domain_bounds_are_plain_comparisons() {
            let cheap = property("Downtown", 2, "150");

            assert!(Filter::default()
                .min_price(Decimal::NEGATIVE_ONE)
                .matches(&cheap));
            assert!(!Filter::default()
                .max_price(Decimal::NEGATIVE_ONE)
                .matches(&cheap));
            assert!(!Filter::default().num_rooms(0).matches(&cheap));
            assert!(!Filter::default().num_rooms(-2).matches(&cheap));
            assert!(!Filter::default().num_rooms(70_000).matches(&cheap));
        }

        #[test]
        fn detects_inverted_price_bounds() {
            let filter = Filter::default()
                .min_price("300".parse().unwrap())
                .max_price("100".parse().unwrap());

            assert!(filter.is_unsatisfiable());
            assert!(!Filter::default().is_unsatisfiable());
        }

        #[test]
        fn validates_criteria() {
            let filter = Filter::try_from(Criteria {
                location: Some("town".into()),
                num_rooms: Some(2),
                min_price: Some("10".into()),
                max_price: None,
            })
            .unwrap();
            assert_eq!(filter.location.as_deref(), Some("town"));
            assert_eq!(filter.num_rooms, Some(2));
            assert_eq!(filter.min_price, Some(Decimal::TEN));
            assert_eq!(filter.max_price, None);

            let err = Filter::try_from(Criteria {
                max_price: Some("cheap".into()),
                ..Criteria::default()
            })
            .unwrap_err();
            assert!(matches!(
                err,
                ValidationError::Invalid {
                    field: Field::MaxPrice,
                    ..
                },
            ));

            let filter = Filter::try_from(Criteria {
                num_rooms: Some(0),
                min_price: Some(" -1 ".into()),
                ..Criteria::default()
            })
            .unwrap();
            assert_eq!(filter.num_rooms, Some(0));
            assert_eq!(filter.min_price, Some(Decimal::NEGATIVE_ONE));
        }
    }
}
