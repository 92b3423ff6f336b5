//! GraphQL scalar definitions.

use std::{fmt, marker::PhantomData, str::FromStr};

use derive_more::{AsRef, Display, From, Into};
use juniper::{
    GraphQLScalar, GraphQLType, InputValue, ParseScalarResult,
    ParseScalarValue, ScalarToken, ScalarValue, Value,
};

/// Helper type to use in `#[graphql(with = ..)]` attribute.
///
/// Uses [`FromStr`]/[`Display`] impls of `As` type to convert the target type
/// to/from GraphQL scalar.
///
/// Target type must implement [`TryFrom`] and [`AsRef`] for `As` type.
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Convert the target type into scalar [`Value`] by using [`Display`] impl
    /// of `As` type.
    ///
    /// [`Display`]: fmt::Display
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::from(value.as_ref().to_string())
    }

    /// Constructs the target type from scalar [`Value`] by using [`FromStr`]
    /// impl of `As` type.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the input value is not a string;
    /// - the input value cannot be parsed into `As` type;
    /// - the parsed value cannot be converted into the target type.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr + fmt::Display,
        As::Err: fmt::Display,
        T: TryFrom<As> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let s = input.as_string_value().ok_or_else(|| {
            format!(
                "Cannot parse input scalar `{}`: expected string input \
                 value, found: {input}",
                T::name(&()).expect("always has a name"),
            )
        })?;
        s.parse::<As>()
            .map_err(|e| {
                format!(
                    "Cannot parse input scalar `{}` from \"{s}\" string: {e}",
                    T::name(&()).expect("always has a name"),
                )
            })?
            .try_into()
            .map_err(|e| {
                format!(
                    "Cannot parse input scalar `{}`: {e}",
                    T::name(&()).expect("always has a name"),
                )
            })
    }

    /// Parse the provided [`ScalarToken`].
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be parsed as [`String`].
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

/// Decimal number kept in its textual form, so no precision is lost.
///
/// Accepts numeric literals as input too.
#[derive(
    AsRef, Clone, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[as_ref(str)]
#[graphql(with = Self, parse_token(String, i32, f64))]
pub struct Decimal(String);

impl Decimal {
    /// Converts this [`Decimal`] into a string scalar [`Value`].
    fn to_output<S: ScalarValue>(&self) -> Value<S> {
        Value::scalar(self.0.clone())
    }

    /// Constructs a [`Decimal`] from a string or numeric [`InputValue`].
    fn from_input<S: ScalarValue>(
        input: &InputValue<S>,
    ) -> Result<Self, String> {
        input
            .as_string_value()
            .map(ToOwned::to_owned)
            .or_else(|| input.as_int_value().map(|n| n.to_string()))
            .or_else(|| input.as_float_value().map(|n| n.to_string()))
            .map(Self)
            .ok_or_else(|| {
                format!(
                    "Cannot parse `Decimal` input scalar from non-numeric \
                     value: {input}",
                )
            })
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, InputValue};

    use super::Decimal;

    fn parse(input: InputValue<DefaultScalarValue>) -> String {
        Decimal::from_input(&input).unwrap().into()
    }

    #[test]
    fn accepts_strings_and_numbers() {
        assert_eq!(parse(InputValue::scalar("150.50".to_owned())), "150.50");
        assert_eq!(parse(InputValue::scalar(150)), "150");
        assert_eq!(parse(InputValue::scalar(150.5)), "150.5");
    }

    #[test]
    fn rejects_non_numeric_values() {
        let boolean = InputValue::<DefaultScalarValue>::scalar(true);
        assert!(Decimal::from_input(&boolean).is_err());
        let list = InputValue::<DefaultScalarValue>::list(vec![]);
        assert!(Decimal::from_input(&list).is_err());
    }
}
