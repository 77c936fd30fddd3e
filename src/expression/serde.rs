use std::{fmt, marker::PhantomData};

use serde::{de, de::Visitor, Deserialize, Deserializer, Serialize, Serializer};

use crate::data_type::Real;
use crate::expression::{deep::DeepEx, flat::FlatEx, Express};

fn serialize<T: Real, S: Serializer, Ex: Express<T>>(
    serializer: S,
    expr: &Ex,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(expr.unparse())
}

/// Expressions are deserialized by parsing the string they have been serialized to.
#[derive(Debug)]
struct ExVisitor<T, Ex> {
    real_dummy: PhantomData<T>,
    ex_dummy: PhantomData<Ex>,
}

impl<T, Ex> ExVisitor<T, Ex> {
    fn new() -> Self {
        ExVisitor {
            real_dummy: PhantomData,
            ex_dummy: PhantomData,
        }
    }
}

impl<'de, T: Real, Ex: Express<T>> Visitor<'de> for ExVisitor<T, Ex> {
    type Value = Ex;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a &str that can be parsed by `zipex` crate")
    }

    fn visit_str<E>(self, unparsed: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ex::parse(unparsed).map_err(|epe| E::custom(format!("Parse error - {}", epe.msg)))
    }
}

impl<T: Real> Serialize for FlatEx<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize(serializer, self)
    }
}

impl<'de, T: Real> Deserialize<'de> for FlatEx<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(ExVisitor::<T, Self>::new())
    }
}

impl<T: Real> Serialize for DeepEx<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize(serializer, self)
    }
}

impl<'de, T: Real> Deserialize<'de> for DeepEx<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(ExVisitor::<T, Self>::new())
    }
}

#[cfg(test)]
use serde_test::Token;

#[test]
fn test_ser_de() {
    fn test<Ex>(text: &str)
    where
        Ex: Express<f64> + Serialize + for<'de> Deserialize<'de> + fmt::Display,
    {
        let expr = Ex::parse(text).unwrap();
        serde_test::assert_ser_tokens(&expr, &[Token::Str(text)]);
        let serialized = serde_json::to_string(&expr).unwrap();
        let deserialized = serde_json::from_str::<Ex>(serialized.as_str()).unwrap();
        assert_eq!(text, format!("{}", deserialized));
        assert_eq!(expr.eval().unwrap(), deserialized.eval().unwrap());
    }
    for text in ["2 + 3 - 4 * 5 - 6^2", "3! - ln(5-1) + 7/3^2", "-pi*e"] {
        test::<FlatEx<f64>>(text);
        test::<DeepEx<f64>>(text);
    }
}

#[test]
fn test_de_error() {
    let err = serde_json::from_str::<FlatEx<f64>>("\"2 +\"").unwrap_err();
    assert!(format!("{}", err).contains("Parse error"));
    assert!(serde_json::from_str::<DeepEx<f32>>("\"(1\"").is_err());
}
