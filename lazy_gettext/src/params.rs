//! Substitution arguments attached to a [`Message`].
//!
//! Params mirror the three shapes a printf-style template accepts: a single
//! value, an ordered sequence, or a mapping from key to value. Any value may
//! itself be a lazy [`Message`]; [`Params::translate`] resolves those into
//! the requested locale before substitution, leaving everything else as-is.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::FormatError;
use crate::message::Message;

/// A single substitution argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Text inserted as-is.
    Str(String),
    /// Signed integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// Nested lazy message, translated alongside its parent.
    Message(Box<Message>),
}

impl Param {
    /// Short name of the value's type, used in conversion errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) | Self::Message(_) => "str",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
        }
    }

    /// Resolves a nested message into `locale`; other values are cloned.
    ///
    /// # Errors
    ///
    /// Propagates substitution failures from the nested message's own
    /// params.
    pub fn translate(&self, locale: Option<&str>) -> Result<Self, FormatError> {
        match self {
            Self::Message(message) => message.translate(locale).map(Self::Str),
            other => Ok(other.clone()),
        }
    }

    /// Replaces a nested message with its default text.
    #[must_use]
    pub fn to_default_text(&self) -> Self {
        match self {
            Self::Message(message) => Self::Str(message.default_text().to_owned()),
            other => other.clone(),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(text) => f.write_str(text),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Message(message) => f.write_str(message.default_text()),
        }
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Param {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Message> for Param {
    fn from(value: Message) -> Self {
        Self::Message(Box::new(value))
    }
}

/// The substitution arguments of a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// One value filling a single positional placeholder.
    Scalar(Param),
    /// Values filling positional placeholders in order.
    Sequence(Vec<Param>),
    /// Values filling `%(key)` placeholders.
    Mapping(BTreeMap<String, Param>),
}

impl Params {
    /// Builds a mapping from key/value pairs.
    ///
    /// # Examples
    /// ```rust
    /// use lazy_gettext::{Param, Params};
    ///
    /// let params = Params::mapping([("name", Param::from("Ada")), ("age", Param::from(36))]);
    /// assert!(matches!(params, Params::Mapping(ref map) if map.len() == 2));
    /// ```
    pub fn mapping<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Param>,
    {
        Self::Mapping(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Builds a positional sequence.
    pub fn sequence<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Param>,
    {
        Self::Sequence(values.into_iter().map(Into::into).collect())
    }

    fn map_values<F>(&self, mut convert: F) -> Result<Self, FormatError>
    where
        F: FnMut(&Param) -> Result<Param, FormatError>,
    {
        Ok(match self {
            Self::Scalar(value) => Self::Scalar(convert(value)?),
            Self::Sequence(values) => {
                Self::Sequence(values.iter().map(&mut convert).collect::<Result<_, _>>()?)
            }
            Self::Mapping(entries) => Self::Mapping(
                entries
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), convert(value)?)))
                    .collect::<Result<_, FormatError>>()?,
            ),
        })
    }

    /// Translates every nested message into `locale`.
    ///
    /// The shape is preserved and mapping keys are left untouched; only
    /// [`Param::Message`] values change, becoming [`Param::Str`].
    ///
    /// # Errors
    ///
    /// Propagates the first substitution failure raised by a nested message.
    pub fn translate(&self, locale: Option<&str>) -> Result<Self, FormatError> {
        self.map_values(|value| value.translate(locale))
    }

    /// Replaces every nested message with its default text.
    #[must_use]
    pub fn to_default_text(&self) -> Self {
        match self {
            Self::Scalar(value) => Self::Scalar(value.to_default_text()),
            Self::Sequence(values) => {
                Self::Sequence(values.iter().map(Param::to_default_text).collect())
            }
            Self::Mapping(entries) => Self::Mapping(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_default_text()))
                    .collect(),
            ),
        }
    }

    /// Combines params supplied to an already-parameterised message.
    ///
    /// A mapping merged over a mapping keeps existing keys and overrides
    /// duplicates. Any other combination replaces the existing params.
    #[must_use]
    pub fn merge(self, newer: Self) -> Self {
        match (self, newer) {
            (Self::Mapping(mut existing), Self::Mapping(update)) => {
                existing.extend(update);
                Self::Mapping(existing)
            }
            (_, replacement) => replacement,
        }
    }

    /// Reports whether any value is a nested message.
    #[must_use]
    pub fn has_messages(&self) -> bool {
        let nested = |value: &Param| matches!(value, Param::Message(_));
        match self {
            Self::Scalar(value) => nested(value),
            Self::Sequence(values) => values.iter().any(nested),
            Self::Mapping(entries) => entries.values().any(nested),
        }
    }
}

macro_rules! scalar_params_from {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for Params {
                fn from(value: $source) -> Self {
                    Self::Scalar(Param::from(value))
                }
            }
        )+
    };
}

scalar_params_from!(&str, String, i32, i64, u32, f64, Message);

impl From<Param> for Params {
    fn from(value: Param) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<Param>> for Params {
    fn from(values: Vec<Param>) -> Self {
        Self::Sequence(values)
    }
}

impl From<BTreeMap<String, Param>> for Params {
    fn from(entries: BTreeMap<String, Param>) -> Self {
        Self::Mapping(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MemoryCatalog, MemoryResolver};
    use anyhow::ensure;
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    #[fixture]
    fn greeting() -> Message {
        let resolver = MemoryResolver::new().with_catalog(
            "params",
            "es",
            MemoryCatalog::new().with_message("Hello", "Hola"),
        );
        Message::builder(crate::MessageKind::simple("Hello"))
            .domain("params")
            .text("Hello")
            .resolver(Arc::new(resolver))
            .build()
    }

    #[rstest]
    fn translate_replaces_nested_messages_only(greeting: Message) -> anyhow::Result<()> {
        let params = Params::mapping([
            ("greeting", Param::from(greeting)),
            ("count", Param::from(3)),
        ]);
        let translated = params.translate(Some("es"))?;
        let expected =
            Params::mapping([("greeting", Param::from("Hola")), ("count", Param::from(3))]);
        ensure!(translated == expected, "translated {translated:?}");
        ensure!(params.has_messages(), "source params lost their message");
        ensure!(!translated.has_messages(), "nested message survived translation");
        Ok(())
    }

    #[rstest]
    fn translate_keeps_sequence_order(greeting: Message) -> anyhow::Result<()> {
        let params = Params::sequence([Param::from(1.5), Param::from(greeting), Param::from("x")]);
        let translated = params.translate(Some("es"))?;
        let expected = Params::sequence([Param::from(1.5), Param::from("Hola"), Param::from("x")]);
        ensure!(translated == expected, "translated {translated:?}");
        Ok(())
    }

    #[rstest]
    fn default_text_stands_in_for_messages(greeting: Message) {
        let params = Params::from(greeting);
        assert_eq!(params.to_default_text(), Params::from("Hello"));
    }

    #[rstest]
    fn merge_overrides_duplicate_keys() {
        let existing = Params::mapping([("a", 1), ("b", 2)]);
        let merged = existing.merge(Params::mapping([("b", 20), ("c", 30)]));
        assert_eq!(merged, Params::mapping([("a", 1), ("b", 20), ("c", 30)]));
    }

    #[rstest]
    #[case(Params::mapping([("a", 1)]), Params::from("solo"), Params::from("solo"))]
    #[case(Params::from(1), Params::mapping([("a", 2)]), Params::mapping([("a", 2)]))]
    #[case(Params::sequence([1, 2]), Params::sequence([3]), Params::sequence([3]))]
    fn merge_replaces_other_shapes(
        #[case] existing: Params,
        #[case] newer: Params,
        #[case] expected: Params,
    ) {
        assert_eq!(existing.merge(newer), expected);
    }

    #[rstest]
    #[case(Param::from("a"), "str")]
    #[case(Param::from(1), "int")]
    #[case(Param::from(1.0), "float")]
    fn type_names(#[case] value: Param, #[case] expected: &str) {
        assert_eq!(value.type_name(), expected);
    }
}
