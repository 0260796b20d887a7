use core::fmt;

use alloc::vec::Vec;

use serde::{
    de,
    de::{MapAccess, SeqAccess, Visitor},
    ser::{SerializeStruct, SerializeTuple},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::PartitionPoints;

const FIELDS: &[&str] = &["points"];

/// A `serde_support` impl
impl Serialize for PartitionPoints {
    /// Serializes the `(offset, enabled)` list in increasing offset order.
    /// In human readable form it is a struct named "PartitionPoints" with a
    /// "points" field.
    ///
    /// ```
    /// // Example using the `ron` crate. Note that it
    /// // omits the struct name which would be "PartitionPoints".
    /// use partint::PartitionPoints;
    /// use ron::to_string;
    ///
    /// let pts = PartitionPoints::new([(8, true), (16, false)]).unwrap();
    /// assert_eq!(to_string(&pts).unwrap(), "(points:[(8,true),(16,false)])");
    /// ```
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            let mut s = serializer.serialize_struct("PartitionPoints", 1)?;
            s.serialize_field("points", &self.points)?;
            s.end()
        } else {
            let mut s = serializer.serialize_tuple(1)?;
            s.serialize_element(&self.points)?;
            s.end()
        }
    }
}

/// Helper for the deserialization impl
enum Field {
    Points,
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Field, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldVisitor;

        impl<'de> Visitor<'de> for FieldVisitor {
            type Value = Field;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("`points`")
            }

            fn visit_str<E>(self, value: &str) -> Result<Field, E>
            where
                E: de::Error,
            {
                match value {
                    "points" => Ok(Field::Points),
                    _ => Err(de::Error::unknown_field(value, FIELDS)),
                }
            }
        }

        deserializer.deserialize_identifier(FieldVisitor)
    }
}

struct PartitionPointsVisitor;

impl PartitionPointsVisitor {
    fn build<E>(points: Vec<(usize, bool)>) -> Result<PartitionPoints, E>
    where
        E: de::Error,
    {
        PartitionPoints::new(points)
            .ok_or_else(|| de::Error::custom("`points` offsets must be nonzero and unique"))
    }
}

impl<'de> Visitor<'de> for PartitionPointsVisitor {
    type Value = PartitionPoints;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter
            .write_str("struct PartitionPoints consisting of a list \"points\" of offset-enable pairs")
    }

    fn visit_map<V>(self, mut map: V) -> Result<PartitionPoints, V::Error>
    where
        V: MapAccess<'de>,
    {
        let mut points: Option<Vec<(usize, bool)>> = None;
        while let Some(key) = map.next_key()? {
            match key {
                Field::Points => {
                    if points.is_some() {
                        return Err(de::Error::duplicate_field("points"))
                    }
                    points = Some(map.next_value()?);
                }
            }
        }
        let points = points.ok_or_else(|| de::Error::missing_field("points"))?;
        Self::build(points)
    }

    fn visit_seq<V>(self, mut seq: V) -> Result<PartitionPoints, V::Error>
    where
        V: SeqAccess<'de>,
    {
        let points: Vec<(usize, bool)> = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        Self::build(points)
    }
}

impl<'de> Deserialize<'de> for PartitionPoints {
    /// Deserializes in human readable or compact form, revalidating the
    /// construction invariants (offset 0 and duplicate offsets are
    /// rejected).
    fn deserialize<D>(deserializer: D) -> Result<PartitionPoints, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            deserializer.deserialize_struct("PartitionPoints", FIELDS, PartitionPointsVisitor)
        } else {
            deserializer.deserialize_tuple(1, PartitionPointsVisitor)
        }
    }
}
