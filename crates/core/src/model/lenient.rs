use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Deserializes a nested level of the tree, treating anything that is not a
/// well-formed sequence (`null`, an object, a scalar, a bad element) as empty.
pub(crate) fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeSeq<T> {
        Seq(Vec<T>),
        Other(IgnoredAny),
    }

    Ok(match MaybeSeq::<T>::deserialize(deserializer)? {
        MaybeSeq::Seq(items) => items,
        MaybeSeq::Other(_) => Vec::new(),
    })
}
