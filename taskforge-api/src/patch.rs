/// Three-state field wrapper for partial-update payloads
///
/// Update DTOs must distinguish a field the client did not mention from a
/// field the client explicitly set — including setting it to null. A plain
/// `Option<T>` collapses "omitted" and "null" into one state, so update
/// fields are wrapped in `Patch<T>`:
///
/// - field omitted from the payload → `Patch::Absent` (leave unchanged)
/// - field present with a value → `Patch::Present(value)`
/// - field present as null → `Patch::Present(None)` when `T` is an
///   `Option`, clearing the column
///
/// Fields must be declared with `#[serde(default)]` so omission falls back
/// to `Absent`:
///
/// ```
/// use serde::Deserialize;
/// use taskforge_api::patch::Patch;
///
/// #[derive(Deserialize, Default)]
/// struct UpdatePayload {
///     #[serde(default)]
///     title: Patch<String>,
///     #[serde(default)]
///     assignee_id: Patch<Option<i64>>,
/// }
///
/// let p: UpdatePayload = serde_json::from_str(r#"{"assignee_id": null}"#).unwrap();
/// assert!(p.title.is_absent());
/// assert_eq!(p.assignee_id, Patch::Present(None));
/// ```

use serde::{Deserialize, Deserializer};

/// A field that is either absent from the payload or present with a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field was not mentioned in the payload
    Absent,

    /// Field was supplied (possibly as null, for `T = Option<_>`)
    Present(T),
}

impl<T> Patch<T> {
    /// True when the field was omitted
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// True when the field was supplied
    pub fn is_present(&self) -> bool {
        matches!(self, Patch::Present(_))
    }

    /// Borrows the supplied value, if any
    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Patch::Absent => None,
            Patch::Present(v) => Some(v),
        }
    }

    /// Converts into `Option`, losing the absent/present distinction
    pub fn into_option(self) -> Option<T> {
        match self {
            Patch::Absent => None,
            Patch::Present(v) => Some(v),
        }
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Reached only when the field is present; omission is handled by
        // #[serde(default)] on the field.
        T::deserialize(deserializer).map(Patch::Present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Default)]
    struct Payload {
        #[serde(default)]
        title: Patch<String>,
        #[serde(default)]
        index: Patch<Option<i32>>,
        #[serde(default)]
        assignee_id: Patch<Option<i64>>,
    }

    #[test]
    fn test_omitted_fields_are_absent() {
        let p: Payload = serde_json::from_str("{}").unwrap();
        assert!(p.title.is_absent());
        assert!(p.index.is_absent());
        assert!(p.assignee_id.is_absent());
    }

    #[test]
    fn test_present_value() {
        let p: Payload = serde_json::from_str(r#"{"title": "X"}"#).unwrap();
        assert_eq!(p.title, Patch::Present("X".to_string()));
        assert!(p.index.is_absent());
    }

    #[test]
    fn test_present_null_clears_optional_field() {
        let p: Payload = serde_json::from_str(r#"{"assignee_id": null}"#).unwrap();
        assert_eq!(p.assignee_id, Patch::Present(None));
    }

    #[test]
    fn test_null_and_absent_are_distinguishable() {
        let with_null: Payload = serde_json::from_str(r#"{"index": null}"#).unwrap();
        let without: Payload = serde_json::from_str("{}").unwrap();

        assert!(with_null.index.is_present());
        assert!(without.index.is_absent());
    }

    #[test]
    fn test_null_for_required_field_is_rejected() {
        // title is Patch<String>, not Patch<Option<String>>, so null fails
        let result = serde_json::from_str::<Payload>(r#"{"title": null}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_into_option() {
        assert_eq!(Patch::Present(1).into_option(), Some(1));
        assert_eq!(Patch::<i32>::Absent.into_option(), None);
    }
}
