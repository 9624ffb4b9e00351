//! Query / Category - cheap-to-clone text labels
//!
//! Both use Arc<str> internally: they are created once per call (or once
//! per plan) and then cloned into every spawned search unit.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

macro_rules! arc_str_label {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Default)]
        pub struct $name(Arc<str>);

        impl $name {
            /// Create a new label from a string slice.
            #[inline]
            pub fn new(s: &str) -> Self {
                Self(Arc::from(s))
            }

            /// Get the underlying string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            #[inline]
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(s: &str) -> Self {
                Self(Arc::from(s))
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(s: String) -> Self {
                Self(Arc::from(s))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl PartialEq for $name {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
            }
        }

        impl Eq for $name {}

        impl PartialEq<str> for $name {
            #[inline]
            fn eq(&self, other: &str) -> bool {
                self.0.as_ref() == other
            }
        }

        impl PartialEq<&str> for $name {
            #[inline]
            fn eq(&self, other: &&str) -> bool {
                self.0.as_ref() == *other
            }
        }

        impl Hash for $name {
            #[inline]
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.hash(state)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Ok(Self::from(s))
            }
        }
    };
}

arc_str_label! {
    /// Opaque query text, passed unchanged through every layer.
    ///
    /// # Examples
    /// ```
    /// use contracts::Query;
    ///
    /// let q: Query = "golang".into();
    /// assert_eq!(q, "golang");
    /// assert_eq!(q.to_string(), "golang");
    /// ```
    Query
}

arc_str_label! {
    /// Backend category label (e.g. `web`, `image`, `video`).
    ///
    /// Echoed verbatim into every answer the category produces.
    Category
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_clone_is_cheap() {
        let q1: Query = "golang".into();
        let q2 = q1.clone();
        assert_eq!(q1.as_str().as_ptr(), q2.as_str().as_ptr());
    }

    #[test]
    fn test_category_as_map_key() {
        let mut map: HashMap<Category, u32> = HashMap::new();
        map.insert("web".into(), 1);
        map.insert("video".into(), 2);
        assert_eq!(map.get("web"), Some(&1));
        assert_eq!(map.get("image"), None);
    }

    #[test]
    fn test_debug_names_the_label_kind() {
        let c = Category::new("image");
        assert_eq!(format!("{c:?}"), "Category(\"image\")");
    }

    #[test]
    fn test_serde_transparent() {
        let q: Query = "rust async".into();
        let json = serde_json::to_string(&q).unwrap();
        assert_eq!(json, "\"rust async\"");
        let parsed: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, q);
    }
}
