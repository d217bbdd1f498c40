//! Identity tokens for observables and model types.
//!
//! Both tokens wrap the `TypeId` of a marker type, so they are unique for the
//! whole process, cheap to compare and hash, and never serialized. The carried
//! name only feeds diagnostics.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A computable quantity a model may or may not provide.
///
/// Implemented by zero-sized marker types, e.g. `StaticConductance`.
pub trait Observable: 'static {
    const NAME: &'static str;
}

/// Marker for a model-type identity, used to check submodel compatibility.
pub trait ModelTypeTag: 'static {
    const NAME: &'static str;
}

/// The identity presented by every model that is not a named submodel kind.
#[derive(Debug, Clone, Copy)]
pub struct GenericModel;

impl ModelTypeTag for GenericModel {
    const NAME: &'static str = "generic model";
}

/// Identity token for an observable capability.
#[derive(Clone, Copy)]
pub struct ObservableIndex {
    id: TypeId,
    name: &'static str,
}

impl ObservableIndex {
    pub fn of<T: Observable>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::NAME,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Identity token for a model type.
#[derive(Clone, Copy)]
pub struct ModelType {
    id: TypeId,
    name: &'static str,
}

impl ModelType {
    pub fn of<T: ModelTypeTag>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::NAME,
        }
    }

    /// The root identity shared by all non-submodel kinds.
    pub fn generic() -> Self {
        Self::of::<GenericModel>()
    }

    pub fn is_generic(&self) -> bool {
        *self == Self::generic()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

macro_rules! identity_traits {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $ty {}

        impl Hash for $ty {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($ty), self.name)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name)
            }
        }
    };
}

identity_traits!(ObservableIndex);
identity_traits!(ModelType);
