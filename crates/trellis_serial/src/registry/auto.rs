use crate::info::Typed;
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// AutoRegistration

/// A type submitted through [`auto_register!`](crate::auto_register).
#[derive(Clone, Copy)]
pub struct AutoRegistration(fn(&mut TypeRegistry));

impl AutoRegistration {
    pub const fn of<T: Typed>() -> Self {
        fn register<T: Typed>(registry: &mut TypeRegistry) {
            registry.register::<T>();
        }
        Self(register::<T>)
    }

    #[cfg(feature = "auto_register")]
    #[inline]
    pub(crate) fn apply(&self, registry: &mut TypeRegistry) {
        (self.0)(registry);
    }
}

#[cfg(feature = "auto_register")]
inventory::collect!(AutoRegistration);
