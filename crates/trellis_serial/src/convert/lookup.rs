use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::ConversionError;
use crate::convert::{Converter, SingleValueConverter, SingleValueConverterWrapper};
use crate::info::Type;

// -----------------------------------------------------------------------------
// Priority

/// The rank of a registered converter, higher values are asked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub i32);

impl Priority {
    pub const VERY_HIGH: Priority = Priority(10000);
    pub const NORMAL: Priority = Priority(0);
    pub const LOW: Priority = Priority(-10);
    /// Used by the generic struct converter, which accepts any struct.
    pub const VERY_LOW: Priority = Priority(-20);
}

impl Default for Priority {
    #[inline]
    fn default() -> Self {
        Self::NORMAL
    }
}

// -----------------------------------------------------------------------------
// ConverterLookup

struct Registration {
    converter: Arc<dyn Converter>,
    priority: Priority,
    /// Exact type binding, replacing `can_convert`.
    binding: Option<Type>,
}

impl Registration {
    #[inline]
    fn accepts(&self, ty: &Type) -> bool {
        match &self.binding {
            Some(bound) => bound == ty,
            None => self.converter.can_convert(ty),
        }
    }
}

/// Picks the converter for a type out of a priority-ranked set.
///
/// Registrations are kept ordered by descending priority, and among equal
/// priorities the newest registration comes first. A lookup returns the
/// first registration accepting the type, so the result only depends on the
/// registrations made.
///
/// # Example
///
/// ```
/// use trellis_serial::convert::{ConverterLookup, FromStrConverter, Priority};
/// use trellis_serial::info::Type;
///
/// let mut lookup = ConverterLookup::new();
/// lookup.register_single_value(FromStrConverter::<u8>::new(), Priority::NORMAL);
///
/// assert!(lookup.lookup(&Type::of::<u8>()).is_ok());
/// assert!(lookup.lookup(&Type::of::<u16>()).is_err());
/// ```
#[derive(Default)]
pub struct ConverterLookup {
    registrations: Vec<Registration>,
}

impl ConverterLookup {
    #[inline]
    pub const fn new() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }

    fn insert(&mut self, registration: Registration) {
        log::debug!(
            "registered converter `{}` with priority {}",
            registration.converter.name(),
            registration.priority.0,
        );
        // Before every registration of the same or a lower priority.
        let index = self
            .registrations
            .partition_point(|old| old.priority > registration.priority);
        self.registrations.insert(index, registration);
    }

    pub fn register(&mut self, converter: impl Converter, priority: Priority) {
        self.register_arc(Arc::new(converter), priority);
    }

    /// See [`register`](Self::register).
    pub fn register_arc(&mut self, converter: Arc<dyn Converter>, priority: Priority) {
        self.insert(Registration {
            converter,
            priority,
            binding: None,
        });
    }

    /// Registers `converter` for exactly `ty`, whatever its `can_convert` says.
    pub fn register_for_type(&mut self, ty: Type, converter: impl Converter, priority: Priority) {
        self.insert(Registration {
            converter: Arc::new(converter),
            priority,
            binding: Some(ty),
        });
    }

    /// Registers a single value converter, writing the value as node text.
    pub fn register_single_value<C: SingleValueConverter + 'static>(&mut self, converter: C, priority: Priority) {
        self.register(SingleValueConverterWrapper::new(converter), priority);
    }

    /// Appends the registrations of `other` as if they were made after the
    /// ones of `self`, in their original order.
    pub fn append(&mut self, other: ConverterLookup) {
        // Oldest first: the lowest priority, then the last within a priority.
        for registration in other.registrations.into_iter().rev() {
            self.insert(registration);
        }
    }

    /// The converter for values of type `ty`.
    pub fn lookup(&self, ty: &Type) -> Result<&dyn Converter, ConversionError> {
        match self.registrations.iter().find(|r| r.accepts(ty)) {
            Some(registration) => {
                log::trace!("type `{ty}` dispatched to `{}`", registration.converter.name());
                Ok(&*registration.converter)
            }
            None => Err(ConversionError::NoConverter(ty.clone())),
        }
    }

    /// Converters in lookup order.
    pub fn iter(&self) -> impl Iterator<Item = (&dyn Converter, Priority)> {
        self.registrations
            .iter()
            .map(|r| (&*r.converter, r.priority))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl fmt::Debug for ConverterLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|(converter, priority)| (converter.name(), priority.0)))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::any::Any;

    use super::{ConverterLookup, Priority};
    use crate::ConversionError;
    use crate::convert::{Converter, FromStrConverter};
    use crate::info::Type;
    use crate::marshal::{MarshalContext, UnmarshalContext};
    use crate::tree::{TreeReader, TreeWriter};

    /// Accepts every type and reports its tag.
    struct Tagged(&'static str);

    impl Converter for Tagged {
        fn can_convert(&self, _: &Type) -> bool {
            true
        }

        fn marshal(
            &self,
            _: &dyn Any,
            writer: &mut dyn TreeWriter,
            _: &mut MarshalContext<'_>,
        ) -> Result<(), ConversionError> {
            writer.write_text(self.0)?;
            Ok(())
        }

        fn unmarshal(
            &self,
            _: &mut dyn TreeReader,
            _: &mut UnmarshalContext<'_>,
        ) -> Result<Box<dyn Any>, ConversionError> {
            Ok(Box::new(String::from(self.0)))
        }

        fn name(&self) -> &'static str {
            self.0
        }
    }

    fn picked(lookup: &ConverterLookup, ty: &Type) -> &'static str {
        lookup.lookup(ty).unwrap().name()
    }

    #[test]
    fn higher_priority_first() {
        let mut lookup = ConverterLookup::new();
        lookup.register(Tagged("high"), Priority::VERY_HIGH);
        lookup.register(Tagged("low"), Priority::LOW);
        lookup.register(Tagged("normal"), Priority::NORMAL);

        assert_eq!(picked(&lookup, &Type::of::<i32>()), "high");
        let order: Vec<_> = lookup.iter().map(|(c, _)| c.name()).collect();
        assert_eq!(order, ["high", "normal", "low"]);
    }

    #[test]
    fn newest_wins_within_priority() {
        let mut lookup = ConverterLookup::new();
        lookup.register(Tagged("first"), Priority::NORMAL);
        lookup.register(Tagged("second"), Priority::NORMAL);
        assert_eq!(picked(&lookup, &Type::of::<i32>()), "second");

        // Dispatch is a pure function of the registrations.
        for _ in 0..8 {
            assert_eq!(picked(&lookup, &Type::of::<i32>()), "second");
        }
    }

    #[test]
    fn bindings_and_fallback() {
        let mut lookup = ConverterLookup::new();
        lookup.register(Tagged("any"), Priority::VERY_LOW);
        lookup.register_single_value(FromStrConverter::<i32>::new(), Priority::NORMAL);
        lookup.register_for_type(Type::from_static("demo.Bound"), Tagged("bound"), Priority::LOW);

        assert_eq!(
            lookup.lookup(&Type::of::<i32>()).unwrap().name(),
            core::any::type_name::<FromStrConverter<i32>>()
        );
        assert_eq!(picked(&lookup, &Type::from_static("demo.Bound")), "bound");
        assert_eq!(picked(&lookup, &Type::from_static("demo.Other")), "any");

        let empty = ConverterLookup::new();
        assert!(matches!(
            empty.lookup(&Type::of::<i32>()),
            Err(ConversionError::NoConverter(_))
        ));
    }

    #[test]
    fn append_keeps_registration_order() {
        let mut bundled = ConverterLookup::new();
        bundled.register(Tagged("bundled"), Priority::NORMAL);
        bundled.register(Tagged("generic"), Priority::VERY_LOW);

        let mut user = ConverterLookup::new();
        user.register(Tagged("user-1"), Priority::NORMAL);
        user.register(Tagged("user-2"), Priority::NORMAL);
        user.register(Tagged("user-low"), Priority::LOW);

        bundled.append(user);
        let order: Vec<_> = bundled.iter().map(|(c, _)| c.name()).collect();
        assert_eq!(order, ["user-2", "user-1", "bundled", "user-low", "generic"]);
    }
}
