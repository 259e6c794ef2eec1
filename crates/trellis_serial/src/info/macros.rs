// -----------------------------------------------------------------------------
// impl_typed

/// Implements [`Typed`](crate::info::Typed) for a user type.
///
/// Four forms are accepted, each with an optional list of supertypes after
/// the type path:
///
/// - `struct Name as "path" { field: Type, .. }`: a struct built from its
///   `Default` value. A field may declare a different type than its Rust
///   type with `field: Type as "path"`, which is how a `Box<dyn Any>` field is
///   bound to an abstract type.
/// - `enum Name as "path" { Variant, .. }`: an enum with unit variants only.
/// - `opaque Name as "path"`: a type handled by a user converter.
/// - `abstract Name as "path"`: a marker for a type that is never
///   instantiated itself.
///
/// # Example
///
/// ```
/// use trellis_serial::impl_typed;
/// use trellis_serial::info::{Type, TypeKind, Typed};
///
/// #[derive(Default)]
/// struct Circle {
///     radius: f64,
/// }
///
/// #[derive(Clone, Copy)]
/// enum Fill {
///     Solid,
///     Hatched,
/// }
///
/// struct Shape;
///
/// impl_typed! { abstract Shape as "demo.Shape" }
/// impl_typed! { struct Circle as "demo.Circle": "demo.Shape" { radius: f64 } }
/// impl_typed! { enum Fill as "demo.Fill" { Solid, Hatched } }
///
/// let info = Circle::type_info();
/// assert_eq!(info.kind(), TypeKind::Struct);
/// assert_eq!(info.supertypes(), &[Type::of::<Shape>()]);
///
/// let fill = Fill::type_info();
/// assert_eq!(fill.variants().unwrap().names(), &["Solid", "Hatched"]);
/// ```
#[macro_export]
macro_rules! impl_typed {
    (struct $name:ident as $path:literal $(: $($super:literal),+ )? {
        $($field:ident : $fty:ty $(as $decl:literal)?),* $(,)?
    }) => {
        impl $crate::info::Typed for $name {
            #[inline]
            fn ty() -> $crate::info::Type {
                $crate::info::Type::from_static($path)
            }

            fn type_info() -> $crate::info::TypeInfo {
                let fields = $crate::__macro_exports::vec![$(
                    $crate::impl_typed!(@field $name, $field, $fty $(, $decl)?)
                ),*];
                $crate::info::TypeInfo::structure::<Self>(fields)
                    $($(.with_supertype($crate::info::Type::from_static($super)))+)?
            }

            fn register_dependencies(_registry: &mut $crate::registry::TypeRegistry) {
                $(_registry.register::<$fty>();)*
            }
        }
    };
    (enum $name:ident as $path:literal $(: $($super:literal),+ )? {
        $($variant:ident),+ $(,)?
    }) => {
        impl $crate::info::Typed for $name {
            #[inline]
            fn ty() -> $crate::info::Type {
                $crate::info::Type::from_static($path)
            }

            fn type_info() -> $crate::info::TypeInfo {
                fn name_of(value: &dyn ::core::any::Any) -> ::core::option::Option<&'static str> {
                    match value.downcast_ref::<$name>()? {
                        $($name::$variant => ::core::option::Option::Some(::core::stringify!($variant)),)+
                    }
                }

                fn from_name(
                    name: &str,
                ) -> ::core::option::Option<$crate::__macro_exports::Box<dyn ::core::any::Any>> {
                    match name {
                        $(::core::stringify!($variant) => ::core::option::Option::Some(
                            $crate::__macro_exports::Box::new($name::$variant)
                                as $crate::__macro_exports::Box<dyn ::core::any::Any>,
                        ),)+
                        _ => ::core::option::Option::None,
                    }
                }

                let variants = $crate::info::VariantTable::new(
                    &[$(::core::stringify!($variant)),+],
                    name_of,
                    from_name,
                );
                $crate::info::TypeInfo::enumeration::<Self>(variants)
                    $($(.with_supertype($crate::info::Type::from_static($super)))+)?
            }
        }
    };
    (opaque $name:ident as $path:literal $(: $($super:literal),+ )?) => {
        impl $crate::info::Typed for $name {
            #[inline]
            fn ty() -> $crate::info::Type {
                $crate::info::Type::from_static($path)
            }

            fn type_info() -> $crate::info::TypeInfo {
                $crate::info::TypeInfo::opaque::<Self>()
                    $($(.with_supertype($crate::info::Type::from_static($super)))+)?
            }
        }
    };
    (abstract $name:ident as $path:literal $(: $($super:literal),+ )?) => {
        impl $crate::info::Typed for $name {
            #[inline]
            fn ty() -> $crate::info::Type {
                $crate::info::Type::from_static($path)
            }

            fn type_info() -> $crate::info::TypeInfo {
                $crate::info::TypeInfo::abstract_type(<Self as $crate::info::Typed>::ty())
                    $($(.with_supertype($crate::info::Type::from_static($super)))+)?
            }
        }
    };
    (@field $name:ident, $field:ident, $fty:ty $(, $decl:literal)?) => {{
        fn get(owner: &dyn ::core::any::Any) -> ::core::option::Option<&dyn ::core::any::Any> {
            owner
                .downcast_ref::<$name>()
                .map(|owner| <$fty as $crate::info::Typed>::as_value(&owner.$field))
        }

        fn get_mut(
            owner: &mut dyn ::core::any::Any,
        ) -> ::core::option::Option<&mut dyn ::core::any::Any> {
            owner
                .downcast_mut::<$name>()
                .map(|owner| <$fty as $crate::info::Typed>::as_value_mut(&mut owner.$field))
        }

        fn set(
            owner: &mut dyn ::core::any::Any,
            value: $crate::__macro_exports::Box<dyn ::core::any::Any>,
        ) -> ::core::result::Result<(), $crate::__macro_exports::Box<dyn ::core::any::Any>> {
            let ::core::option::Option::Some(owner) = owner.downcast_mut::<$name>() else {
                return ::core::result::Result::Err(value);
            };
            owner.$field = <$fty as $crate::info::Typed>::from_value(value)?;
            ::core::result::Result::Ok(())
        }

        $crate::info::FieldInfo::new(
            ::core::stringify!($field),
            $crate::impl_typed!(@ty $fty $(, $decl)?),
            get,
            get_mut,
            set,
        )
    }};
    (@ty $fty:ty) => {
        <$fty as $crate::info::Typed>::ty()
    };
    (@ty $fty:ty, $decl:literal) => {
        $crate::info::Type::from_static($decl)
    };
}

// -----------------------------------------------------------------------------
// auto_register

/// Submits types for [`TypeRegistry::auto_register`](crate::registry::TypeRegistry::auto_register).
///
/// Without the `auto_register` feature the macro expands to nothing.
///
/// ```
/// use trellis_serial::{auto_register, impl_typed};
///
/// #[derive(Default)]
/// struct Marker {
///     id: u32,
/// }
///
/// impl_typed! { struct Marker as "demo.Marker" { id: u32 } }
/// auto_register!(Marker, Vec<Marker>);
/// # fn main() {}
/// ```
#[macro_export]
macro_rules! auto_register {
    ($($ty:ty),* $(,)?) => {
        $($crate::__auto_register_type!($ty);)*
    };
}

#[cfg(feature = "auto_register")]
#[doc(hidden)]
#[macro_export]
macro_rules! __auto_register_type {
    ($ty:ty) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::registry::AutoRegistration::of::<$ty>()
        }
    };
}

#[cfg(not(feature = "auto_register"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __auto_register_type {
    ($ty:ty) => {};
}
