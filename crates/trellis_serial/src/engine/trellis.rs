use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::Any;

use trellis_tree::{Node, NodeReader, NodeWriter, TreeReader, TreeWriter};

use crate::convert::ConverterLookup;
use crate::info::Typed;
use crate::mapper::MapperChain;
use crate::marshal::{DataHolder, MarshalContext, UnmarshalContext};
use crate::registry::TypeRegistry;
use crate::security::{PermissionRules, TypeGate};
use crate::{ConversionError, TrellisBuilder};

// -----------------------------------------------------------------------------
// Trellis

/// Converts registered values to trees and back.
///
/// Created by a [`TrellisBuilder`] and never changed afterwards, so one
/// instance can be shared between threads. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Trellis {
    registry: Arc<TypeRegistry>,
    mapper: Arc<MapperChain>,
    converters: Arc<ConverterLookup>,
    gate: Arc<TypeGate>,
    max_depth: usize,
}

impl Default for Trellis {
    fn default() -> Self {
        Self::new()
    }
}

impl Trellis {
    /// A [`Trellis`] with the default configuration.
    pub fn new() -> Self {
        TrellisBuilder::new().build()
    }

    #[inline]
    pub fn builder() -> TrellisBuilder {
        TrellisBuilder::new()
    }

    pub(crate) fn from_parts(
        registry: Arc<TypeRegistry>,
        mapper: Arc<MapperChain>,
        converters: Arc<ConverterLookup>,
        permissions: PermissionRules,
        max_depth: usize,
    ) -> Self {
        let gate = Arc::new(TypeGate::new(permissions, registry.clone()));
        Self {
            registry,
            mapper,
            converters,
            gate,
            max_depth,
        }
    }

    // -------------------------------------------------------------------------
    // Writing

    /// Writes `value` as the root node of `writer`.
    pub fn marshal(&self, value: &dyn Any, writer: &mut dyn TreeWriter) -> Result<(), ConversionError> {
        self.marshal_with(value, writer, &mut DataHolder::new())
    }

    /// Like [`marshal`](Self::marshal), sharing `data` with the converters.
    pub fn marshal_with(
        &self,
        value: &dyn Any,
        writer: &mut dyn TreeWriter,
        data: &mut DataHolder,
    ) -> Result<(), ConversionError> {
        MarshalContext::new(&self.mapper, &self.converters, data).write_root(value, writer)
    }

    /// Writes `value` into a new [`Node`].
    pub fn to_tree<T: Typed>(&self, value: &T) -> Result<Node, ConversionError> {
        let mut writer = NodeWriter::new();
        self.marshal(value.as_value(), &mut writer)?;
        Ok(writer.into_node()?)
    }

    // -------------------------------------------------------------------------
    // Reading

    /// Reads the root node of `reader`.
    ///
    /// Fails with [`ConversionError::Forbidden`] as soon as the tree names a
    /// type the permissions do not allow.
    pub fn unmarshal(&self, reader: &mut dyn TreeReader) -> Result<Box<dyn Any>, ConversionError> {
        self.unmarshal_with(reader, &mut DataHolder::new())
    }

    /// Like [`unmarshal`](Self::unmarshal), sharing `data` with the converters.
    pub fn unmarshal_with(
        &self,
        reader: &mut dyn TreeReader,
        data: &mut DataHolder,
    ) -> Result<Box<dyn Any>, ConversionError> {
        UnmarshalContext::new(&self.mapper, &self.converters, &self.gate, data)
            .with_max_depth(self.max_depth)
            .read_root(reader)
    }

    pub fn from_tree(&self, node: &Node) -> Result<Box<dyn Any>, ConversionError> {
        self.unmarshal(&mut NodeReader::new(node))
    }

    /// Reads `node` as a `T`.
    pub fn from_tree_as<T: Typed>(&self, node: &Node) -> Result<T, ConversionError> {
        let value = self.from_tree(node)?;
        T::from_value(value).map_err(|value| ConversionError::mismatch(&T::ty(), self.registry.type_of_value(&*value)))
    }

    // -------------------------------------------------------------------------
    // Accessors

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[inline]
    pub fn mapper(&self) -> &MapperChain {
        &self.mapper
    }

    #[inline]
    pub fn converters(&self) -> &ConverterLookup {
        &self.converters
    }

    #[inline]
    pub fn gate(&self) -> &TypeGate {
        &self.gate
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;
    use core::any::Any;

    use crate::convert::{Converter, Priority, SingleValueConverter, SingleValueConverterWrapper};
    use crate::info::Type;
    use crate::mapper::SystemAttribute;
    use crate::marshal::{DataHolder, MarshalContext, UnmarshalContext};
    use crate::tree::{Node, NodeReader, TreeReader, TreeWriter};
    use crate::{ConversionError, ForbiddenType, Trellis};

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
        label: String,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Side {
        Left,
        Right,
    }

    #[derive(Debug, PartialEq)]
    struct Bar {
        side: Side,
        points: Vec<Point>,
        code: Vec<char>,
    }

    impl Default for Bar {
        fn default() -> Self {
            Self {
                side: Side::Left,
                points: Vec::new(),
                code: Vec::new(),
            }
        }
    }

    struct Shape;

    #[derive(Debug, Default, PartialEq)]
    struct Circle {
        radius: f64,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Square {
        side: f64,
    }

    struct Drawing {
        shape: Box<dyn Any>,
        extras: Vec<Box<dyn Any>>,
    }

    impl Default for Drawing {
        fn default() -> Self {
            Self {
                shape: Box::new(Circle::default()),
                extras: Vec::new(),
            }
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Secret {
        key: String,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Note {
        text: String,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Board {
        title: String,
        notes: Vec<Note>,
        pins: Vec<Note>,
    }

    crate::impl_typed! { struct Point as "geo.Point" { x: i32, y: i32, label: String } }
    crate::impl_typed! { enum Side as "geo.Side" { Left, Right } }
    crate::impl_typed! { struct Bar as "geo.Bar" { side: Side, points: Vec<Point>, code: Vec<char> } }
    crate::impl_typed! { abstract Shape as "geo.Shape" }
    crate::impl_typed! { struct Circle as "geo.Circle": "geo.Shape" { radius: f64 } }
    crate::impl_typed! { struct Square as "geo.Square": "geo.Shape" { side: f64 } }
    crate::impl_typed! {
        struct Drawing as "geo.Drawing" { shape: Box<dyn Any> as "geo.Shape", extras: Vec<Box<dyn Any>> }
    }
    crate::impl_typed! { struct Secret as "vault.Secret" { key: String } }
    crate::impl_typed! { struct Note as "memo.Note" { text: String } }
    crate::impl_typed! { struct Board as "memo.Board" { title: String, notes: Vec<Note>, pins: Vec<Note> } }

    fn point(x: i32, y: i32, label: &str) -> Point {
        Point {
            x,
            y,
            label: label.to_string(),
        }
    }

    fn geo() -> Trellis {
        Trellis::builder()
            .alias::<Point>("point")
            .alias::<Bar>("bar")
            .use_attribute_for(Type::of::<Point>(), "x")
            .use_attribute_for_type(Type::of::<Side>())
            .allow_types_by_prefix(["geo."])
            .build()
    }

    #[test]
    fn trellis_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Trellis>();
    }

    #[test]
    fn nested_structs_and_arrays() {
        let trellis = geo();
        let bar = Bar {
            side: Side::Right,
            points: vec![point(1, 2, "a<b"), point(-3, 4, "")],
            code: vec!['x', '&', 'y'],
        };

        let tree = trellis.to_tree(&bar).unwrap();
        assert_eq!(
            tree.to_string(),
            concat!(
                r#"<bar side="Right"><points>"#,
                r#"<point x="1"><y>2</y><label>a&lt;b</label></point>"#,
                r#"<point x="-3"><y>4</y><label/></point>"#,
                r#"</points><code>x&amp;y</code></bar>"#,
            )
        );
        assert_eq!(trellis.from_tree_as::<Bar>(&tree).unwrap(), bar);

        let empty = Bar::default();
        let tree = trellis.to_tree(&empty).unwrap();
        assert_eq!(tree.to_string(), r#"<bar side="Left"><points/><code/></bar>"#);
        assert_eq!(trellis.from_tree_as::<Bar>(&tree).unwrap(), empty);
    }

    #[test]
    fn arrays_at_the_root() {
        let trellis = geo();
        let points = vec![point(5, 6, "p")];
        let tree = trellis.to_tree(&points).unwrap();
        assert_eq!(tree.name(), "point-array");
        assert_eq!(trellis.from_tree_as::<Vec<Point>>(&tree).unwrap(), points);

        let trellis = Trellis::builder().register::<Vec<u16>>().build();
        let numbers = vec![1_u16, 2];
        let tree = trellis.to_tree(&numbers).unwrap();
        assert_eq!(tree.to_string(), "<u16-array><u16>1</u16><u16>2</u16></u16-array>");
        assert_eq!(trellis.from_tree_as::<Vec<u16>>(&tree).unwrap(), numbers);
    }

    #[test]
    fn polymorphic_fields() {
        let trellis = Trellis::builder()
            .register::<Shape>()
            .alias::<Drawing>("drawing")
            .alias::<Circle>("circle")
            .alias::<Square>("square")
            .add_default_implementation(Type::of::<Circle>(), Type::of::<Shape>())
            .allow_types([Type::of::<Drawing>()])
            .allow_type_hierarchy(Type::of::<Shape>())
            .build();

        let drawing = Drawing {
            shape: Box::new(Square { side: 1.5 }),
            extras: vec![Box::new(Circle { radius: 3.25 }), Box::new(7_i64)],
        };
        let tree = trellis.to_tree(&drawing).unwrap();
        assert_eq!(
            tree.to_string(),
            concat!(
                r#"<drawing><shape class="square"><side>1.5</side></shape>"#,
                r#"<extras><circle><radius>3.25</radius></circle><i64>7</i64></extras></drawing>"#,
            )
        );

        let back = trellis.from_tree_as::<Drawing>(&tree).unwrap();
        assert_eq!(back.shape.downcast_ref::<Square>(), Some(&Square { side: 1.5 }));
        assert_eq!(back.extras[0].downcast_ref::<Circle>(), Some(&Circle { radius: 3.25 }));
        assert_eq!(back.extras[1].downcast_ref::<i64>(), Some(&7));

        // The default implementation needs no class attribute.
        let drawing = Drawing::default();
        let tree = trellis.to_tree(&drawing).unwrap();
        assert_eq!(tree.to_string(), "<drawing><shape><radius>0</radius></shape><extras/></drawing>");
        let back = trellis.from_tree_as::<Drawing>(&tree).unwrap();
        assert!(back.shape.is::<Circle>());
    }

    #[test]
    fn class_attribute_outside_of_slot() {
        let trellis = Trellis::builder()
            .register::<Shape>()
            .register::<Drawing>()
            .register::<Point>()
            .add_permission(crate::security::AnyTypePermission)
            .build();

        let tree = Node::new("geo.Drawing").with_child(
            Node::new("shape")
                .with_attribute("class", "geo.Point")
                .with_child(Node::new("y").with_text("1")),
        );
        let error = trellis.from_tree(&tree).unwrap_err();
        assert_eq!(error.path(), Some("/geo.Drawing/shape"));
        assert!(matches!(
            error.root_cause(),
            ConversionError::TypeMismatch { found: Some(found), .. } if *found == Type::of::<Point>()
        ));
    }

    #[test]
    fn forbidden_types_abort_the_read() {
        let trellis = Trellis::builder()
            .register::<Secret>()
            .register::<Shape>()
            .register::<Drawing>()
            .allow_types([Type::of::<Drawing>()])
            .build();

        let secret = Secret {
            key: "k".to_string(),
        };
        // Writing is not restricted.
        let tree = trellis.to_tree(&secret).unwrap();
        let error = trellis.from_tree(&tree).unwrap_err();
        assert!(error.is_security_violation());
        match error.root_cause() {
            ConversionError::Forbidden(ForbiddenType(ty)) => assert_eq!(*ty, Type::of::<Secret>()),
            other => panic!("unexpected error {other}"),
        }

        let tree = Node::new("geo.Drawing").with_child(
            Node::new("shape")
                .with_attribute("class", "vault.Secret")
                .with_child(Node::new("key").with_text("k")),
        );
        let error = trellis.from_tree(&tree).unwrap_err();
        assert!(error.is_security_violation());
        assert_eq!(error.path(), Some("/geo.Drawing/shape"));

        let denied = Trellis::builder()
            .register::<Secret>()
            .allow_types_by_prefix(["vault."])
            .deny_types([Type::of::<Secret>()])
            .build();
        assert!(denied.from_tree(&trellis.to_tree(&secret).unwrap()).unwrap_err().is_security_violation());
    }

    #[test]
    fn implicit_collections() {
        let board_type = Type::of::<Board>();
        let trellis = Trellis::builder()
            .alias::<Board>("board")
            .alias::<Note>("note")
            .implicit_collection(board_type.clone(), "notes", Type::of::<Note>())
            .implicit_collection_named(board_type, "pins", "pin", Type::of::<Note>())
            .allow_types_by_prefix(["memo."])
            .build();

        let board = Board {
            title: "todo".to_string(),
            notes: vec![
                Note {
                    text: "one".to_string(),
                },
                Note {
                    text: "two".to_string(),
                },
            ],
            pins: vec![Note {
                text: "top".to_string(),
            }],
        };
        let tree = trellis.to_tree(&board).unwrap();
        assert_eq!(
            tree.to_string(),
            concat!(
                "<board><title>todo</title>",
                "<note><text>one</text></note><note><text>two</text></note>",
                "<pin><text>top</text></pin></board>",
            )
        );
        assert_eq!(trellis.from_tree_as::<Board>(&tree).unwrap(), board);

        // Items may be interleaved.
        let mixed = Node::new("board")
            .with_child(Node::new("pin").with_child(Node::new("text").with_text("a")))
            .with_child(Node::new("title").with_text("t"))
            .with_child(Node::new("note").with_child(Node::new("text").with_text("b")));
        let back = trellis.from_tree_as::<Board>(&mixed).unwrap();
        assert_eq!(back.pins.len(), 1);
        assert_eq!(back.notes[0].text, "b");
    }

    #[test]
    fn omitted_and_unknown_elements() {
        let point_type = Type::of::<Point>();
        let strict = Trellis::builder()
            .alias::<Point>("point")
            .omit_field(point_type.clone(), "label")
            .allow_types([point_type.clone()])
            .build();

        let tree = strict.to_tree(&point(1, 2, "hidden")).unwrap();
        assert_eq!(tree.to_string(), "<point><x>1</x><y>2</y></point>");
        assert_eq!(strict.from_tree_as::<Point>(&tree).unwrap(), point(1, 2, ""));

        let legacy = Node::new("point")
            .with_child(Node::new("x").with_text("1"))
            .with_child(Node::new("z").with_text("9"));
        let error = strict.from_tree(&legacy).unwrap_err();
        assert!(matches!(
            error.root_cause(),
            ConversionError::UnknownField { element, .. } if element == "z"
        ));

        let lenient = Trellis::builder()
            .alias::<Point>("point")
            .ignore_unknown_element("z")
            .allow_types([point_type])
            .build();
        assert_eq!(lenient.from_tree_as::<Point>(&legacy).unwrap(), point(1, 0, ""));
    }

    #[test]
    fn aliases() {
        let point_type = Type::of::<Point>();
        let trellis = Trellis::builder()
            .register::<Shape>()
            .alias::<Drawing>("drawing")
            .alias::<Point>("pt")
            .alias_field("name", point_type.clone(), "label")
            .use_attribute_for(point_type.clone(), "x")
            .use_attribute_for(point_type.clone(), "y")
            .alias_attribute("left", "x")
            .alias_attribute_for(point_type.clone(), "top", "y")
            .alias_system_attribute(SystemAttribute::Class, "kind")
            .allow_types([point_type, Type::of::<Drawing>()])
            .build();

        let value = point(3, 4, "corner");
        let tree = trellis.to_tree(&value).unwrap();
        assert_eq!(tree.to_string(), r#"<pt left="3" top="4"><name>corner</name></pt>"#);
        assert_eq!(trellis.from_tree_as::<Point>(&tree).unwrap(), value);

        let drawing = Drawing {
            shape: Box::new(point(0, 0, "")),
            extras: Vec::new(),
        };
        let tree = trellis.to_tree(&drawing).unwrap();
        assert_eq!(tree.children()[0].attribute("kind"), Some("pt"));
        assert_eq!(tree.children()[0].attribute("class"), None);
    }

    #[test]
    fn located_errors() {
        let trellis = geo();
        let tree = Node::new("bar").with_child(
            Node::new("points").with_child(
                Node::new("point")
                    .with_attribute("x", "1")
                    .with_child(Node::new("y").with_text("two")),
            ),
        );
        let error = trellis.from_tree(&tree).unwrap_err();
        assert_eq!(error.path(), Some("/bar/points/point/y"));
        assert!(matches!(error.root_cause(), ConversionError::InvalidText { text, .. } if text == "two"));

        let error = trellis.from_tree(&Node::new("nowhere")).unwrap_err();
        assert!(matches!(error.root_cause(), ConversionError::UnknownElement(name) if name == "nowhere"));

        struct Unregistered;
        let error = trellis.marshal(&Unregistered, &mut crate::tree::NodeWriter::new()).unwrap_err();
        assert!(matches!(error.root_cause(), ConversionError::UnregisteredValue));
    }

    /// Upper-cases text on write, lower-cases it on read.
    struct Shout;

    impl SingleValueConverter for Shout {
        fn can_convert(&self, ty: &Type) -> bool {
            *ty == Type::of::<String>()
        }

        fn to_text(&self, value: &dyn Any) -> Result<String, ConversionError> {
            let text = value
                .downcast_ref::<String>()
                .ok_or_else(|| ConversionError::mismatch(&Type::of::<String>(), None))?;
            Ok(text.to_uppercase())
        }

        fn from_text(&self, text: &str, _: &Type) -> Result<Box<dyn Any>, ConversionError> {
            Ok(Box::new(text.to_lowercase()))
        }
    }

    #[test]
    fn local_and_user_converters() {
        let point_type = Type::of::<Point>();
        let trellis = Trellis::builder()
            .alias::<Point>("point")
            .register_local_converter(point_type.clone(), "label", SingleValueConverterWrapper::new(Shout))
            .allow_types([point_type.clone()])
            .build();
        let tree = trellis.to_tree(&point(1, 2, "abc")).unwrap();
        assert_eq!(tree.to_string(), "<point><x>1</x><y>2</y><label>ABC</label></point>");
        assert_eq!(trellis.from_tree_as::<Point>(&tree).unwrap(), point(1, 2, "abc"));

        // As an attribute, the local converter writes the attribute.
        let trellis = Trellis::builder()
            .alias::<Point>("point")
            .register_local_converter(point_type.clone(), "label", SingleValueConverterWrapper::new(Shout))
            .use_attribute_for(point_type.clone(), "label")
            .allow_types([point_type])
            .build();
        let tree = trellis.to_tree(&point(1, 2, "abc")).unwrap();
        assert_eq!(tree.to_string(), r#"<point label="ABC"><x>1</x><y>2</y></point>"#);
        assert_eq!(trellis.from_tree_as::<Point>(&tree).unwrap(), point(1, 2, "abc"));

        // A user converter wins over the bundled one of the same priority.
        let trellis = Trellis::builder()
            .register_single_value_converter(Shout, Priority::NORMAL)
            .build();
        let tree = trellis.to_tree(&String::from("quiet")).unwrap();
        assert_eq!(tree.to_string(), "<string>QUIET</string>");
    }

    /// Counts the values it writes in the data holder.
    struct Counting;

    impl Converter for Counting {
        fn can_convert(&self, ty: &Type) -> bool {
            *ty == Type::of::<i32>()
        }

        fn marshal(
            &self,
            value: &dyn Any,
            writer: &mut dyn TreeWriter,
            context: &mut MarshalContext<'_>,
        ) -> Result<(), ConversionError> {
            let count = context.data().get::<usize>("count").copied().unwrap_or(0);
            context.data_mut().put("count", count + 1);
            let value = value.downcast_ref::<i32>().ok_or(ConversionError::UnregisteredValue)?;
            writer.write_text(&value.to_string())?;
            Ok(())
        }

        fn unmarshal(
            &self,
            reader: &mut dyn TreeReader,
            context: &mut UnmarshalContext<'_>,
        ) -> Result<Box<dyn Any>, ConversionError> {
            let ty = context.required_type()?.clone();
            let value: i32 = reader
                .text()
                .parse()
                .map_err(|_| ConversionError::InvalidText {
                    ty,
                    text: reader.text().to_string(),
                })?;
            Ok(Box::new(value))
        }
    }

    #[test]
    fn data_holder_is_shared() {
        let trellis = Trellis::builder()
            .alias::<Point>("point")
            .register_converter(Counting, Priority::VERY_HIGH)
            .allow_types([Type::of::<Point>()])
            .build();

        let mut data = DataHolder::new();
        let mut writer = crate::tree::NodeWriter::new();
        trellis
            .marshal_with(&point(1, 2, "x"), &mut writer, &mut data)
            .unwrap();
        assert_eq!(data.get::<usize>("count"), Some(&2));

        let node = writer.into_node().unwrap();
        let back = trellis.unmarshal(&mut NodeReader::new(&node)).unwrap();
        assert_eq!(back.downcast_ref::<Point>(), Some(&point(1, 2, "x")));
    }

    #[derive(Debug, Default, PartialEq)]
    struct Base {
        id: i32,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Derived {
        id: i32,
    }

    struct Holder {
        slot: Box<dyn Any>,
    }

    impl Default for Holder {
        fn default() -> Self {
            Self {
                slot: Box::new(Base::default()),
            }
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Tag {
        class: String,
        n: i32,
    }

    crate::impl_typed! { struct Base as "geo.Base" { id: i32 } }
    crate::impl_typed! { struct Derived as "geo.Derived": "geo.Base" { id: i32 } }
    crate::impl_typed! { struct Holder as "geo.Holder" { slot: Box<dyn Any> as "geo.Base" } }
    crate::impl_typed! { struct Tag as "geo.Tag" { class: String, n: i32 } }

    #[test]
    fn declared_type_with_a_default_implementation() {
        let trellis = Trellis::builder()
            .alias::<Holder>("holder")
            .alias::<Base>("base")
            .alias::<Derived>("derived")
            .add_default_implementation(Type::of::<Derived>(), Type::of::<Base>())
            .allow_types_by_prefix(["geo."])
            .build();

        // The declared type itself is not what a reader would instantiate.
        let holder = Holder {
            slot: Box::new(Base { id: 1 }),
        };
        let tree = trellis.to_tree(&holder).unwrap();
        assert_eq!(tree.to_string(), r#"<holder><slot class="base"><id>1</id></slot></holder>"#);
        let back = trellis.from_tree_as::<Holder>(&tree).unwrap();
        assert_eq!(back.slot.downcast_ref::<Base>(), Some(&Base { id: 1 }));

        let holder = Holder {
            slot: Box::new(Derived { id: 2 }),
        };
        let tree = trellis.to_tree(&holder).unwrap();
        assert_eq!(tree.to_string(), "<holder><slot><id>2</id></slot></holder>");
        let back = trellis.from_tree_as::<Holder>(&tree).unwrap();
        assert_eq!(back.slot.downcast_ref::<Derived>(), Some(&Derived { id: 2 }));
    }

    #[test]
    fn attributes_never_shadow_system_attributes() {
        let tag_type = Type::of::<Tag>();
        let tag = Tag {
            class: "i32".to_string(),
            n: 5,
        };

        let clashing = Trellis::builder()
            .alias::<Tag>("tag")
            .use_attribute_for(tag_type.clone(), "class")
            .allow_types([tag_type.clone()])
            .build();
        let error = clashing.to_tree(&tag).unwrap_err();
        assert_eq!(error.path(), Some("/tag"));
        assert!(matches!(
            error.root_cause(),
            ConversionError::AttributeInUse { attribute, .. } if attribute == "class"
        ));

        let renamed = Trellis::builder()
            .alias::<Tag>("tag")
            .use_attribute_for(tag_type.clone(), "class")
            .alias_system_attribute(SystemAttribute::Class, "type")
            .allow_types([tag_type.clone()])
            .build();
        let tree = renamed.to_tree(&tag).unwrap();
        assert_eq!(tree.to_string(), r#"<tag class="i32"><n>5</n></tag>"#);
        assert_eq!(renamed.from_tree_as::<Tag>(&tree).unwrap(), tag);

        let doubled = Trellis::builder()
            .alias::<Tag>("tag")
            .use_attribute_for(tag_type.clone(), "class")
            .use_attribute_for(tag_type.clone(), "n")
            .alias_attribute_for(tag_type.clone(), "v", "class")
            .alias_attribute_for(tag_type.clone(), "v", "n")
            .build();
        assert!(matches!(
            doubled.to_tree(&tag).unwrap_err().root_cause(),
            ConversionError::AttributeInUse { attribute, .. } if attribute == "v"
        ));
    }

    fn nested(depth: usize) -> Vec<Box<dyn Any>> {
        let mut items: Vec<Box<dyn Any>> = Vec::new();
        for _ in 1..depth {
            items = vec![Box::new(items)];
        }
        items
    }

    #[test]
    fn nesting_depth_is_capped() {
        let trellis = Trellis::builder()
            .register::<Vec<Box<dyn Any>>>()
            .add_permission(crate::security::AnyTypePermission)
            .max_depth(8)
            .build();

        let tree = trellis.to_tree(&nested(8)).unwrap();
        assert!(trellis.from_tree(&tree).is_ok());

        let tree = trellis.to_tree(&nested(9)).unwrap();
        let error = trellis.from_tree(&tree).unwrap_err();
        assert!(matches!(error.root_cause(), ConversionError::TooDeep(8)));
        assert!(!error.is_security_violation());
    }

    #[cfg(feature = "std")]
    #[test]
    fn pattern_permissions() {
        let secret = Secret {
            key: "k".to_string(),
        };
        let value = point(1, 2, "p");

        let by_wildcard = Trellis::builder()
            .register::<Point>()
            .register::<Secret>()
            .allow_types_by_wildcard(["geo.*"])
            .unwrap()
            .build();
        let by_regex = Trellis::builder()
            .register::<Point>()
            .register::<Secret>()
            .allow_types_by_regex([r"geo\.[A-Z]\w*"])
            .unwrap()
            .build();

        for trellis in [by_wildcard, by_regex] {
            let tree = trellis.to_tree(&value).unwrap();
            assert_eq!(trellis.from_tree_as::<Point>(&tree).unwrap(), value);
            let tree = trellis.to_tree(&secret).unwrap();
            assert!(trellis.from_tree(&tree).unwrap_err().is_security_violation());
        }

        assert!(Trellis::builder().allow_types_by_regex(["(geo"]).is_err());
    }
}
