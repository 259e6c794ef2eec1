use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::Any;

use trellis_tree::{TreeReader, TreeWriter};

use crate::ConversionError;
use crate::convert::Converter;
use crate::info::{ListAccess, Type};
use crate::marshal::{MarshalContext, UnmarshalContext};
use crate::registry::TypeRegistry;

/// Writes an array as one child node per item.
///
/// Items are named after their runtime type, so an array declared with an
/// abstract element type keeps the concrete type of every item.
#[derive(Debug, Clone)]
pub struct ArrayConverter {
    registry: Arc<TypeRegistry>,
}

impl ArrayConverter {
    #[inline]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }
}

fn list_access<'r>(registry: &'r TypeRegistry, ty: &Type) -> Result<&'r ListAccess, ConversionError> {
    registry
        .get(ty)
        .ok_or_else(|| ConversionError::UnregisteredType(ty.clone()))?
        .list()
        .ok_or_else(|| ConversionError::NoConverter(ty.clone()))
}

impl Converter for ArrayConverter {
    fn can_convert(&self, ty: &Type) -> bool {
        ty.is_array() && list_access(&self.registry, ty).is_ok()
    }

    fn marshal(
        &self,
        value: &dyn Any,
        writer: &mut dyn TreeWriter,
        context: &mut MarshalContext<'_>,
    ) -> Result<(), ConversionError> {
        let ty = context.type_of(value)?;
        let items = list_access(context.registry(), ty)?
            .items(value)
            .ok_or_else(|| ConversionError::mismatch(ty, None))?;
        for item in items {
            context.write_item(item, writer)?;
        }
        Ok(())
    }

    fn unmarshal(
        &self,
        reader: &mut dyn TreeReader,
        context: &mut UnmarshalContext<'_>,
    ) -> Result<Box<dyn Any>, ConversionError> {
        let ty = context.required_type()?.clone();
        let element = ty
            .element()
            .cloned()
            .ok_or_else(|| ConversionError::NoConverter(ty.clone()))?;
        let access = list_access(context.registry(), &ty)?;

        let mut list = access.create();
        while reader.has_more_children() {
            reader.move_down()?;
            let item = context.read_item(reader, &element)?;
            access
                .push(&mut *list, item)
                .map_err(|_| ConversionError::mismatch(&element, None))?;
            reader.move_up()?;
        }
        Ok(list)
    }
}
