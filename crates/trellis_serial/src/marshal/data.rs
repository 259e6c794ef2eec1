use alloc::boxed::Box;
use alloc::string::String;
use core::any::Any;
use core::fmt;

use trellis_utils::hash::HashMap;

// -----------------------------------------------------------------------------
// DataHolder

/// Values shared by all converters taking part in one call.
///
/// The caller may pass a holder in and read it back afterwards, which is how
/// converters report side results or receive call-specific settings.
///
/// ```
/// use trellis_serial::marshal::DataHolder;
///
/// let mut data = DataHolder::new();
/// data.put("depth", 3_usize);
/// assert_eq!(data.get::<usize>("depth"), Some(&3));
/// assert_eq!(data.get::<u32>("depth"), None);
///
/// *data.get_mut::<usize>("depth").unwrap() += 1;
/// assert_eq!(data.remove::<usize>("depth"), Some(4));
/// assert!(data.is_empty());
/// ```
#[derive(Default)]
pub struct DataHolder {
    entries: HashMap<String, Box<dyn Any>>,
}

impl DataHolder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, returning `true` if a value was replaced.
    pub fn put<T: Any>(&mut self, key: impl Into<String>, value: T) -> bool {
        self.entries.insert(key.into(), Box::new(value)).is_some()
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.downcast_ref()
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key)?.downcast_mut()
    }

    /// Removes the value under `key` if it is a `T`.
    pub fn remove<T: Any>(&mut self, key: &str) -> Option<T> {
        if !self.entries.get(key)?.is::<T>() {
            return None;
        }
        let value = self.entries.remove(key)?;
        value.downcast().ok().map(|value| *value)
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for DataHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}
