use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use regex::RegexSet;

use crate::info::Type;
use crate::registry::TypeRegistry;
use crate::security::{Permission, TypePermission, same_rule};

// -----------------------------------------------------------------------------
// RegexTypePermission

/// Allows named types whose whole path matches one of several regular
/// expressions.
///
/// The expressions are compiled once into a single [`RegexSet`]. Array
/// types have no path, this rule abstains for them.
///
/// # Example
///
/// ```
/// use trellis_serial::info::Type;
/// use trellis_serial::registry::TypeRegistry;
/// use trellis_serial::security::{Permission, RegexTypePermission, TypePermission};
///
/// let registry = TypeRegistry::empty();
/// let rule = RegexTypePermission::new([r"app\.model\.[A-Z]\w*"]).unwrap();
///
/// let check = |path: &'static str| rule.check(&Type::from_static(path), &registry);
/// assert_eq!(check("app.model.Order"), Permission::Allow);
/// assert_eq!(check("app.model.order"), Permission::Abstain);
/// assert_eq!(check("app.model.Order.Line"), Permission::Abstain);
/// ```
#[derive(Debug, Clone)]
pub struct RegexTypePermission {
    patterns: Vec<String>,
    set: RegexSet,
}

impl RegexTypePermission {
    /// Compiles `patterns`, each of which must match a whole type path.
    pub fn new<S: Into<String>>(patterns: impl IntoIterator<Item = S>) -> Result<Self, regex::Error> {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let set = RegexSet::new(patterns.iter().map(|pattern| format!("^(?:{pattern})$")))?;
        Ok(Self { patterns, set })
    }

    #[inline]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    #[inline]
    fn is_match(&self, path: &str) -> bool {
        self.set.is_match(path)
    }
}

impl PartialEq for RegexTypePermission {
    fn eq(&self, other: &Self) -> bool {
        self.patterns == other.patterns
    }
}

impl Eq for RegexTypePermission {}

impl TypePermission for RegexTypePermission {
    fn check(&self, ty: &Type, _: &TypeRegistry) -> Permission {
        match ty.path() {
            Some(path) if self.is_match(path) => Permission::Allow,
            _ => Permission::Abstain,
        }
    }

    fn same_as(&self, other: &dyn TypePermission) -> bool {
        same_rule(self, other)
    }
}

// -----------------------------------------------------------------------------
// WildcardTypePermission

/// Any char but a segment separator.
const SEGMENT_CHAR: &str = "[^.:]";

/// Translates a glob into a regular expression.
fn glob_to_regex(glob: &str) -> String {
    let mut regex = String::with_capacity(glob.len() * 2);
    let mut chars = glob.chars().peekable();
    let mut buf = [0; 4];
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.next_if_eq(&'*').is_some() => regex.push_str(".*"),
            '*' => {
                regex.push_str(SEGMENT_CHAR);
                regex.push('*');
            }
            '?' => regex.push_str(SEGMENT_CHAR),
            c => regex.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    regex
}

/// Allows named types matching one of several glob patterns.
///
/// `?` matches one char, `*` any run of chars within a segment and `**` any
/// run of chars across segments. Segments are separated by `.` or `::`.
/// The globs are translated to a [`RegexTypePermission`].
///
/// # Example
///
/// ```
/// use trellis_serial::info::Type;
/// use trellis_serial::registry::TypeRegistry;
/// use trellis_serial::security::{Permission, TypePermission, WildcardTypePermission};
///
/// let registry = TypeRegistry::empty();
/// let rule = WildcardTypePermission::new(["app.model.*", "app::events::**"]).unwrap();
///
/// let check = |path: &'static str| rule.check(&Type::from_static(path), &registry);
/// assert_eq!(check("app.model.Order"), Permission::Allow);
/// assert_eq!(check("app.model.sub.Order"), Permission::Abstain);
/// assert_eq!(check("app::events::billing::Paid"), Permission::Allow);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardTypePermission {
    globs: Vec<String>,
    regex: RegexTypePermission,
}

impl WildcardTypePermission {
    /// Fails only if a translated glob exceeds the size limits of `regex`.
    pub fn new<S: Into<String>>(globs: impl IntoIterator<Item = S>) -> Result<Self, regex::Error> {
        let globs: Vec<String> = globs.into_iter().map(Into::into).collect();
        let regex = RegexTypePermission::new(globs.iter().map(|glob| glob_to_regex(glob)))?;
        Ok(Self { globs, regex })
    }

    #[inline]
    pub fn patterns(&self) -> &[String] {
        &self.globs
    }
}

impl TypePermission for WildcardTypePermission {
    fn check(&self, ty: &Type, registry: &TypeRegistry) -> Permission {
        self.regex.check(ty, registry)
    }

    fn same_as(&self, other: &dyn TypePermission) -> bool {
        same_rule(self, other)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::{RegexTypePermission, WildcardTypePermission, glob_to_regex};
    use crate::info::Type;
    use crate::registry::TypeRegistry;
    use crate::security::{Permission, TypePermission};

    fn matches(glob: &str, path: &str) -> bool {
        let rule = WildcardTypePermission::new([glob]).unwrap();
        rule.check(&Type::named(String::from(path)), &TypeRegistry::empty()) == Permission::Allow
    }

    #[test]
    fn translation() {
        assert_eq!(glob_to_regex("a.*"), r"a\.[^.:]*");
        assert_eq!(glob_to_regex("a::**"), "a::.*");
        assert_eq!(glob_to_regex("a?+"), r"a[^.:]\+");
    }

    #[test]
    fn single_segment_star() {
        assert!(matches("demo.*", "demo.Item"));
        assert!(matches("demo.*", "demo."));
        assert!(!matches("demo.*", "demo.sub.Item"));
        assert!(matches("demo.*Event", "demo.OrderEvent"));
        assert!(!matches("demo.*Event", "demo.OrderEvents"));
    }

    #[test]
    fn double_star_crosses_segments() {
        assert!(matches("demo.**", "demo.sub.Item"));
        assert!(matches("**.Item", "a.b.c.Item"));
        assert!(matches("demo::**::Item", "demo::a::b::Item"));
        assert!(!matches("demo.**", "other.Item"));
    }

    #[test]
    fn question_mark() {
        assert!(matches("demo.Item?", "demo.Item7"));
        assert!(!matches("demo.Item?", "demo.Item"));
        assert!(!matches("demo?Item", "demo.Item"));
        assert!(matches("caf?", "café"));
    }

    #[test]
    fn literal() {
        assert!(matches("demo.Item", "demo.Item"));
        assert!(!matches("demo.Item", "demo.Items"));
        assert!(matches("demo.Item[]+", "demo.Item[]+"));
        assert!(!matches("", "x"));
    }

    #[test]
    fn many_double_stars_on_a_long_path() {
        let path = "a".repeat(20_000);
        assert!(!matches("**a**a**a**a**b", &path));
        assert!(matches("**a**a**a**a**", &path));
    }

    #[test]
    fn regex_rules() {
        let rule = RegexTypePermission::new([r"proxy\.Gen\d+", "model[.]Order"]).unwrap();
        let registry = TypeRegistry::empty();
        let check = |path: &'static str| rule.check(&Type::from_static(path), &registry);
        assert_eq!(check("proxy.Gen42"), Permission::Allow);
        assert_eq!(check("model.Order"), Permission::Allow);
        assert_eq!(check("proxy.Gen42x"), Permission::Abstain);
        assert_eq!(check("xmodel.Order"), Permission::Abstain);
        assert_eq!(rule.check(&Type::of::<alloc::vec::Vec<u8>>(), &registry), Permission::Abstain);

        assert!(rule.same_as(&RegexTypePermission::new([r"proxy\.Gen\d+", "model[.]Order"]).unwrap()));
        assert!(!rule.same_as(&RegexTypePermission::new([r"proxy\.Gen\d+"]).unwrap()));
        assert!(RegexTypePermission::new(["(unclosed"]).is_err());
    }
}
