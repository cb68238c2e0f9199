use bitflags::bitflags;

bitflags! {
    /// Extension set controlling the behaviours beyond core Mustache.
    ///
    /// Each bit can be toggled independently; [`Extensions::empty()`] is the
    /// plain Mustache engine and [`Extensions::all()`] enables everything.
    ///
    /// ```
    /// use mustach::Extensions;
    ///
    /// let flags = Extensions::EQUAL | Extensions::COMPARE;
    /// assert!(flags.contains(Extensions::EQUAL));
    /// assert!(!flags.contains(Extensions::ERROR_UNDEFINED));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Extensions: u32 {
        /// `{{key=value}}` and `{{#key=value}}` equality conditions.
        const EQUAL = 1 << 0;

        /// `<`, `<=`, `>`, `>=` conditions on values and sections.
        const COMPARE = 1 << 1;

        /// RFC 6901 pointer paths (`/a/b/0`) against the innermost scope.
        const JSON_POINTER = 1 << 2;

        /// Object iteration with the `.*` section suffix; `*` names the
        /// current key inside the section.
        const OBJECT_ITER = 1 << 3;

        /// Conditions on escaped variable tags compare the escaped text.
        const ESC_FIRST_CMP = 1 << 4;

        /// Partial text is looked up in the data before the template store.
        const PARTIAL_DATA_FIRST = 1 << 5;

        /// An unresolvable variable tag is an error instead of empty output.
        const ERROR_UNDEFINED = 1 << 6;
    }
}

impl Default for Extensions {
    fn default() -> Self {
        Extensions::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_no_extensions() {
        assert_eq!(Extensions::default(), Extensions::empty());
        assert!(!Extensions::empty().contains(Extensions::EQUAL));
    }

    #[test]
    fn all_covers_every_bit() {
        let all = Extensions::all();
        for bit in [
            Extensions::EQUAL,
            Extensions::COMPARE,
            Extensions::JSON_POINTER,
            Extensions::OBJECT_ITER,
            Extensions::ESC_FIRST_CMP,
            Extensions::PARTIAL_DATA_FIRST,
            Extensions::ERROR_UNDEFINED,
        ] {
            assert!(all.contains(bit));
        }
    }
}
