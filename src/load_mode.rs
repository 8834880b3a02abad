//! The client-supplied bitmask describing which fields it needs filled in on
//! each returned package.
//!
//! Bit positions match `golang.org/x/tools/go/packages`'s `LoadMode` so that
//! the integer the client sends on the wire (see `crate::protocol::Request`)
//! decodes without translation.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LoadMode: u32 {
        const NAME          = 1 << 0;
        const FILES         = 1 << 1;
        const COMPILED_FILES = 1 << 2;
        const IMPORTS       = 1 << 3;
        const DEPS          = 1 << 4;
        const EXPORTS_FILE  = 1 << 5;
        const TYPES         = 1 << 6;
        const SYNTAX        = 1 << 7;
        const TYPES_INFO    = 1 << 8;
        const TYPES_SIZES   = 1 << 9;
    }
}

impl LoadMode {
    /// `DEPS` only makes sense when paired with `IMPORTS`. We don't reject a
    /// mode missing `IMPORTS` here (the client is free to ask for nonsensical
    /// modes), but the stitcher (`crate::graph`) treats `DEPS` as implying
    /// `IMPORTS` when deciding whether to populate import edges at all.
    pub fn wants_deps(self) -> bool {
        self.contains(LoadMode::DEPS)
    }

    pub fn wants_imports(self) -> bool {
        self.contains(LoadMode::IMPORTS) || self.wants_deps()
    }
}
