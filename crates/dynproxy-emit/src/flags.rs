//! Member attribute flags.

use bitflags::bitflags;

bitflags! {
    /// Attributes of an emitted constructor or method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MemberFlags: u16 {
        /// Accessible from outside the type.
        const PUBLIC = 1 << 0;
        /// Hidden by name and signature, not by name alone.
        const HIDE_BY_SIG = 1 << 1;
        /// Overridable / implements an interface slot.
        const VIRTUAL = 1 << 2;
        /// Name has special meaning to tools.
        const SPECIAL_NAME = 1 << 3;
        /// Name has special meaning to the runtime (constructors).
        const RT_SPECIAL_NAME = 1 << 4;
    }
}

impl MemberFlags {
    /// Flags for a forwarding constructor.
    pub const CONSTRUCTOR: MemberFlags = MemberFlags::PUBLIC
        .union(MemberFlags::HIDE_BY_SIG)
        .union(MemberFlags::SPECIAL_NAME)
        .union(MemberFlags::RT_SPECIAL_NAME);

    /// Flags for an interface method implementation.
    pub const INTERFACE_METHOD: MemberFlags = MemberFlags::PUBLIC
        .union(MemberFlags::HIDE_BY_SIG)
        .union(MemberFlags::VIRTUAL);

    /// Check if this is a constructor flag set.
    pub fn is_constructor(&self) -> bool {
        self.contains(MemberFlags::RT_SPECIAL_NAME)
    }
}
