//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] is a 64-bit hash identifying kinds (interfaces, dispatchers,
//! classes, primitives), method signatures, constructors and generated proxy
//! kinds. Hashes are computed from names and signatures, so the same
//! declaration always produces the same identity regardless of registration
//! order.
//!
//! # Examples
//!
//! ```
//! use dynproxy_core::TypeHash;
//!
//! let int_hash = TypeHash::from_name("int");
//! assert_eq!(int_hash, TypeHash::from_name("int"));
//!
//! // Signature hashes include parameter types, in order
//! let a = TypeHash::from_signature("add", &[TypeHash::from_name("int")]);
//! let b = TypeHash::from_signature("add", &[TypeHash::from_name("float")]);
//! assert_ne!(a, b);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
///
/// Different entity kinds (types, signatures, constructors, proxies) mix in a
/// different constant so they never share a hash even when built from the same
/// name.
pub mod hash_constants {
    /// Separator constant used when folding parameter hashes.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for method signature hashes.
    pub const SIGNATURE: u64 = 0x6b1d0c3e95a7f248;

    /// Domain marker for constructor hashes.
    pub const CONSTRUCTOR: u64 = 0x9a7f3d5e2b8c4601;

    /// Domain marker for generated proxy kinds.
    pub const PROXY: u64 = 0xc3a5c85c97cb3127;

    /// Parameter position mixing constants. Positions past the end of the
    /// table reuse a rotated marker so order still matters.
    pub const PARAM_MARKERS: [u64; 16] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
        0x51afd7ed558ccd1b,
        0x2545f4914f6cdd1d,
        0xd1b54a32d192ed03,
        0x8cb92ba72f3d8dd7,
        0xaef17502108ef2d9,
        0xf1357aea2e62a9c5,
        0x3c6ef372fe94f82b,
        0x6a09e667f3bcc909,
    ];

    /// Marker for the parameter at `position`.
    #[inline]
    pub fn param_marker(position: usize) -> u64 {
        let base = PARAM_MARKERS[position % PARAM_MARKERS.len()];
        base.rotate_left((position / PARAM_MARKERS.len()) as u32)
    }
}

/// A deterministic 64-bit hash identifying a kind, signature or constructor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a qualified type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a method signature hash from a name and parameter type hashes.
    ///
    /// The return type is not part of the hash: two interface methods with
    /// the same name and parameter list are the same slot.
    #[inline]
    pub fn from_signature(name: &str, param_hashes: &[TypeHash]) -> Self {
        let seed = hash_constants::SIGNATURE ^ xxh64(name.as_bytes(), 0);
        TypeHash(fold_params(seed, param_hashes))
    }

    /// Create a constructor hash from the owning kind and parameter type hashes.
    #[inline]
    pub fn from_constructor(owner: TypeHash, param_hashes: &[TypeHash]) -> Self {
        TypeHash(fold_params(hash_constants::CONSTRUCTOR ^ owner.0, param_hashes))
    }

    /// Create the identity of the proxy kind generated for `(base, interface)`.
    ///
    /// Argument order matters: the pair is not symmetric.
    #[inline]
    pub fn from_proxy(base: TypeHash, interface: TypeHash) -> Self {
        TypeHash(fold_params(hash_constants::PROXY, &[base, interface]))
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

fn fold_params(seed: u64, params: &[TypeHash]) -> u64 {
    params.iter().enumerate().fold(seed, |hash, (i, param)| {
        // Order-sensitive: position i mixes in marker i
        hash.wrapping_mul(hash_constants::SEP)
            .wrapping_add(hash_constants::param_marker(i) ^ param.0)
    })
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Well-known hashes for the built-in types.
///
/// Pre-computed from `TypeHash::from_name()`; `primitive_constants_match_from_name`
/// keeps them honest.
pub mod primitives {
    use super::TypeHash;

    /// Hash for `void`
    pub const VOID: TypeHash = TypeHash(0xe4b3797ddcf989ea);

    /// Hash for `bool`
    pub const BOOL: TypeHash = TypeHash(0x1e0c8fa4cced99c1);

    /// Hash for `int8`
    pub const INT8: TypeHash = TypeHash(0x2b44191092e74388);

    /// Hash for `int16`
    pub const INT16: TypeHash = TypeHash(0x95aebfc985e9b115);

    /// Hash for `int` (32-bit signed integer)
    pub const INT32: TypeHash = TypeHash(0x4f5e5320cd1c92bf);

    /// Hash for `int64`
    pub const INT64: TypeHash = TypeHash(0x7d6c550df59a1924);

    /// Hash for `uint8`
    pub const UINT8: TypeHash = TypeHash(0x0e8b2d31cdfa9716);

    /// Hash for `uint16`
    pub const UINT16: TypeHash = TypeHash(0x269d68dfde65ae7f);

    /// Hash for `uint` (32-bit unsigned integer)
    pub const UINT32: TypeHash = TypeHash(0x543fb8f520aa3e26);

    /// Hash for `uint64`
    pub const UINT64: TypeHash = TypeHash(0x32ba58d17fda82dd);

    /// Hash for `float`
    pub const FLOAT: TypeHash = TypeHash(0x02d5a2fddaf5bb69);

    /// Hash for `double`
    pub const DOUBLE: TypeHash = TypeHash(0xeb125587f6c2a79b);

    /// Hash for `string`. A reference type, not a value type.
    pub const STRING: TypeHash = TypeHash(0x7a8d5fb1ba695978);

    /// Hash for the null literal (assignable to any reference type).
    pub const NULL: TypeHash = TypeHash(0x1165f1b6597b5a46);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_same_hash() {
        assert_eq!(TypeHash::from_name("ICalculator"), TypeHash::from_name("ICalculator"));
        assert_ne!(TypeHash::from_name("ICalculator"), TypeHash::from_name("IService"));
    }

    #[test]
    fn signature_hash_parameter_order_matters() {
        let int = primitives::INT32;
        let dbl = primitives::DOUBLE;

        let a = TypeHash::from_signature("mix", &[int, dbl]);
        let b = TypeHash::from_signature("mix", &[dbl, int]);
        assert_ne!(a, b);
    }

    #[test]
    fn signature_hash_arity_matters() {
        let int = primitives::INT32;
        assert_ne!(
            TypeHash::from_signature("sum", &[int, int]),
            TypeHash::from_signature("sum", &[int, int, int])
        );
        assert_ne!(TypeHash::from_signature("ping", &[]), TypeHash::from_name("ping"));
    }

    #[test]
    fn constructor_hash_includes_owner() {
        let a = TypeHash::from_name("BaseA");
        let b = TypeHash::from_name("BaseB");
        assert_ne!(
            TypeHash::from_constructor(a, &[primitives::INT32]),
            TypeHash::from_constructor(b, &[primitives::INT32])
        );
    }

    #[test]
    fn proxy_hash_is_ordered_pair() {
        let base = TypeHash::from_name("Base");
        let iface = TypeHash::from_name("IFace");

        assert_eq!(TypeHash::from_proxy(base, iface), TypeHash::from_proxy(base, iface));
        assert_ne!(TypeHash::from_proxy(base, iface), TypeHash::from_proxy(iface, base));
        assert_ne!(TypeHash::from_proxy(base, iface), base);
    }

    #[test]
    fn many_parameters_supported() {
        let params: Vec<TypeHash> = (0..50).map(|_| primitives::INT32).collect();
        let shorter = &params[..49];

        assert_ne!(
            TypeHash::from_signature("wide", &params),
            TypeHash::from_signature("wide", shorter)
        );
    }

    #[test]
    fn empty_hash() {
        assert!(TypeHash::EMPTY.is_empty());
        assert!(!TypeHash::from_name("int").is_empty());
    }

    #[test]
    fn hash_formatting() {
        let hash = TypeHash::from_name("int");
        assert!(format!("{}", hash).starts_with("0x"));
        assert!(format!("{:?}", hash).starts_with("TypeHash(0x"));
    }

    #[test]
    fn primitive_constants_match_from_name() {
        assert_eq!(primitives::VOID, TypeHash::from_name("void"));
        assert_eq!(primitives::BOOL, TypeHash::from_name("bool"));
        assert_eq!(primitives::INT8, TypeHash::from_name("int8"));
        assert_eq!(primitives::INT16, TypeHash::from_name("int16"));
        assert_eq!(primitives::INT32, TypeHash::from_name("int"));
        assert_eq!(primitives::INT64, TypeHash::from_name("int64"));
        assert_eq!(primitives::UINT8, TypeHash::from_name("uint8"));
        assert_eq!(primitives::UINT16, TypeHash::from_name("uint16"));
        assert_eq!(primitives::UINT32, TypeHash::from_name("uint"));
        assert_eq!(primitives::UINT64, TypeHash::from_name("uint64"));
        assert_eq!(primitives::FLOAT, TypeHash::from_name("float"));
        assert_eq!(primitives::DOUBLE, TypeHash::from_name("double"));
        assert_eq!(primitives::STRING, TypeHash::from_name("string"));
        assert_eq!(primitives::NULL, TypeHash::from_name("null"));
    }
}
