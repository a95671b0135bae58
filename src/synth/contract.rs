//! References to the dispatch contract and dispatcher base members, as
//! emitted bodies call them.

use dynproxy_core::dispatch::{CONTRACT_NAME, contract_type_hash};
use dynproxy_core::{DataType, DispatcherEntry};
use dynproxy_emit::MethodRef;

/// Name of the forwarding entry point.
pub const INVOKE: &str = "invoke";

/// Name of the return conversion entry point.
pub const CONVERT_RETURN_VALUE: &str = "convert_return_value";

/// The dispatch contract as a declared type.
pub fn contract_type() -> DataType {
    DataType::reference_with_hash(CONTRACT_NAME, contract_type_hash())
}

/// `object Dispatch::invoke(string, object[])`
pub fn invoke() -> MethodRef {
    MethodRef::instance(
        &contract_type(),
        INVOKE,
        vec![DataType::string(), DataType::object_array()],
        DataType::object(),
    )
}

/// `!!0 Dispatch::convert_return_value<T>(object)`
pub fn convert_return_value() -> MethodRef {
    MethodRef::instance(
        &contract_type(),
        CONVERT_RETURN_VALUE,
        vec![DataType::object()],
        DataType::object(),
    )
    .with_generic_return()
}

/// `void Base::.ctor(params)`
pub fn base_constructor(base: &DispatcherEntry, params: &[DataType]) -> MethodRef {
    MethodRef::constructor(&base.data_type(), params.to_vec())
}

/// Check if `method` is the given contract member.
pub fn is_contract_member(method: &MethodRef, name: &str) -> bool {
    method.owner == contract_type_hash() && &*method.name == name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_references() {
        assert!(is_contract_member(&invoke(), INVOKE));
        assert!(is_contract_member(&convert_return_value(), CONVERT_RETURN_VALUE));
        assert!(!is_contract_member(&invoke(), CONVERT_RETURN_VALUE));
        assert!(convert_return_value().generic_return);
    }
}
