use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::serde_utils::SerdeWrapper;

fn test_generic_data_serde<T>(data: T)
where
    T: Serialize + for<'de> Deserialize<'de> + Debug + Clone + PartialEq,
{
    // Serialize and deserialize the data.
    let encoded = SerdeWrapper::new(data.clone()).wrapper_serialize().unwrap();
    let decoded = SerdeWrapper::<T>::wrapper_deserialize(&encoded).unwrap();

    // Assert that the data is the same after serialization and deserialization.
    assert_eq!(data, decoded);
}

#[test]
fn serde_native_type() {
    let data: u32 = 8;
    test_generic_data_serde(data);
}

#[test]
fn serde_struct_type() {
    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
    struct TestStruct {
        a: u32,
        b: u32,
    }

    let data: TestStruct = TestStruct { a: 17, b: 8 };
    test_generic_data_serde(data);
}

#[test]
fn serde_nested_collection() {
    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    struct Wrapped {
        values: Vec<u64>,
        label: Option<String>,
    }

    let data = Wrapped { values: vec![1, 2, 3], label: Some("leaf".to_string()) };
    test_generic_data_serde(data);
}
