mod common;

use std::panic::{self, AssertUnwindSafe};

use common::{Call, FakeBoundary};
use jbridge::sys::JNI_ABORT;
use jbridge::{JniError, ObjectArray, ObjectHandle, PrimitiveArray, PrimitiveKind, Resolver, Type};

fn pins(fake: &FakeBoundary) -> usize {
    fake.count(&Call::Pin)
}

fn unpins(fake: &FakeBoundary) -> usize {
    fake.count_where(|c| matches!(c, Call::Unpin(_)))
}

// ============================================================================
// Transfer Strategy Tests
// ============================================================================

#[test]
fn test_element_writes_are_seen_by_bulk_copy() {
    let mut fake = FakeBoundary::new();
    let mut env = fake.env();

    let array = PrimitiveArray::<i32>::new(&mut env, 4).unwrap();
    for (i, v) in [10, 20, 30, 40].into_iter().enumerate() {
        array.set(&mut env, i, v).unwrap();
    }
    let mut out = [0; 4];
    array.copy_into(&mut env, 0, &mut out).unwrap();
    drop(env);

    assert_eq!(out, [10, 20, 30, 40]);
    assert_eq!(fake.array_kind(array.handle().as_raw()), Some(PrimitiveKind::Int));
    assert_eq!(pins(&fake), 5);
    assert_eq!(unpins(&fake), 5);
    assert!(!fake.is_pinned());
}

#[test]
fn test_bulk_writes_are_seen_by_element_reads() {
    let mut fake = FakeBoundary::new();
    let mut env = fake.env();

    let array = PrimitiveArray::<i64>::new(&mut env, 5).unwrap();
    array.copy_from(&mut env, 1, &[7, 8, 9]).unwrap();
    let values: Vec<i64> = (0..5).map(|i| array.get(&mut env, i).unwrap()).collect();

    assert_eq!(values, [0, 7, 8, 9, 0]);
    assert_eq!(array.to_vec(&mut env).unwrap(), values);
}

#[test]
fn test_pinned_view_writes_through() {
    let mut fake = FakeBoundary::new();
    let mut env = fake.env();

    let array = PrimitiveArray::<f64>::from_slice(&mut env, &[1.0, 2.0, 3.0]).unwrap();
    {
        let mut pinned = array.pin(&mut env).unwrap();
        assert_eq!(pinned.len(), 3);
        for x in pinned.iter_mut() {
            *x *= 2.0;
        }
    }
    let sum = array.with_pinned(&mut env, |elems| elems.iter().sum::<f64>()).unwrap();
    assert_eq!(sum, 12.0);
}

#[test]
fn test_boolean_and_char_arrays() {
    let mut fake = FakeBoundary::new();
    let mut env = fake.env();

    let flags = PrimitiveArray::<bool>::from_slice(&mut env, &[true, false, true]).unwrap();
    assert_eq!(flags.to_vec(&mut env).unwrap(), [true, false, true]);
    assert_eq!(flags.len(&mut env), 3);

    let text: Vec<u16> = "hé".encode_utf16().collect();
    let chars = PrimitiveArray::<u16>::from_slice(&mut env, &text).unwrap();
    assert_eq!(chars.get(&mut env, 1).unwrap(), 0xE9);
    drop(env);

    assert_eq!(fake.array_kind(flags.handle().as_raw()), Some(PrimitiveKind::Boolean));
    assert_eq!(fake.array_kind(chars.handle().as_raw()), Some(PrimitiveKind::Char));
}

#[test]
fn test_empty_array() {
    let mut fake = FakeBoundary::new();
    let mut env = fake.env();
    let array = PrimitiveArray::<i8>::new(&mut env, 0).unwrap();
    assert!(array.is_empty(&mut env));
    assert!(array.to_vec(&mut env).unwrap().is_empty());
    assert!(array.copy_from(&mut env, 0, &[]).is_ok());
}

// ============================================================================
// Pin Balance Tests
// ============================================================================

#[test]
fn test_abort_discards_changes() {
    let mut fake = FakeBoundary::new();
    let mut env = fake.env();
    let array = PrimitiveArray::<i32>::new(&mut env, 2).unwrap();
    let pinned = array.pin(&mut env).unwrap();
    pinned.abort();
    drop(env);

    assert_eq!(fake.count(&Call::Unpin(JNI_ABORT)), 1);
    assert!(!fake.is_pinned());
}

#[test]
fn test_pin_released_when_closure_fails() {
    let mut fake = FakeBoundary::new();
    let mut env = fake.env();
    let array = PrimitiveArray::<i16>::new(&mut env, 3).unwrap();

    let result: Result<(), JniError> = array
        .with_pinned(&mut env, |_| Err(JniError::Other("stop".to_string())))
        .and_then(|inner| inner);
    assert_eq!(result, Err(JniError::Other("stop".to_string())));
    drop(env);

    assert_eq!(pins(&fake), unpins(&fake));
    assert!(!fake.is_pinned());
}

#[test]
fn test_pin_released_on_panic() {
    let mut fake = FakeBoundary::new();
    let mut env = fake.env();
    let array = PrimitiveArray::<f32>::new(&mut env, 3).unwrap();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        array
            .with_pinned::<()>(&mut env, |_| panic!("boom"))
            .unwrap();
    }));
    assert!(outcome.is_err());
    drop(env);

    assert_eq!(pins(&fake), 1);
    assert_eq!(unpins(&fake), 1);
    assert!(!fake.is_pinned());
}

// ============================================================================
// Bounds Tests
// ============================================================================

#[test]
fn test_out_of_bounds_element_access() {
    let mut fake = FakeBoundary::new();
    let mut env = fake.env();
    let array = PrimitiveArray::<i32>::new(&mut env, 2).unwrap();

    assert_eq!(
        array.get(&mut env, 2),
        Err(JniError::IndexOutOfBounds { index: 2, len: 2 })
    );
    assert_eq!(
        array.set(&mut env, 5, 1),
        Err(JniError::IndexOutOfBounds { index: 5, len: 2 })
    );
    drop(env);

    assert_eq!(fake.count(&Call::Unpin(JNI_ABORT)), 1);
    assert!(!fake.is_pinned());
}

#[test]
fn test_out_of_bounds_copy_leaves_array_untouched() {
    let mut fake = FakeBoundary::new();
    let mut env = fake.env();
    let array = PrimitiveArray::<i32>::from_slice(&mut env, &[1, 2, 3]).unwrap();

    let mut out = [0; 2];
    assert!(matches!(
        array.copy_into(&mut env, 2, &mut out),
        Err(JniError::IndexOutOfBounds { len: 3, .. })
    ));
    assert!(array.copy_from(&mut env, 1, &[9, 9, 9]).is_err());
    assert_eq!(array.to_vec(&mut env).unwrap(), [1, 2, 3]);
    assert_eq!(out, [0, 0]);
}

// ============================================================================
// Object Array Tests
// ============================================================================

#[test]
fn test_object_array_elements() {
    let mut fake = FakeBoundary::new();
    let string_class = fake.add_class("java/lang/String");
    let a = unsafe { ObjectHandle::from_raw(fake.add_string(b"a")) };
    let resolver = Resolver::new();

    let mut env = fake.env();
    let string = resolver.find_class(&mut env, &Type::string());
    drop(env);
    assert_eq!(fake.identity(string.handle().as_raw()), fake.identity(string_class));
    let mut env = fake.env();
    let array = ObjectArray::new(&mut env, &string, 3, ObjectHandle::NULL).unwrap();
    assert_eq!(array.len(&mut env), 3);
    assert!(array.get(&mut env, 0).unwrap().is_null());

    array.set(&mut env, 2, a).unwrap();
    assert_eq!(array.get(&mut env, 2).unwrap(), a);
    assert_eq!(
        array.set(&mut env, 3, a),
        Err(JniError::IndexOutOfBounds { index: 3, len: 3 })
    );
    drop(env);

    assert_eq!(fake.count(&Call::NewObjectArray(3)), 1);
    assert_eq!(fake.count(&Call::SetObjectArrayElement(2)), 1);
    assert_eq!(fake.count(&Call::SetObjectArrayElement(3)), 0);
}
