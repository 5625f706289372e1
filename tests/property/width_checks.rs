//! Property-based tests for integer width checks

use bindconf::binder::convert::IntWidth;
use bindconf::field::{int_field, uint_field};
use bindconf::sources::EnvSource;
use bindconf::{Dest, FieldOptions, Manager};
use proptest::prelude::*;

/// Signed checks accept exactly the values the target type can hold
#[test]
fn test_signed_width_matches_try_from() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&any::<i64>(), |value| {
            assert_eq!(IntWidth::W8.check_signed(value).is_ok(), i8::try_from(value).is_ok());
            assert_eq!(IntWidth::W16.check_signed(value).is_ok(), i16::try_from(value).is_ok());
            assert_eq!(IntWidth::W32.check_signed(value).is_ok(), i32::try_from(value).is_ok());
            assert_eq!(IntWidth::W64.check_signed(value), Ok(value));
            Ok(())
        })
        .unwrap();
}

/// Unsigned checks accept exactly the values the target type can hold
#[test]
fn test_unsigned_width_matches_try_from() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&any::<u64>(), |value| {
            assert_eq!(IntWidth::W8.check_unsigned(value).is_ok(), u8::try_from(value).is_ok());
            assert_eq!(IntWidth::W16.check_unsigned(value).is_ok(), u16::try_from(value).is_ok());
            assert_eq!(IntWidth::W32.check_unsigned(value).is_ok(), u32::try_from(value).is_ok());
            Ok(())
        })
        .unwrap();
}

/// An i16 field either takes the env value or reports one value error
#[test]
fn test_i16_field_from_env_text() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&any::<i32>(), |value| {
            let env = EnvSource::from_pairs([("K6_PORT", value.to_string())]);
            let port = Dest::new(0i16);
            let mut manager = Manager::new();
            manager.add_field(int_field(&port, &[&env.var("K6_PORT")]), FieldOptions::new());

            match (manager.consolidate(), i16::try_from(value)) {
                (Ok(()), Ok(expected)) => assert_eq!(port.get(), expected),
                (Err(err), Err(_)) => {
                    assert_eq!(err.len(), 1);
                    assert_eq!(port.get(), 0);
                }
                (result, expected) => panic!("{:?} vs {:?}", result.err(), expected),
            }
            Ok(())
        })
        .unwrap();
}

/// Negative text never lands in an unsigned field
#[test]
fn test_negative_text_rejected_by_unsigned_field() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(i64::MIN..0), |value| {
            let env = EnvSource::from_pairs([("K6_VUS", value.to_string())]);
            let vus = Dest::new(1u64);
            let mut manager = Manager::new();
            manager.add_field(uint_field(&vus, &[&env.var("K6_VUS")]), FieldOptions::new());

            assert!(manager.consolidate().is_err());
            assert_eq!(vus.get(), 1);
            Ok(())
        })
        .unwrap();
}
