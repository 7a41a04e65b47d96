use proptest::prelude::*;
use std::str::FromStr;

use tally_types::{Amount, Multiplier, Nonce, PublicKey, Timestamp};

proptest! {
    /// a + b - b == a for any amounts, including negative ones.
    #[test]
    fn amount_add_sub_inverse(a in any::<i64>(), b in any::<i64>()) {
        let a = Amount::from(a);
        let b = Amount::from(b);
        prop_assert_eq!(&(&a + &b) - &b, a);
    }

    /// Multiplying by a multiplier is odd: m(-x) == -m(x).
    /// Rounding toward zero is what makes apply/revert deltas mirror each other.
    #[test]
    fn multiplier_is_sign_symmetric(x in any::<i64>(), units in 0u32..100_000, scale in 0usize..6) {
        let text = format!("{}.{}", units, "0".repeat(scale));
        let m = Multiplier::from_str(&text).unwrap();
        let x = Amount::from(x);
        prop_assert_eq!(m.apply(&-x.clone()), -m.apply(&x));
    }

    /// Multiplier display/parse round-trip.
    #[test]
    fn multiplier_text_roundtrip(whole in 0u32..1_000, frac in 0u32..10_000) {
        let text = format!("{whole}.{frac:04}");
        let m = Multiplier::from_str(&text).unwrap();
        let reparsed = Multiplier::from_str(&m.to_string()).unwrap();
        prop_assert_eq!(m, reparsed);
    }

    /// The product never exceeds the exact rational value in magnitude.
    #[test]
    fn multiplier_never_rounds_away_from_zero(x in 0i64..i64::MAX / 100_000, tenths in 0u64..50) {
        let m = Multiplier::from_str(&format!("{}.{}", tenths / 10, tenths % 10)).unwrap();
        let product = m.apply(&Amount::from(x));
        let exact_times_ten = Amount::from(x).times(&Multiplier::integer(tenths));
        prop_assert!(product.times(&Multiplier::integer(10)) <= exact_times_ten);
    }

    /// Nonce increment then decrement is the identity.
    #[test]
    fn nonce_increment_decrement(n in any::<u64>()) {
        let mut nonce = Nonce::from(n);
        nonce.increment();
        nonce.decrement().unwrap();
        prop_assert_eq!(nonce, Nonce::from(n));
    }

    /// Public key ordering agrees with the ordering of the decoded bytes.
    #[test]
    fn public_key_order_matches_bytes(a in prop::collection::vec(any::<u8>(), 33), b in prop::collection::vec(any::<u8>(), 33)) {
        let ka = PublicKey::from_hex(&hex_encode(&a)).unwrap();
        let kb = PublicKey::from_hex(&hex_encode(&b)).unwrap();
        prop_assert_eq!(ka.cmp(&kb), a.cmp(&b));
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
