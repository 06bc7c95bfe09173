//! Table-driven checks of the add and subtract condition formulas.
//!
//! Vectors live in `tests/data/flags.json`. `set` lists the condition bits
//! expected after the operation, using the letters of the flag string.

use ibm_romp::flags::ConditionStatus;
use serde::Deserialize;

#[derive(Deserialize)]
struct Vector {
    name: String,
    op: String,
    a: u32,
    b: u32,
    result: u32,
    set: String,
}

fn expected_string(set: &str) -> String {
    "LEGCOT"
        .chars()
        .map(|letter| if set.contains(letter) { letter } else { '.' })
        .collect()
}

#[test]
fn add_and_subtract_vectors() {
    let vectors: Vec<Vector> =
        serde_json::from_str(include_str!("data/flags.json")).expect("valid flag vectors");
    assert!(!vectors.is_empty());

    for v in &vectors {
        let mut cs = ConditionStatus::default();
        let result = match v.op.as_str() {
            "add" => {
                cs.set_add(v.a, v.b);
                v.a.wrapping_add(v.b)
            }
            "sub" => {
                cs.set_sub(v.a, v.b);
                v.a.wrapping_sub(v.b)
            }
            other => panic!("{}: unknown op {other}", v.name),
        };
        assert_eq!(result, v.result, "{}: result", v.name);
        assert_eq!(cs.to_string(), expected_string(&v.set), "{}: flags", v.name);
    }
}

#[test]
fn condition_bits_above_the_low_byte_are_untouched() {
    let mut cs = ConditionStatus::new(0x0000_8100);
    cs.set_add(1, 1);
    assert_eq!(cs.raw() & 0xFF00, 0x8100);
    cs.set_sub(1, 1);
    assert_eq!(cs.raw() & 0xFF00, 0x8100);
}
