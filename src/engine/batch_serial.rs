/// Lot/serial resolution for one line.
///
/// At most one of the two codes is ever set: batch tracking wins over serial
/// tracking, and a line tracked by neither still reports its raw value in
/// serial style. A blank raw value yields neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSerial {
    pub lot_code: Option<String>,
    pub serial_code: Option<String>,
}

/// Product-category family whose lot codes keep only the trailing 8
/// characters (date-stamped milk-powder lots).
const LOT_TRUNC_8_CATEGORIES: &[&str] = &["Sữa bột"];

/// Product-category families whose lot codes keep only the trailing 4
/// characters.
const LOT_TRUNC_4_CATEGORIES: &[&str] = &["Thực phẩm chức năng", "Mỹ phẩm"];

/// Pure resolution from already-fetched catalog flags; called once per line.
pub fn resolve(
    track_batch: bool,
    track_serial: bool,
    raw_value: &str,
    product_category: &str,
) -> BatchSerial {
    let raw = raw_value.trim();
    if raw.is_empty() {
        return BatchSerial::default();
    }
    if track_batch {
        BatchSerial {
            lot_code: Some(truncate_lot(raw, product_category)),
            serial_code: None,
        }
    } else {
        // Serial-tracked lines, and the default when neither flag is set.
        let _ = track_serial;
        BatchSerial {
            lot_code: None,
            serial_code: Some(raw.to_string()),
        }
    }
}

fn truncate_lot(raw: &str, product_category: &str) -> String {
    let keep = if LOT_TRUNC_8_CATEGORIES.contains(&product_category) {
        Some(8)
    } else if LOT_TRUNC_4_CATEGORIES.contains(&product_category) {
        Some(4)
    } else {
        None
    };
    match keep {
        Some(n) => {
            let len = raw.chars().count();
            if len > n {
                raw.chars().skip(len - n).collect()
            } else {
                raw.to_string()
            }
        }
        None => raw.to_string(),
    }
}
