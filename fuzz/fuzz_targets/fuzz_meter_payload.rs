//! Fuzz target: meter response parser
//!
//! Feeds arbitrary bytes to `parse_meter_payload` and verifies:
//! - No panics under arbitrary byte inputs
//! - Any accepted body really carries a numeric `active_power_w`
//!
//! cargo fuzz run fuzz_meter_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use solarcharge::adapters::meter::{MAX_BODY_LEN, parse_meter_payload};

fuzz_target!(|data: &[u8]| {
    let body = &data[..data.len().min(MAX_BODY_LEN)];

    if let Ok(reading) = parse_meter_payload(body) {
        let value: serde_json::Value =
            serde_json::from_slice(body).expect("accepted body must be JSON");
        let import = value["active_power_w"]
            .as_f64()
            .expect("accepted body must carry a numeric active_power_w");
        assert_eq!(f64::from(reading.watts()), -import.trunc());
    }
});
