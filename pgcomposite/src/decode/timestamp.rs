use time::{Duration, PrimitiveDateTime, UtcDateTime};

use crate::value::Value;

/// Postgres epoch, `2000-01-01 00:00:00`.
const PRIMITIVE_PG_EPOCH: PrimitiveDateTime = {
    // source: `from_julian_day` docs
    let date = match time::Date::from_julian_day(2_451_545) {
        Ok(ok) => ok,
        Err(_) => panic!("invalid postgres epoch"),
    };
    PrimitiveDateTime::new(date, time::Time::MIDNIGHT)
};

const UTC_PG_EPOCH: UtcDateTime = {
    let date = match time::Date::from_julian_day(2_451_545) {
        Ok(ok) => ok,
        Err(_) => panic!("invalid postgres epoch"),
    };
    UtcDateTime::new(date, time::Time::MIDNIGHT)
};

/// Microseconds since postgres epoch.
pub(crate) fn decode_timestamp(be: [u8; 8]) -> Value {
    Value::Timestamp(
        PRIMITIVE_PG_EPOCH.saturating_add(Duration::microseconds(i64::from_be_bytes(be))),
    )
}

pub(crate) fn decode_timestamptz(be: [u8; 8]) -> Value {
    Value::TimestampTz(
        UTC_PG_EPOCH.saturating_add(Duration::microseconds(i64::from_be_bytes(be))),
    )
}

pub(crate) fn encode_timestamp(value: PrimitiveDateTime) -> i64 {
    (value - PRIMITIVE_PG_EPOCH).whole_microseconds() as i64
}

pub(crate) fn encode_timestamptz(value: UtcDateTime) -> i64 {
    (value - UTC_PG_EPOCH).whole_microseconds() as i64
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn one_day_after_epoch() {
        let micros = 86_400_000_000i64;
        let Value::Timestamp(t) = decode_timestamp(micros.to_be_bytes()) else {
            unreachable!()
        };
        assert_eq!(t.date(), time::Date::from_julian_day(2_451_546).unwrap());
        assert_eq!(encode_timestamp(t), micros);
    }
}
