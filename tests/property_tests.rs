//! Property tests for password derivation, marker reads and clock parsing

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use proptest::sample::Index;
use regex::Regex;
use std::time::Duration;
use synoshell::{
    read_until, rotating_password, ClockStatus, Credential, Marker, ReadStatus, SessionDriver,
};
use tokio::runtime::Runtime;
use tokio::time::Instant;
use tokio_test::io::Builder;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn password_shape() -> Regex {
    Regex::new(r"^[1-9a-c](0[1-9]|1[0-2])-[0-9a-f]{2}[0-9]{2}$").unwrap()
}

/// Split `data` at the given cut points into non-empty chunks.
fn chunks(data: &[u8], cuts: &[Index]) -> Vec<Vec<u8>> {
    if data.len() < 2 {
        return vec![data.to_vec()];
    }

    let mut points: Vec<usize> = cuts
        .iter()
        .map(|cut| 1 + cut.index(data.len() - 1))
        .collect();
    points.sort_unstable();
    points.dedup();

    let mut out = Vec::new();
    let mut start = 0;
    for point in points {
        out.push(data[start..point].to_vec());
        start = point;
    }
    out.push(data[start..].to_vec());
    out
}

#[test]
fn test_every_day_of_2024_has_a_well_formed_password() {
    let shape = password_shape();
    let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    while date.year() == 2024 {
        let secret = rotating_password(date.month(), date.day());
        assert!(shape.is_match(&secret), "{date}: {secret}");
        assert_eq!(Credential::rotating(date).secret(), secret);
        date = date.succ_opt().unwrap();
    }
}

proptest! {
    #[test]
    fn prop_password_is_deterministic(month in 1u32..=12, day in 1u32..=31) {
        let first = rotating_password(month, day);
        prop_assert_eq!(&first, &rotating_password(month, day));
        prop_assert!(password_shape().is_match(&first), "{}", first);
    }

    #[test]
    fn prop_password_encodes_month_and_day(month in 1u32..=12, day in 1u32..=31) {
        let secret = rotating_password(month, day);
        prop_assert_eq!(&secret[1..3], format!("{month:02}"));
        prop_assert_eq!(u32::from_str_radix(&secret[4..6], 16).unwrap(), day);
    }

    #[test]
    fn prop_marker_found_however_it_is_split(
        prefix in "[a-zA-Z0-9 .\r\n]{0,64}",
        cuts in prop::collection::vec(any::<Index>(), 0..6),
    ) {
        let mut input = prefix.into_bytes();
        input.extend_from_slice(b"DiskStation login: ");

        let mut script = Builder::new();
        for chunk in chunks(&input, &cuts) {
            script.read(&chunk);
        }
        let mut stream = script.build();

        let outcome = runtime()
            .block_on(read_until(&mut stream, &Marker::login(), Duration::from_secs(5)))
            .unwrap();

        prop_assert_eq!(&outcome.data[..], &input[..]);
        prop_assert_eq!(outcome.status, ReadStatus::Matched { index: 0, end: input.len() });
    }

    #[test]
    fn prop_no_bytes_lost_without_marker(
        data in prop::collection::vec(any::<u8>(), 1..512),
        cuts in prop::collection::vec(any::<Index>(), 0..8),
    ) {
        prop_assume!(!data.windows(7).any(|w| w == b"login: "));

        let mut script = Builder::new();
        for chunk in chunks(&data, &cuts) {
            script.read(&chunk);
        }
        let mut stream = script.build();

        let outcome = runtime()
            .block_on(read_until(&mut stream, &Marker::login(), Duration::from_secs(5)))
            .unwrap();

        prop_assert_eq!(&outcome.data[..], &data[..]);
        prop_assert_eq!(outcome.status, ReadStatus::Eof);
    }

    #[test]
    fn prop_clock_parse_never_panics(output in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = ClockStatus::parse(&output);
    }

    #[test]
    fn prop_year_decides_clock_state(year in 1970i32..2100) {
        let output = format!("{year}-06-15 12:00:00 UTC\r\nash-4.4# ");
        let status = ClockStatus::parse(output.as_bytes());
        prop_assert_eq!(status.is_unset(), year < 2005);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_read_ends_by_deadline(millis in 10u64..60) {
        let timeout = Duration::from_millis(millis);

        runtime().block_on(async {
            // Writer stays open but silent.
            let (mut client, _server) = tokio::io::duplex(64);
            let started = Instant::now();

            let outcome = read_until(&mut client, &Marker::shell_prompt(), timeout)
                .await
                .unwrap();

            assert_eq!(outcome.status, ReadStatus::TimedOut);
            assert!(outcome.data.is_empty());
            assert!(started.elapsed() < timeout + Duration::from_millis(500));
        });
    }

    #[test]
    fn prop_clock_output_never_fails_session(
        clock_line in "[ -~]{0,40}",
    ) {
        prop_assume!(!clock_line.contains("# "));

        let launch = format!("{}\n", synoshell::SessionConfig::default().launch_line());
        let clock_reply = format!("{clock_line}\r\nash-4.4# ");

        let stream = Builder::new()
            .read(b"login: ")
            .write(b"root\n")
            .read(b"Password: ")
            .write(b"a10-1410\n")
            .read(b"\r\nash-4.4# ")
            .write(b"date +\"%F %T %Z\"\n")
            .read(clock_reply.as_bytes())
            .write(launch.as_bytes())
            .read(b"__LOOP_STARTED__\r\nash-4.4# ")
            .build();

        let driver = SessionDriver::builder()
            .read_timeout(Duration::from_millis(20))
            .verify_timeout(Duration::from_millis(20))
            .settle_delay(Duration::ZERO)
            .credential_date(NaiveDate::from_ymd_opt(2024, 10, 20).unwrap())
            .driver();

        let report = runtime().block_on(driver.run(stream));
        prop_assert!(report.is_ok());
    }
}
